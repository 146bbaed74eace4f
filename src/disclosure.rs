//! # Disclosures
//!
//! A [`Disclosure`] is the salted, encodable triple `(salt, claim_name?,
//! claim_value)` that a digest in a credential's `_sd` array (SD-JWT) or
//! `simple(59)` set (SD-CWT) stands for. The encoding differs per format
//! ([`crate::format::sd_jwt`] produces a base64url JSON array, while
//! [`crate::format::sd_cwt`] produces a CBOR array), so this module only
//! holds the shared shape and the salt-generation seam.

use rand::Rng;
use rand::rng;

use crate::path::CredentialPath;
use crate::value::Value;

/// A single disclosure: a random salt, an optional claim name (present for
/// object properties, absent for array elements), and the claim's value.
#[derive(Clone, Debug, PartialEq)]
pub struct Disclosure {
    /// The path this disclosure reveals, carried alongside the triple for
    /// bookkeeping; it is not part of the encoded/hashed form.
    pub path: CredentialPath,
    /// Base64url-encoded random salt, unique per disclosure.
    pub salt: String,
    /// The claim name, when this disclosure is for an object property.
    pub claim_name: Option<String>,
    /// The disclosed value.
    pub claim_value: Value,
}

/// Produces the random salt material for a new [`Disclosure`].
///
/// Abstracted behind a trait so issuance can be driven by a fixed salt
/// sequence in tests while production code uses [`RandSaltFactory`].
pub trait SaltFactory {
    /// Returns a fresh, base64url-encoded salt.
    fn next_salt(&mut self) -> String;
}

/// A [`SaltFactory`] backed by `rand`'s thread-local generator, producing
/// 128-bit salts as recommended by the SD-JWT and SD-CWT drafts.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandSaltFactory;

impl SaltFactory for RandSaltFactory {
    fn next_salt(&mut self) -> String {
        let bytes: [u8; 16] = rng().random();
        base64ct::Base64UrlUnpadded::encode_string(&bytes)
    }
}

impl Disclosure {
    /// Builds a new property disclosure, drawing a salt from `salts`.
    pub fn property(
        path: CredentialPath,
        claim_name: impl Into<String>,
        claim_value: Value,
        salts: &mut impl SaltFactory,
    ) -> Self {
        Self {
            path,
            salt: salts.next_salt(),
            claim_name: Some(claim_name.into()),
            claim_value,
        }
    }

    /// Builds a new array-element disclosure (no claim name), drawing a salt
    /// from `salts`.
    pub fn array_element(
        path: CredentialPath,
        claim_value: Value,
        salts: &mut impl SaltFactory,
    ) -> Self {
        Self { path, salt: salts.next_salt(), claim_name: None, claim_value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSalts(Vec<&'static str>);

    impl SaltFactory for FixedSalts {
        fn next_salt(&mut self) -> String {
            self.0.remove(0).to_string()
        }
    }

    #[test]
    fn property_disclosure_carries_name_and_path() {
        let mut salts = FixedSalts(vec!["aaaa"]);
        let path = CredentialPath::parse("/credentialSubject/degree").unwrap();
        let disclosure =
            Disclosure::property(path.clone(), "degree", Value::String("BSc".into()), &mut salts);
        assert_eq!(disclosure.path, path);
        assert_eq!(disclosure.salt, "aaaa");
        assert_eq!(disclosure.claim_name.as_deref(), Some("degree"));
    }

    #[test]
    fn array_element_disclosure_has_no_claim_name() {
        let mut salts = FixedSalts(vec!["bbbb"]);
        let path = CredentialPath::parse("/nationalities/0").unwrap();
        let disclosure = Disclosure::array_element(path, Value::String("DE".into()), &mut salts);
        assert!(disclosure.claim_name.is_none());
    }

    #[test]
    fn rand_salt_factory_produces_distinct_salts() {
        let mut salts = RandSaltFactory;
        let a = salts.next_salt();
        let b = salts.next_salt();
        assert_ne!(a, b);
    }
}
