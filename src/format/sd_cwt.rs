//! # SD-CWT Format Plugin
//!
//! Implements the [`ClaimTreeCodec`] and [`SdSigner`] contracts for the
//! CBOR/COSE half of the format-plugged pipeline
//! ([draft-ietf-spice-sd-cwt]). CWT claim keys are CBOR integers; this
//! crate's in-memory [`Value::Map`] only carries string keys
//! ([`crate::value`]), so a leaf segment's decimal string form is resolved
//! against an integer CBOR key at both parse and serialize time — the
//! open-question resolution recorded in DESIGN.md.
//!
//! [draft-ietf-spice-sd-cwt]: https://www.ietf.org/archive/id/draft-ietf-spice-sd-cwt-04.html

use ciborium::Value as CborValue;

use crate::cancel::CancellationToken;
use crate::disclosure::Disclosure;
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::redact::ClaimTreeCodec;
use crate::sign::SdSigner;
use crate::value::Value;

/// The default media type for SD-CWT-secured credentials.
pub const DEFAULT_MEDIA_TYPE: &str = "application/vc+cose";

/// The CBOR `simple(59)` sentinel key SD-CWT writes disclosure digest
/// arrays under, represented in this crate's string-keyed claim tree as its
/// decimal form.
pub const DIGEST_SENTINEL_KEY: &str = "59";

/// Parses a leaf segment as the CBOR integer key it must resolve to in an
/// SD-CWT claim map.
///
/// # Errors
///
/// Returns [`Error::NonPropertyLeaf`] if `segment` does not parse as `i64`.
pub fn cbor_key_for_segment(segment: &str) -> Result<i64> {
    segment.parse::<i64>().map_err(|_| Error::NonPropertyLeaf(segment.to_string()))
}

fn value_to_cwt_cbor(value: &Value) -> CborValue {
    match value {
        Value::Null => CborValue::Null,
        Value::Bool(b) => CborValue::Bool(*b),
        Value::Int(i) => CborValue::Integer((*i).into()),
        Value::Float(f) => CborValue::Float(*f),
        Value::String(s) => CborValue::Text(s.clone()),
        Value::Bytes(bytes) => CborValue::Bytes(bytes.clone()),
        Value::Array(items) => CborValue::Array(items.iter().map(value_to_cwt_cbor).collect()),
        Value::Map(entries) => CborValue::Map(
            entries
                .iter()
                .map(|(key, value)| {
                    let cbor_key = key
                        .parse::<i64>()
                        .map_or_else(|_| CborValue::Text(key.clone()), |n| CborValue::Integer(n.into()));
                    (cbor_key, value_to_cwt_cbor(value))
                })
                .collect(),
        ),
    }
}

/// SD-CWT's [`ClaimTreeCodec`]: an integer-keyed CBOR map claim tree,
/// `simple(59)`-sentinel byte-string digests, and canonically-encoded CBOR
/// array disclosures.
#[derive(Clone, Copy, Debug, Default)]
pub struct SdCwtCodec;

impl ClaimTreeCodec for SdCwtCodec {
    fn parse(&self, payload_bytes: &[u8]) -> Result<Value> {
        let cbor: CborValue = ciborium::de::from_reader(payload_bytes)
            .map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
        if !matches!(cbor, CborValue::Map(_)) {
            return Err(Error::InvalidTokenStructure(
                "SD-CWT payload must be a CBOR map".to_string(),
            ));
        }
        Ok(Value::from_cbor(&cbor))
    }

    fn serialize(&self, tree: &Value) -> Result<Vec<u8>> {
        let cbor = value_to_cwt_cbor(tree);
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&cbor, &mut bytes)
            .map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
        Ok(bytes)
    }

    fn encode_disclosure(&self, disclosure: &Disclosure) -> Result<Vec<u8>> {
        let array = match &disclosure.claim_name {
            Some(name) => CborValue::Array(vec![
                CborValue::Text(disclosure.salt.clone()),
                CborValue::Text(name.clone()),
                value_to_cwt_cbor(&disclosure.claim_value),
            ]),
            None => CborValue::Array(vec![
                CborValue::Text(disclosure.salt.clone()),
                value_to_cwt_cbor(&disclosure.claim_value),
            ]),
        };
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&array, &mut bytes)
            .map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
        Ok(bytes)
    }

    fn digest_key(&self) -> &str {
        DIGEST_SENTINEL_KEY
    }

    fn digest_value(&self, digest: Vec<u8>) -> Value {
        Value::Bytes(digest)
    }

    fn sort_key(&self, value: &Value) -> Vec<u8> {
        match value {
            Value::Bytes(bytes) => bytes.clone(),
            _ => Vec::new(),
        }
    }

    fn validate_leaf_segment(&self, segment: &str) -> Result<()> {
        cbor_key_for_segment(segment).map(|_| ())
    }
}

/// SD-CWT's [`SdSigner`]: a COSE_Sign1 envelope over the redacted payload,
/// carrying `sd_alg` in the protected header rather than the payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct SdCwtSigner;

impl SdSigner for SdCwtSigner {
    fn sign(
        &self,
        redacted_payload: &[u8],
        hash_algorithm: HashAlgorithm,
        media_type: Option<&str>,
        signer: &dyn crate::envelope::EnvelopeSigner,
        cancellation: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let typ = media_type.unwrap_or(DEFAULT_MEDIA_TYPE);
        crate::envelope::sign_cose_sign1(
            redacted_payload,
            typ,
            Some(hash_algorithm.iana_name()),
            signer,
            cancellation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disclosure::SaltFactory;
    use crate::path::CredentialPath;
    use crate::redact::redact;

    struct FixedSalts(Vec<&'static str>);
    impl SaltFactory for FixedSalts {
        fn next_salt(&mut self) -> String {
            self.0.remove(0).to_string()
        }
    }

    #[test]
    fn cbor_key_for_segment_parses_integers_only() {
        assert_eq!(cbor_key_for_segment("501").unwrap(), 501);
        assert!(matches!(cbor_key_for_segment("degree"), Err(Error::NonPropertyLeaf(_))));
    }

    #[test]
    fn scenario_sd_cwt_property_disclosure() {
        let mut claims = CborValue::Map(vec![
            (CborValue::Integer(1.into()), CborValue::Text("https://issuer.example".into())),
            (CborValue::Integer(2.into()), CborValue::Text("https://device.example".into())),
            (CborValue::Integer(6.into()), CborValue::Integer(1_725_244_200_i64.into())),
            (CborValue::Integer(500.into()), CborValue::Bool(true)),
            (CborValue::Integer(501.into()), CborValue::Text("ABCD-123456".into())),
        ]);
        if let CborValue::Map(entries) = &mut claims {
            entries.sort_by_key(|(k, _)| format!("{k:?}"));
        }
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&claims, &mut bytes).unwrap();

        let paths = vec![CredentialPath::parse("/501").unwrap()];
        let mut salts = FixedSalts(vec!["s1"]);
        let (redacted, disclosures) =
            redact(&bytes, &paths, &mut salts, HashAlgorithm::Sha256, &SdCwtCodec).unwrap();

        assert_eq!(disclosures.len(), 1);
        assert_eq!(disclosures[0].claim_name.as_deref(), Some("501"));

        let redacted_cbor: CborValue = ciborium::de::from_reader(redacted.as_slice()).unwrap();
        let CborValue::Map(entries) = redacted_cbor else { panic!("expected map") };
        assert_eq!(entries.len(), 5); // 4 original remaining + the simple(59) digest array
    }
}
