//! # Envelope Signing & Verification (C11)
//!
//! Plain (non-selectively-disclosed) JWS and COSE_Sign1 envelopes, and the
//! delegate traits through which this crate reaches out to external
//! cryptographic primitives. Concrete algorithms (EdDSA, ECDSA, …) and key
//! material are never implemented here; callers supply an
//! [`EnvelopeSigner`]/[`EnvelopeVerifier`] backed by whatever key-tag
//! registry they maintain.

use std::cell::RefCell;

use base64ct::{Base64UrlUnpadded, Encoding};
use ciborium::Value as CborValue;
use coset::{CborSerializable, CoseSign1, CoseSign1Builder, Header, HeaderBuilder, Label};
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};

/// Signs bytes with a caller-resolved key, identified only by algorithm and
/// key id. Object-safe so multiple signer implementations can coexist.
pub trait EnvelopeSigner {
    /// The JOSE/COSE algorithm identifier this signer produces signatures
    /// for (e.g. `"EdDSA"`, `"ES256"`).
    fn algorithm(&self) -> &str;

    /// The key id written into the envelope header, if any.
    fn key_id(&self) -> Option<&str>;

    /// Produces a signature over `signing_input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureInvalid`] if signing fails.
    fn sign(&self, signing_input: &[u8]) -> Result<Vec<u8>>;
}

/// Verifies a signature against a key resolved by `(algorithm, key_id)`.
pub trait EnvelopeVerifier {
    /// Verifies `signature` over `signing_input` for the given algorithm and
    /// key id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VerificationMethodNotFound`] if no key matches the
    /// tag, or [`Error::SignatureInvalid`] if verification fails.
    fn verify(&self, signing_input: &[u8], signature: &[u8], algorithm: &str, key_id: Option<&str>) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct JwsHeader {
    alg: String,
    typ: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
}

/// Builds a compact JWS: `base64url(header).base64url(payload).base64url(signature)`.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancellation` is already cancelled, or
/// propagates signing failures from `signer`.
pub fn sign_jws(
    payload: &[u8],
    typ: &str,
    signer: &dyn EnvelopeSigner,
    cancellation: &CancellationToken,
) -> Result<String> {
    cancellation.check()?;
    let header = JwsHeader {
        alg: signer.algorithm().to_string(),
        typ: typ.to_string(),
        kid: signer.key_id().map(str::to_string),
    };
    let header_json =
        serde_json::to_vec(&header).map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
    let signing_input = format!(
        "{}.{}",
        Base64UrlUnpadded::encode_string(&header_json),
        Base64UrlUnpadded::encode_string(payload)
    );
    let signature = signer.sign(signing_input.as_bytes())?;
    Ok(format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&signature)))
}

/// Verifies and decodes a compact JWS, returning the raw payload bytes.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancellation` is already cancelled,
/// [`Error::InvalidTokenStructure`] if the token is not
/// `header.payload.signature`, or propagates `verifier`'s error.
pub fn verify_jws(
    token: &str,
    verifier: &dyn EnvelopeVerifier,
    cancellation: &CancellationToken,
) -> Result<Vec<u8>> {
    cancellation.check()?;
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::InvalidTokenStructure(
            "JWS must have exactly three dot-separated parts".to_string(),
        ));
    };

    let header_bytes = Base64UrlUnpadded::decode_vec(header_b64)
        .map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
    let header: JwsHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
    let signature = Base64UrlUnpadded::decode_vec(sig_b64)
        .map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
    let signing_input = format!("{header_b64}.{payload_b64}");

    verifier.verify(signing_input.as_bytes(), &signature, &header.alg, header.kid.as_deref())?;

    Base64UrlUnpadded::decode_vec(payload_b64).map_err(|e| Error::InvalidTokenStructure(e.to_string()))
}

const LABEL_TYP: i64 = 16;
const LABEL_SD_ALG: i64 = 100;

fn algorithm_for_name(name: &str) -> Result<coset::iana::Algorithm> {
    match name {
        "EdDSA" => Ok(coset::iana::Algorithm::EdDSA),
        "ES256" => Ok(coset::iana::Algorithm::ES256),
        "ES384" => Ok(coset::iana::Algorithm::ES384),
        "ES512" => Ok(coset::iana::Algorithm::ES512),
        other => Err(Error::InvalidTokenStructure(format!(
            "unrecognized signing algorithm `{other}`"
        ))),
    }
}

/// Builds a COSE_Sign1 envelope for an SD-CWT or plain CWT payload.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancellation` is already cancelled,
/// [`Error::InvalidTokenStructure`] if `signer.algorithm()` is not a
/// recognized COSE algorithm name or CBOR encoding fails, or propagates
/// signing failures from `signer`.
pub fn sign_cose_sign1(
    payload: &[u8],
    typ: &str,
    sd_alg: Option<&str>,
    signer: &dyn EnvelopeSigner,
    cancellation: &CancellationToken,
) -> Result<Vec<u8>> {
    cancellation.check()?;
    let mut protected = HeaderBuilder::new().algorithm(algorithm_for_name(signer.algorithm())?);
    if let Some(kid) = signer.key_id() {
        protected = protected.key_id(kid.as_bytes().to_vec());
    }
    protected = protected.value(LABEL_TYP, CborValue::Text(typ.to_string()));
    if let Some(sd_alg) = sd_alg {
        protected = protected.value(LABEL_SD_ALG, CborValue::Text(sd_alg.to_string()));
    }

    let sign_error: RefCell<Option<Error>> = RefCell::new(None);
    let sign1 = CoseSign1Builder::new()
        .protected(protected.build())
        .payload(payload.to_vec())
        .create_signature(&[], |signing_input| match signer.sign(signing_input) {
            Ok(signature) => signature,
            Err(err) => {
                *sign_error.borrow_mut() = Some(err);
                Vec::new()
            }
        })
        .build();

    if let Some(err) = sign_error.into_inner() {
        return Err(err);
    }

    sign1.to_vec().map_err(|e| Error::InvalidTokenStructure(e.to_string()))
}

/// Parses and verifies a COSE_Sign1 envelope, returning the raw payload.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancellation` is already cancelled,
/// [`Error::InvalidTokenStructure`] if `bytes` does not decode as
/// COSE_Sign1 or carries no payload, or propagates `verifier`'s error.
pub fn verify_cose_sign1(
    bytes: &[u8],
    verifier: &dyn EnvelopeVerifier,
    cancellation: &CancellationToken,
) -> Result<Vec<u8>> {
    cancellation.check()?;
    let sign1 =
        CoseSign1::from_slice(bytes).map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;

    let algorithm = match &sign1.protected.header.alg {
        Some(coset::RegisteredLabelWithPrivate::Assigned(alg)) => format!("{alg:?}"),
        _ => {
            return Err(Error::InvalidTokenStructure("missing COSE algorithm header".to_string()));
        }
    };
    let key_id = (!sign1.protected.header.key_id.is_empty())
        .then(|| String::from_utf8_lossy(&sign1.protected.header.key_id).into_owned());

    let verify_error: RefCell<Option<Error>> = RefCell::new(None);
    let outcome = sign1.verify_signature(&[], |signature, signing_input| {
        match verifier.verify(signing_input, signature, &algorithm, key_id.as_deref()) {
            Ok(()) => Ok(()),
            Err(err) => {
                *verify_error.borrow_mut() = Some(err);
                Err(())
            }
        }
    });
    outcome.map_err(|()| verify_error.into_inner().unwrap_or(Error::SignatureInvalid))?;

    sign1.payload.ok_or_else(|| Error::InvalidTokenStructure("COSE_Sign1 has no payload".to_string()))
}

fn header_has_label(header: &Header, label: i64) -> bool {
    header.rest.iter().any(|(l, _)| matches!(l, Label::Int(n) if *n == label))
}
