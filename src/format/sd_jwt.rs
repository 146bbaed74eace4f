//! # SD-JWT Format Plugin
//!
//! Implements the [`ClaimTreeCodec`] and [`SdSigner`] contracts for
//! IETF SD-JWT-based Verifiable Credentials
//! ([draft-ietf-oauth-selective-disclosure-jwt]), the JSON-over-JWS half of
//! the format-plugged pipeline.
//!
//! [draft-ietf-oauth-selective-disclosure-jwt]: https://www.ietf.org/archive/id/draft-ietf-oauth-selective-disclosure-jwt-17.html

use serde_json::json;

use crate::cancel::CancellationToken;
use crate::disclosure::Disclosure;
use crate::envelope::{EnvelopeSigner, sign_jws};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::redact::ClaimTreeCodec;
use crate::sign::SdSigner;
use crate::value::Value;

/// The default JWT `typ` for SD-JWT VCs.
pub const DEFAULT_MEDIA_TYPE: &str = "vc+sd-jwt";

/// SD-JWT's [`ClaimTreeCodec`]: a JSON object claim tree, string `"_sd"`
/// digest keys, and base64url-encoded JSON-array disclosures.
#[derive(Clone, Copy, Debug, Default)]
pub struct SdJwtCodec;

impl ClaimTreeCodec for SdJwtCodec {
    fn parse(&self, payload_bytes: &[u8]) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_slice(payload_bytes)
            .map_err(|e| Error::InvalidTokenStructure(e.to_string()))?;
        if !json.is_object() {
            return Err(Error::InvalidTokenStructure(
                "SD-JWT payload must be a JSON object".to_string(),
            ));
        }
        Ok(Value::from_json(&json))
    }

    fn serialize(&self, tree: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(&tree.to_json()).map_err(|e| Error::InvalidTokenStructure(e.to_string()))
    }

    fn encode_disclosure(&self, disclosure: &Disclosure) -> Result<Vec<u8>> {
        let array = match &disclosure.claim_name {
            Some(name) => json!([disclosure.salt, name, disclosure.claim_value.to_json()]),
            None => json!([disclosure.salt, disclosure.claim_value.to_json()]),
        };
        serde_json::to_vec(&array).map_err(|e| Error::InvalidTokenStructure(e.to_string()))
    }

    fn digest_key(&self) -> &str {
        "_sd"
    }

    fn digest_value(&self, digest: Vec<u8>) -> Value {
        Value::String(base64ct::Base64UrlUnpadded::encode_string(&digest))
    }

    fn sort_key(&self, value: &Value) -> Vec<u8> {
        match value {
            Value::String(s) => s.as_bytes().to_vec(),
            _ => Vec::new(),
        }
    }

    fn finalize(&self, tree: &mut Value, hash_algorithm: HashAlgorithm, placed: bool) {
        if !placed {
            return;
        }
        if let Value::Map(entries) = tree {
            entries.push((
                "_sd_alg".to_string(),
                Value::String(hash_algorithm.iana_name().to_string()),
            ));
        }
    }
}

/// Encodes a [`Disclosure`] to the compact `~`-separated wire form a holder
/// appends to the issuer-signed JWT.
#[must_use]
pub fn encode_disclosure_b64(disclosure: &Disclosure) -> String {
    let codec = SdJwtCodec;
    let bytes = codec.encode_disclosure(disclosure).unwrap_or_default();
    base64ct::Base64UrlUnpadded::encode_string(&bytes)
}

/// SD-JWT's [`SdSigner`]: a compact JWS over the redacted payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct SdJwtSigner;

impl SdSigner for SdJwtSigner {
    fn sign(
        &self,
        redacted_payload: &[u8],
        _hash_algorithm: HashAlgorithm,
        media_type: Option<&str>,
        signer: &dyn EnvelopeSigner,
        cancellation: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let typ = media_type.unwrap_or(DEFAULT_MEDIA_TYPE);
        let token = sign_jws(redacted_payload, typ, signer, cancellation)?;
        Ok(token.into_bytes())
    }
}

/// Assembles the final wire token: `<jws>~<disclosure>~…~[<kb-jwt>]`.
#[must_use]
pub fn assemble_presentation(jws: &str, disclosures: &[Disclosure], key_binding_jwt: Option<&str>) -> String {
    let mut parts = vec![jws.to_string()];
    parts.extend(disclosures.iter().map(encode_disclosure_b64));
    let mut token = format!("{}~", parts.join("~"));
    if let Some(kb) = key_binding_jwt {
        token.push_str(kb);
    }
    token
}
