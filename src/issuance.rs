//! # SD Issuance Orchestrator (C7)
//!
//! Wires [`crate::redact`] and [`crate::sign`] together, filling in the
//! defaults a caller would otherwise have to repeat at every call site.
//! Owns only the glue: all parsing, sensitive material, and signing live
//! inside the plugged [`crate::redact::ClaimTreeCodec`] and
//! [`crate::sign::SdSigner`] delegates.

use tracing::instrument;

use crate::cancel::CancellationToken;
use crate::disclosure::{Disclosure, SaltFactory};
use crate::envelope::EnvelopeSigner;
use crate::error::Result;
use crate::hash::HashAlgorithm;
use crate::path::CredentialPath;
use crate::redact::{ClaimTreeCodec, redact};
use crate::sign::SdSigner;

/// Issuance-time overrides. `hash_algorithm` defaults to `sha-256`;
/// `media_type` defaults to the format's recommended value when `None`.
#[derive(Clone, Debug, Default)]
pub struct IssuanceOptions {
    /// The digest algorithm used for `_sd`/`simple(59)` entries.
    pub hash_algorithm: HashAlgorithm,
    /// Overrides the format's default `typ`/content-type header value.
    pub media_type: Option<String>,
}

/// The output of [`issue`]: a signed, wire-ready token plus the disclosures
/// extracted from the payload.
#[derive(Clone, Debug)]
pub struct IssuedCredential {
    /// The signed envelope bytes (compact JWS string bytes, or CBOR
    /// COSE_Sign1 bytes).
    pub token: Vec<u8>,
    /// The disclosures a holder must later choose among when presenting.
    pub disclosures: Vec<Disclosure>,
}

/// Redacts `payload_bytes` at `disclosable_paths` and signs the result.
///
/// # Errors
///
/// Returns [`crate::error::Error::Cancelled`] if `cancellation` is already
/// cancelled, or propagates [`crate::redact::redact`]'s and the signer's
/// errors.
#[instrument(level = "debug", skip(payload_bytes, salts, codec, signer_impl, envelope_signer, cancellation))]
pub fn issue(
    payload_bytes: &[u8],
    disclosable_paths: &[CredentialPath],
    salts: &mut impl SaltFactory,
    codec: &dyn ClaimTreeCodec,
    signer_impl: &dyn SdSigner,
    envelope_signer: &dyn EnvelopeSigner,
    options: IssuanceOptions,
    cancellation: &CancellationToken,
) -> Result<IssuedCredential> {
    cancellation.check()?;
    let (redacted_payload, disclosures) =
        redact(payload_bytes, disclosable_paths, salts, options.hash_algorithm, codec)?;

    let token = signer_impl.sign(
        &redacted_payload,
        options.hash_algorithm,
        options.media_type.as_deref(),
        envelope_signer,
        cancellation,
    )?;

    tracing::debug!(disclosure_count = disclosures.len(), "issued selectively-disclosable credential");

    Ok(IssuedCredential { token, disclosures })
}
