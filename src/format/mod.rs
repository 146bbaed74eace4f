//! # Format Plugins
//!
//! Concrete [`crate::redact::ClaimTreeCodec`]/[`crate::sign::SdSigner`] pairs
//! for the two credential formats this crate supports, plus the W3C VC
//! overload's path-boundary wrapper.

pub mod sd_cwt;
pub mod sd_jwt;

use crate::error::{Error, Result};
use crate::path::CredentialPath;

/// The claim name every disclosable path must be rooted under when a
/// credential is a W3C Verifiable Credential (SD-JWT VC or SD-CWT VC): the
/// credential's envelope claims (`iss`, `type`, `validFrom`, …) are never
/// individually disclosable, only the subject's claims are.
pub const VC_SUBJECT_ROOT: &str = "credentialSubject";

/// Validates that every path in `disclosable_paths` is rooted under
/// [`VC_SUBJECT_ROOT`], for the W3C VC overload of the format-neutral
/// pipeline.
///
/// # Errors
///
/// Returns [`Error::CannotRedactRoot`] for a root path, or
/// [`Error::NonPropertyLeaf`] for a path whose first segment is not
/// `credentialSubject`.
pub fn validate_vc_paths(disclosable_paths: &[CredentialPath]) -> Result<()> {
    for path in disclosable_paths {
        let Some(segments) = path.segments() else {
            // N-Quad paths carry no claim-tree boundary to enforce.
            continue;
        };
        match segments.first() {
            None => return Err(Error::CannotRedactRoot),
            Some(first) if first == VC_SUBJECT_ROOT => {}
            Some(_) => return Err(Error::NonPropertyLeaf(path.to_canonical_string())),
        }
    }
    Ok(())
}
