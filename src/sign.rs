//! # SD Signer (C6, format-plugged)
//!
//! Wraps a redacted payload in its format's signed envelope. Concrete
//! implementations live in [`crate::format`]; this module only defines the
//! contract both formats implement, reusing [`crate::envelope`]'s delegate
//! traits for the actual cryptographic operation.

use crate::cancel::CancellationToken;
use crate::envelope::EnvelopeSigner;
use crate::error::Result;
use crate::hash::HashAlgorithm;

/// Signs a redacted payload into a wire-ready, format-specific token.
pub trait SdSigner {
    /// Builds the signed envelope around `redacted_payload`.
    ///
    /// `media_type` is the format's `typ`/content-type header value; when
    /// `None`, implementations use their recommended default
    /// (`vc+sd-jwt` or `application/vc+cose`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Cancelled`] if `cancellation` is
    /// already cancelled, or propagates signing failures from `signer`.
    fn sign(
        &self,
        redacted_payload: &[u8],
        hash_algorithm: HashAlgorithm,
        media_type: Option<&str>,
        signer: &dyn EnvelopeSigner,
        cancellation: &CancellationToken,
    ) -> Result<Vec<u8>>;
}
