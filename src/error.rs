//! # Error Kinds
//!
//! The selective disclosure engine and SD pipeline surface a small, closed set
//! of error kinds. Computation-time disagreements between a verifier's
//! request and a holder's exclusions are *not* modeled as errors: they are
//! recorded in a [`crate::computation::CredentialDisclosureDecision`] as
//! `conflicts`/`unavailable` with `satisfies_requirements = false`. Only
//! construction-time and contract violations, and verification failures, are
//! errors.

use thiserror::Error;

/// Errors produced by the core selective disclosure engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A JSON-Pointer string violates RFC 6901.
    #[error("malformed pointer: {0}")]
    MalformedPointer(String),

    /// An operation that only makes sense on a JSON-Pointer path
    /// (`append`/`append_index`) was called on an N-Quad path.
    #[error("operation is not valid on an N-Quad path")]
    NotAJsonPath,

    /// An encoded disclosure could not be parsed, or its shape is invalid for
    /// the declared hash algorithm.
    #[error("malformed disclosure: {0}")]
    MalformedDisclosure(String),

    /// A disclosable path resolved to the credential path's `Root`.
    #[error("cannot redact the root of a claim tree")]
    CannotRedactRoot,

    /// A leaf segment cannot be interpreted as a property name in the target
    /// format (e.g. SD-CWT requires integer-like keys).
    #[error("leaf segment `{0}` is not a valid property name for this format")]
    NonPropertyLeaf(String),

    /// A parent path could not be navigated to inside a claim tree: a segment
    /// is missing, or resolves to a non-map value.
    #[error("path `{0}` is not resolvable in the claim tree")]
    PathNotResolvable(String),

    /// `Bottom` is not a subset of `Top` when constructing a
    /// [`crate::lattice::BoundedDisclosureLattice`].
    #[error("mandatory path set is not a subset of the top set")]
    MandatoryNotSubset,

    /// A policy assessor attempted to add paths beyond the currently proposed
    /// set, violating the narrowing-only contract.
    #[error("policy assessor `{0}` widened the disclosure set")]
    PolicyWidenedDisclosure(String),

    /// A disclosure's digest was not found exactly once in the expected
    /// digest set at verification time.
    #[error("digest mismatch for disclosure `{0}`")]
    DigestMismatch(String),

    /// One or more issuer-declared mandatory claims are missing from the
    /// fully-disclosed credential.
    #[error("mandatory claims missing: {0:?}")]
    MandatoryClaimsMissing(Vec<String>),

    /// Envelope signature verification failed.
    #[error("signature invalid")]
    SignatureInvalid,

    /// The key tag referenced by the envelope could not be resolved to a
    /// verification method.
    #[error("verification method not found for key tag `{0}`")]
    VerificationMethodNotFound(String),

    /// The wire token does not have the expected structure (segment count,
    /// COSE tag, etc).
    #[error("invalid token structure: {0}")]
    InvalidTokenStructure(String),

    /// A base (unredacted) proof could not be parsed.
    #[error("malformed base proof: {0}")]
    MalformedBaseProof(String),

    /// A derived (redacted/disclosed) proof could not be parsed.
    #[error("malformed derived proof: {0}")]
    MalformedDerivedProof(String),

    /// The operation was cancelled cooperatively before completion.
    #[error("operation cancelled")]
    Cancelled,
}

/// Convenience alias for fallible core operations.
pub type Result<T> = std::result::Result<T, Error>;
