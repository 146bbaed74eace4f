//! A format-neutral selective disclosure engine for W3C Verifiable
//! Credentials, plugged into [SD-JWT] and [SD-CWT] as concrete wire formats.
//!
//! # Design
//!
//! The engine is split into a format-neutral core — path algebra
//! ([`path`]), a bounded disclosure lattice ([`lattice`], [`algorithms`]),
//! redaction/signing/verification ([`redact`], [`sign`], [`verify`]), and a
//! policy-narrowing pipeline ([`policy`], [`computation`]) — and a thin
//! per-format plugin layer ([`format`]) that supplies the wire codec and
//! signed envelope each format requires. Every operation that can disagree
//! with a caller's request (a policy assessor rejecting a credential, a
//! verifier's requirement going unmet) reports that disagreement as data, not
//! as an error; see [`error`] for the closed set of kinds that are.
//!
//! [SD-JWT]: https://www.ietf.org/archive/id/draft-ietf-oauth-selective-disclosure-jwt-17.html
//! [SD-CWT]: https://www.ietf.org/archive/id/draft-ietf-spice-sd-cwt-04.html

pub mod algorithms;
pub mod cancel;
pub mod computation;
pub mod disclosure;
pub mod envelope;
pub mod error;
pub mod format;
pub mod grouping;
pub mod hash;
pub mod issuance;
pub mod lattice;
pub mod path;
pub mod policy;
pub mod redact;
pub mod selection;
pub mod sign;
pub mod trace;
pub mod value;
pub mod verify;

pub use crate::disclosure::Disclosure;
pub use crate::error::{Error, Result};
pub use crate::hash::HashAlgorithm;
pub use crate::lattice::BoundedDisclosureLattice;
pub use crate::path::CredentialPath;
pub use crate::value::Value;
