//! # Hash Algorithms
//!
//! The three IANA "Named Information Hash Algorithm" identifiers this crate
//! supports natively, plus the [`Hasher`] trait disclosure digests are
//! computed through. Built-in implementations are backed by `sha2`, already
//! a teacher dependency used for SD-JWT disclosure hashing.

use base64ct::{Base64UrlUnpadded, Encoding};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// A hash algorithm identified by its IANA "Hash Name String".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HashAlgorithm {
    /// `sha-256`, 32-byte digests.
    Sha256,
    /// `sha-384`, 48-byte digests.
    Sha384,
    /// `sha-512`, 64-byte digests.
    Sha512,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl HashAlgorithm {
    /// The IANA identifier string, as written into `_sd_alg` / the COSE
    /// protected header.
    #[must_use]
    pub const fn iana_name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha-256",
            Self::Sha384 => "sha-384",
            Self::Sha512 => "sha-512",
        }
    }

    /// Parses an IANA identifier string.
    #[must_use]
    pub fn from_iana_name(name: &str) -> Option<Self> {
        match name {
            "sha-256" => Some(Self::Sha256),
            "sha-384" => Some(Self::Sha384),
            "sha-512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// The expected digest length in bytes for this algorithm.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Hashes `input`, returning the raw digest bytes.
    #[must_use]
    pub fn digest(self, input: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(input).to_vec(),
            Self::Sha384 => Sha384::digest(input).to_vec(),
            Self::Sha512 => Sha512::digest(input).to_vec(),
        }
    }
}
