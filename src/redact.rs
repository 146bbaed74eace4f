//! # SD Redactor (C5, format-plugged)
//!
//! [`redact`] is the format-neutral half of the redaction algorithm: it
//! walks a parsed claim tree, pulls the disclosable leaves out of it into
//! [`Disclosure`]s, and hands the accumulated digests to
//! [`crate::grouping::place_digests`]. Parsing, serialization, and the
//! digest's wire shape (`_sd` string vs `simple(59)` byte-string) are
//! supplied by a [`ClaimTreeCodec`] implementation per format.

use std::collections::HashMap;

use crate::disclosure::{Disclosure, SaltFactory};
use crate::error::{Error, Result};
use crate::grouping::{ParentContainer, navigate_any_mut, place_digests};
use crate::hash::HashAlgorithm;
use crate::path::CredentialPath;
use crate::value::Value;

/// Format-specific glue the redactor delegates to.
pub trait ClaimTreeCodec {
    /// Parses wire bytes into a claim tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTokenStructure`] if `payload_bytes` does not
    /// decode as this format's native shape.
    fn parse(&self, payload_bytes: &[u8]) -> Result<Value>;

    /// Serializes a claim tree back to wire bytes, in the format's
    /// deterministic encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTokenStructure`] on encoding failure.
    fn serialize(&self, tree: &Value) -> Result<Vec<u8>>;

    /// Encodes a single disclosure to its canonical bytes (the preimage
    /// that gets hashed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTokenStructure`] on encoding failure.
    fn encode_disclosure(&self, disclosure: &Disclosure) -> Result<Vec<u8>>;

    /// The key a digest array is written under (`"_sd"` for SD-JWT, the
    /// CBOR `simple(59)` sentinel key for SD-CWT).
    fn digest_key(&self) -> &str;

    /// Wraps a raw digest in the format's wire representation (base64url
    /// string for SD-JWT, raw byte string for SD-CWT).
    fn digest_value(&self, digest: Vec<u8>) -> Value;

    /// The byte key used to sort a parent's digest array deterministically.
    fn sort_key(&self, value: &Value) -> Vec<u8>;

    /// The single key an in-place array-element tombstone is written under,
    /// replacing the disclosed element with `{ array_tombstone_key():
    /// digest }` (SD-JWT's literal `"..."` marker; SD-CWT has no distinct
    /// convention of its own and reuses the same text key).
    fn array_tombstone_key(&self) -> &str {
        "..."
    }

    /// Validates that a leaf segment name is a legal property key in this
    /// format. The default accepts any segment (SD-JWT object keys are
    /// unconstrained UTF-8); SD-CWT overrides this to require an
    /// integer-parseable segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonPropertyLeaf`] if `segment` is not a legal key.
    fn validate_leaf_segment(&self, _segment: &str) -> Result<()> {
        Ok(())
    }

    /// Runs any format-specific finalization after digests are placed, e.g.
    /// writing `_sd_alg` at the SD-JWT root. `placed` is `true` iff at least
    /// one digest was written anywhere in the tree.
    fn finalize(&self, _tree: &mut Value, _hash_algorithm: HashAlgorithm, _placed: bool) {}
}

/// Redacts `disclosable_paths` out of `payload_bytes`, returning the
/// redacted payload and the disclosures extracted from it.
///
/// A path whose parent resolves to an object removes the named property and
/// records its digest in that parent's `_sd`/`simple(59)` array. A path
/// whose parent resolves to an array replaces the element in place with a
/// single-key tombstone map (see [`ClaimTreeCodec::array_tombstone_key`]),
/// per the array-element disclosure case.
///
/// Determinism: the only source of randomness is `salts`; given the same
/// salt sequence, this function is byte-deterministic.
///
/// # Errors
///
/// Returns [`Error::CannotRedactRoot`] if a disclosable path is the root,
/// [`Error::NonPropertyLeaf`] if a leaf segment is not a legal property key
/// for this format, or [`Error::PathNotResolvable`] if a path does not
/// resolve inside the parsed tree.
pub fn redact(
    payload_bytes: &[u8],
    disclosable_paths: &[CredentialPath],
    salts: &mut impl SaltFactory,
    hash_algorithm: HashAlgorithm,
    codec: &dyn ClaimTreeCodec,
) -> Result<(Vec<u8>, Vec<Disclosure>)> {
    let mut tree = codec.parse(payload_bytes)?;
    let mut disclosures = Vec::with_capacity(disclosable_paths.len());
    let mut digests_by_parent: HashMap<CredentialPath, Vec<Value>> = HashMap::new();

    for path in disclosable_paths {
        if path.is_root() {
            return Err(Error::CannotRedactRoot);
        }
        let Some(leaf) = path.leaf() else {
            // N-Quad paths belong to a separate redaction pipeline.
            continue;
        };
        let parent = path.parent().expect("non-root JSON-Pointer path has a parent");

        match navigate_any_mut(&mut tree, &parent)? {
            ParentContainer::Map(entries) => {
                codec.validate_leaf_segment(leaf)?;
                let index = entries
                    .iter()
                    .position(|(key, _)| key == leaf)
                    .ok_or_else(|| Error::PathNotResolvable(path.to_canonical_string()))?;
                let (_, claim_value) = entries.remove(index);

                let disclosure = Disclosure::property(path.clone(), leaf, claim_value, salts);
                let encoded = codec.encode_disclosure(&disclosure)?;
                let digest = hash_algorithm.digest(&encoded);
                digests_by_parent.entry(parent).or_default().push(codec.digest_value(digest));
                disclosures.push(disclosure);
            }
            ParentContainer::Array(items) => {
                let index: usize = leaf
                    .parse()
                    .map_err(|_| Error::PathNotResolvable(path.to_canonical_string()))?;
                let claim_value = items
                    .get(index)
                    .cloned()
                    .ok_or_else(|| Error::PathNotResolvable(path.to_canonical_string()))?;

                let disclosure = Disclosure::array_element(path.clone(), claim_value, salts);
                let encoded = codec.encode_disclosure(&disclosure)?;
                let digest = hash_algorithm.digest(&encoded);
                items[index] = Value::Map(vec![(
                    codec.array_tombstone_key().to_string(),
                    codec.digest_value(digest),
                )]);
                disclosures.push(disclosure);
            }
        }
    }

    let placed = !digests_by_parent.is_empty();
    place_digests(&mut tree, digests_by_parent, codec.digest_key(), |v| codec.sort_key(v))?;
    codec.finalize(&mut tree, hash_algorithm, placed);

    let redacted_bytes = codec.serialize(&tree)?;
    Ok((redacted_bytes, disclosures))
}
