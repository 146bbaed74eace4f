//! # SD Claim Verification (C12)
//!
//! Given an already envelope-verified payload (see [`crate::envelope`] for
//! C11) and the disclosures a holder chose to present, recomputes each
//! disclosure's digest, locates it in the payload's digest array at the
//! right nesting level, and splices the disclosed claim back into the tree.
//! Claim-level failures are non-fatal and reported per claim; only the
//! envelope-level check in C11 is fatal.

use crate::cancel::CancellationToken;
use crate::disclosure::Disclosure;
use crate::error::{Error, Result};
use crate::grouping::{ParentContainer, navigate_any_mut, navigate_mut};
use crate::hash::HashAlgorithm;
use crate::path::CredentialPath;
use crate::redact::ClaimTreeCodec;
use crate::value::Value;

/// The outcome of [`verify_sd_claims`]: the fully-disclosed claim tree plus
/// per-claim bookkeeping.
pub struct VerifiedClaims {
    /// The claim tree with every successfully-verified disclosure spliced
    /// back in.
    pub claims: Value,
    /// Paths that verified and were spliced back in.
    pub disclosed: Vec<CredentialPath>,
    /// Disclosures that failed digest verification, with the reason.
    pub claim_failures: Vec<(CredentialPath, Error)>,
}

fn count_occurrences(tree: &Value, target: &Value, key: &str) -> usize {
    match tree {
        Value::Map(entries) => {
            let mut count = entries
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| match v {
                    Value::Array(items) => Some(items.iter().filter(|i| *i == target).count()),
                    _ => None,
                })
                .unwrap_or(0);
            for (_, value) in entries {
                count += count_occurrences(value, target, key);
            }
            count
        }
        Value::Array(items) => items.iter().map(|item| count_occurrences(item, target, key)).sum(),
        _ => 0,
    }
}

fn count_tombstone_occurrences(tree: &Value, target: &Value, tombstone_key: &str) -> usize {
    let is_tombstone = |value: &Value| {
        matches!(value, Value::Map(entries)
            if entries.len() == 1 && entries[0].0 == tombstone_key && &entries[0].1 == target)
    };
    match tree {
        Value::Array(items) => {
            let mut count = items.iter().filter(|item| is_tombstone(item)).count();
            for item in items {
                count += count_tombstone_occurrences(item, target, tombstone_key);
            }
            count
        }
        Value::Map(entries) => {
            entries.iter().map(|(_, v)| count_tombstone_occurrences(v, target, tombstone_key)).sum()
        }
        _ => 0,
    }
}

fn splice_property(
    tree: &mut Value,
    parent: &CredentialPath,
    digest: &Value,
    disclosure: &Disclosure,
    digest_key: &str,
) -> Result<()> {
    let entries = navigate_mut(tree, parent)?;
    if let Some((_, Value::Array(items))) = entries.iter_mut().find(|(key, _)| key == digest_key) {
        items.retain(|item| item != digest);
    }
    if let Some(name) = &disclosure.claim_name {
        entries.push((name.clone(), disclosure.claim_value.clone()));
    }
    Ok(())
}

fn splice_array_element(tree: &mut Value, parent: &CredentialPath, disclosure: &Disclosure) -> Result<()> {
    let ParentContainer::Array(items) = navigate_any_mut(tree, parent)? else {
        return Err(Error::PathNotResolvable(disclosure.path.to_canonical_string()));
    };
    let leaf = disclosure
        .path
        .leaf()
        .ok_or_else(|| Error::PathNotResolvable(disclosure.path.to_canonical_string()))?;
    let index: usize = leaf
        .parse()
        .map_err(|_| Error::PathNotResolvable(disclosure.path.to_canonical_string()))?;
    let slot = items
        .get_mut(index)
        .ok_or_else(|| Error::PathNotResolvable(disclosure.path.to_canonical_string()))?;
    *slot = disclosure.claim_value.clone();
    Ok(())
}

fn find_leaf<'a>(tree: &'a Value, path: &CredentialPath) -> Option<&'a Value> {
    let segments = path.segments()?;
    let mut current = tree;
    for segment in segments {
        let Value::Map(entries) = current else { return None };
        current = &entries.iter().find(|(key, _)| key == segment)?.1;
    }
    Some(current)
}

/// Verifies and splices `disclosures` into `payload_bytes`.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancellation` is cancelled before any
/// disclosure is processed or between disclosures,
/// [`Error::InvalidTokenStructure`] if `payload_bytes` does not
/// parse, or [`Error::MandatoryClaimsMissing`] if any `mandatory_paths` leaf
/// is absent from the final claim tree. Individual digest mismatches are
/// reported in [`VerifiedClaims::claim_failures`] rather than failing the
/// whole call.
pub fn verify_sd_claims(
    payload_bytes: &[u8],
    disclosures: &[Disclosure],
    codec: &dyn ClaimTreeCodec,
    mandatory_paths: &[CredentialPath],
    hash_algorithm: HashAlgorithm,
    cancellation: &CancellationToken,
) -> Result<VerifiedClaims> {
    cancellation.check()?;
    let mut tree = codec.parse(payload_bytes)?;
    let mut disclosed = Vec::new();
    let mut claim_failures = Vec::new();

    for disclosure in disclosures {
        cancellation.check()?;
        let encoded = match codec.encode_disclosure(disclosure) {
            Ok(bytes) => bytes,
            Err(err) => {
                claim_failures.push((disclosure.path.clone(), err));
                continue;
            }
        };
        let digest = codec.digest_value(hash_algorithm.digest(&encoded));

        let Some(parent) = disclosure.path.parent() else {
            claim_failures.push((disclosure.path.clone(), Error::CannotRedactRoot));
            continue;
        };

        let spliced = if disclosure.claim_name.is_some() {
            let total = count_occurrences(&tree, &digest, codec.digest_key());
            if total == 1 {
                splice_property(&mut tree, &parent, &digest, disclosure, codec.digest_key())
            } else {
                Err(Error::DigestMismatch(disclosure.path.to_canonical_string()))
            }
        } else {
            let total = count_tombstone_occurrences(&tree, &digest, codec.array_tombstone_key());
            if total == 1 {
                splice_array_element(&mut tree, &parent, disclosure)
            } else {
                Err(Error::DigestMismatch(disclosure.path.to_canonical_string()))
            }
        };

        match spliced {
            Ok(()) => disclosed.push(disclosure.path.clone()),
            Err(err) => claim_failures.push((disclosure.path.clone(), err)),
        }
    }

    let missing: Vec<String> = mandatory_paths
        .iter()
        .filter(|path| find_leaf(&tree, path).is_none())
        .map(CredentialPath::to_canonical_string)
        .collect();
    if !missing.is_empty() {
        return Err(Error::MandatoryClaimsMissing(missing));
    }

    Ok(VerifiedClaims { claims: tree, disclosed, claim_failures })
}
