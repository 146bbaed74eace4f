//! # Path Grouping & Digest Placement (C4)
//!
//! Two format-neutral operations shared by every redactor
//! ([`crate::redact`]): grouping disclosable paths by their parent so a
//! redactor can remove each leaf and record a digest against the right
//! container, and splicing the accumulated digests back into a claim tree
//! at issuance/presentation time.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::path::CredentialPath;
use crate::value::Value;

/// Groups `paths` by parent, recording each path's leaf segment name under
/// its parent path.
///
/// N-Quad paths are skipped; they belong to a separate, non-tree redaction
/// pipeline this crate does not model.
///
/// # Errors
///
/// Returns [`Error::CannotRedactRoot`] if any JSON-Pointer path is the root.
pub fn group_by_parent(
    paths: &[CredentialPath],
) -> Result<HashMap<CredentialPath, Vec<String>>> {
    let mut groups: HashMap<CredentialPath, Vec<String>> = HashMap::new();
    for path in paths {
        if path.segments().is_none() {
            continue;
        }
        if path.is_root() {
            return Err(Error::CannotRedactRoot);
        }
        let parent = path.parent().expect("non-root JSON-Pointer path has a parent");
        let leaf = path.leaf().expect("non-root JSON-Pointer path has a leaf").to_string();
        groups.entry(parent).or_default().push(leaf);
    }
    Ok(groups)
}

fn step_into<'a>(current: &'a mut Value, segment: &str, parent: &CredentialPath) -> Result<&'a mut Value> {
    match current {
        Value::Map(entries) => entries
            .iter_mut()
            .find(|(key, _)| key == segment)
            .map(|(_, next)| next)
            .ok_or_else(|| Error::PathNotResolvable(parent.to_canonical_string())),
        Value::Array(items) => {
            let index: usize = segment
                .parse()
                .map_err(|_| Error::PathNotResolvable(parent.to_canonical_string()))?;
            items.get_mut(index).ok_or_else(|| Error::PathNotResolvable(parent.to_canonical_string()))
        }
        _ => Err(Error::PathNotResolvable(parent.to_canonical_string())),
    }
}

/// Navigates `tree` to the map at `parent`, creating no intermediate nodes.
/// Intermediate segments may pass through array elements (by index); only
/// the final container must be a map.
///
/// # Errors
///
/// Returns [`Error::PathNotResolvable`] if a segment along the way is
/// missing or does not resolve to a map.
pub fn navigate_mut<'a>(
    tree: &'a mut Value,
    parent: &CredentialPath,
) -> Result<&'a mut Vec<(String, Value)>> {
    let Some(segments) = parent.segments() else {
        return Err(Error::PathNotResolvable(parent.to_canonical_string()));
    };
    let mut current = tree;
    for segment in segments {
        current = step_into(current, segment, parent)?;
    }
    match current {
        Value::Map(entries) => Ok(entries),
        _ => Err(Error::PathNotResolvable(parent.to_canonical_string())),
    }
}

/// The container a [`navigate_any_mut`] parent path resolves to.
pub enum ParentContainer<'a> {
    /// An object: the leaf segment names one of its entries.
    Map(&'a mut Vec<(String, Value)>),
    /// An array: the leaf segment is the element's index.
    Array(&'a mut Vec<Value>),
}

/// Navigates `tree` to the container at `parent`, whether a map or an array,
/// so a redactor can remove a property leaf or tombstone an array element
/// through the same traversal.
///
/// # Errors
///
/// Returns [`Error::PathNotResolvable`] if a segment along the way is
/// missing or the final container is neither a map nor an array.
pub fn navigate_any_mut<'a>(
    tree: &'a mut Value,
    parent: &CredentialPath,
) -> Result<ParentContainer<'a>> {
    let Some(segments) = parent.segments() else {
        return Err(Error::PathNotResolvable(parent.to_canonical_string()));
    };
    let mut current = tree;
    for segment in segments {
        current = step_into(current, segment, parent)?;
    }
    match current {
        Value::Map(entries) => Ok(ParentContainer::Map(entries)),
        Value::Array(items) => Ok(ParentContainer::Array(items)),
        _ => Err(Error::PathNotResolvable(parent.to_canonical_string())),
    }
}

/// Writes the accumulated digests back into `tree` under `digest_key`,
/// sorting each parent's digest list by `sort_key` before insertion so the
/// emitted array is deterministic regardless of redaction order.
///
/// If an entry already exists at `digest_key` under a parent (e.g. a prior
/// placement pass, or decoys added by the caller) its existing elements are
/// merged in before sorting and re-inserted rather than overwritten, since
/// [`crate::grouping`] may be invoked more than once against the same tree
/// (issuance followed by decoy insertion).
///
/// # Errors
///
/// Propagates [`navigate_mut`]'s errors.
pub fn place_digests(
    tree: &mut Value,
    digests_by_parent: HashMap<CredentialPath, Vec<Value>>,
    digest_key: &str,
    sort_key: impl Fn(&Value) -> Vec<u8>,
) -> Result<()> {
    for (parent, mut digests) in digests_by_parent {
        let entries = navigate_mut(tree, &parent)?;
        if let Some((_, Value::Array(existing))) =
            entries.iter_mut().find(|(key, _)| key == digest_key)
        {
            digests.append(existing);
        }
        digests.sort_by_key(&sort_key);
        digests.dedup_by(|a, b| sort_key(a) == sort_key(b));

        if let Some(entry) = entries.iter_mut().find(|(key, _)| key == digest_key) {
            entry.1 = Value::Array(digests);
        } else {
            entries.push((digest_key.to_string(), Value::Array(digests)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn groups_paths_by_parent() {
        let a = CredentialPath::parse("/credentialSubject/degree").unwrap();
        let b = CredentialPath::parse("/credentialSubject/name").unwrap();
        let groups = group_by_parent(&[a.clone(), b.clone()]).unwrap();
        let parent = CredentialPath::parse("/credentialSubject").unwrap();
        let mut leaves = groups.get(&parent).unwrap().clone();
        leaves.sort();
        assert_eq!(leaves, vec!["degree".to_string(), "name".to_string()]);
    }

    #[test]
    fn rejects_root_path() {
        assert!(matches!(group_by_parent(&[CredentialPath::root()]), Err(Error::CannotRedactRoot)));
    }

    #[test]
    fn skips_nquad_paths() {
        let groups = group_by_parent(&[CredentialPath::nquad(3)]).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn place_digests_sorts_and_writes_under_key() {
        let mut tree = map(vec![("credentialSubject", map(vec![("degree", Value::String("BSc".into()))]))]);
        let parent = CredentialPath::parse("/credentialSubject").unwrap();
        let mut digests = HashMap::new();
        digests.insert(
            parent.clone(),
            vec![Value::String("zzz".into()), Value::String("aaa".into())],
        );
        place_digests(&mut tree, digests, "_sd", |v| match v {
            Value::String(s) => s.as_bytes().to_vec(),
            _ => Vec::new(),
        })
        .unwrap();

        let entries = navigate_mut(&mut tree, &CredentialPath::root()).unwrap();
        let cred_subject = entries.iter().find(|(k, _)| k == "credentialSubject").unwrap();
        let Value::Map(inner) = &cred_subject.1 else { panic!("expected map") };
        let sd = inner.iter().find(|(k, _)| k == "_sd").unwrap();
        assert_eq!(
            sd.1,
            Value::Array(vec![Value::String("aaa".into()), Value::String("zzz".into())])
        );
    }

    #[test]
    fn navigate_any_mut_resolves_array_parent() {
        let mut tree =
            map(vec![("nationalities", Value::Array(vec![Value::String("DE".into())]))]);
        let parent = CredentialPath::parse("/nationalities").unwrap();
        match navigate_any_mut(&mut tree, &parent).unwrap() {
            ParentContainer::Array(items) => assert_eq!(items.len(), 1),
            ParentContainer::Map(_) => panic!("expected array"),
        }
    }

    #[test]
    fn place_digests_reports_unresolvable_parent() {
        let mut tree = map(vec![]);
        let parent = CredentialPath::parse("/missing").unwrap();
        let mut digests = HashMap::new();
        digests.insert(parent, vec![Value::String("x".into())]);
        let result = place_digests(&mut tree, digests, "_sd", |_| Vec::new());
        assert!(matches!(result, Err(Error::PathNotResolvable(_))));
    }
}
