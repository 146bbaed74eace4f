//! # Bounded Disclosure Lattice
//!
//! A [`BoundedDisclosureLattice`] pairs a `Top` set (every path a credential
//! *could* disclose) with a `Bottom` set (paths that must always be
//! disclosed). `Selectable = Top \ Bottom` is the set a holder may choose
//! from. All operations are pure set algebra; nothing here allocates beyond
//! the output set.

use std::collections::HashSet;
use std::hash::Hash;

use crate::error::{Error, Result};

/// A pair of bounds (`Top`, `Bottom`) with `Bottom ⊆ Top`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoundedDisclosureLattice<T: Eq + Hash + Clone> {
    top: HashSet<T>,
    bottom: HashSet<T>,
}

/// The result of [`BoundedDisclosureLattice::normalize`]: a requested path
/// set partitioned against the lattice's bounds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Normalized<T: Eq + Hash + Clone> {
    /// Requested paths that are mandatory (in `Bottom`).
    pub mandatory_hit: HashSet<T>,
    /// Requested paths that are selectable (in `Top \ Bottom`).
    pub selectable_hit: HashSet<T>,
    /// Requested paths not present in `Top` at all.
    pub unavailable: HashSet<T>,
}

impl<T: Eq + Hash + Clone> BoundedDisclosureLattice<T> {
    /// Constructs a lattice from its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MandatoryNotSubset`] if `bottom` is not a subset of
    /// `top`.
    pub fn new(top: HashSet<T>, bottom: HashSet<T>) -> Result<Self> {
        if !bottom.is_subset(&top) {
            return Err(Error::MandatoryNotSubset);
        }
        Ok(Self { top, bottom })
    }

    /// The `Top` set: every path the credential could disclose.
    #[must_use]
    pub const fn top(&self) -> &HashSet<T> {
        &self.top
    }

    /// The `Bottom` set: paths that must always be disclosed.
    #[must_use]
    pub const fn bottom(&self) -> &HashSet<T> {
        &self.bottom
    }

    /// `Top \ Bottom`: paths revealable at the holder's discretion.
    #[must_use]
    pub fn selectable(&self) -> HashSet<T> {
        self.top.difference(&self.bottom).cloned().collect()
    }

    /// Set union of this lattice's `Top` with `other`.
    #[must_use]
    pub fn join(&self, other: &HashSet<T>) -> HashSet<T> {
        self.top.union(other).cloned().collect()
    }

    /// Set intersection of this lattice's `Top` with `other`.
    #[must_use]
    pub fn meet(&self, other: &HashSet<T>) -> HashSet<T> {
        self.top.intersection(other).cloned().collect()
    }

    /// Partitions `requested` (if any) into mandatory-hit, selectable-hit,
    /// and unavailable subsets. Given `None`, all three sets are empty.
    #[must_use]
    pub fn normalize(&self, requested: Option<&HashSet<T>>) -> Normalized<T> {
        let Some(requested) = requested else {
            return Normalized {
                mandatory_hit: HashSet::new(),
                selectable_hit: HashSet::new(),
                unavailable: HashSet::new(),
            };
        };
        let mut mandatory_hit = HashSet::new();
        let mut selectable_hit = HashSet::new();
        let mut unavailable = HashSet::new();
        for path in requested {
            if self.bottom.contains(path) {
                mandatory_hit.insert(path.clone());
            } else if self.top.contains(path) {
                selectable_hit.insert(path.clone());
            } else {
                unavailable.insert(path.clone());
            }
        }
        Normalized { mandatory_hit, selectable_hit, unavailable }
    }

    /// Returns `true` iff `Bottom ⊆ candidate ⊆ Top`.
    #[must_use]
    pub fn is_valid(&self, candidate: &HashSet<T>) -> bool {
        self.bottom.is_subset(candidate) && candidate.is_subset(&self.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn rejects_bottom_not_subset_of_top() {
        let top = set(&["a", "b"]);
        let bottom = set(&["a", "c"]);
        assert!(matches!(
            BoundedDisclosureLattice::new(top, bottom),
            Err(Error::MandatoryNotSubset)
        ));
    }

    #[test]
    fn selectable_is_top_minus_bottom() {
        let lattice = BoundedDisclosureLattice::new(set(&["a", "b", "c"]), set(&["a"])).unwrap();
        assert_eq!(lattice.selectable(), set(&["b", "c"]));
    }

    #[test]
    fn normalize_none_is_all_empty() {
        let lattice = BoundedDisclosureLattice::new(set(&["a"]), set(&["a"])).unwrap();
        let normalized = lattice.normalize(None);
        assert!(normalized.mandatory_hit.is_empty());
        assert!(normalized.selectable_hit.is_empty());
        assert!(normalized.unavailable.is_empty());
    }

    #[test]
    fn normalize_partitions_requested() {
        let lattice =
            BoundedDisclosureLattice::new(set(&["iss", "type", "A", "B"]), set(&["iss", "type"]))
                .unwrap();
        let requested = set(&["iss", "A", "Z"]);
        let normalized = lattice.normalize(Some(&requested));
        assert_eq!(normalized.mandatory_hit, set(&["iss"]));
        assert_eq!(normalized.selectable_hit, set(&["A"]));
        assert_eq!(normalized.unavailable, set(&["Z"]));
    }

    #[test]
    fn is_valid_checks_bounds() {
        let lattice = BoundedDisclosureLattice::new(set(&["a", "b"]), set(&["a"])).unwrap();
        assert!(lattice.is_valid(&set(&["a"])));
        assert!(lattice.is_valid(&set(&["a", "b"])));
        assert!(!lattice.is_valid(&set(&[]))); // missing mandatory `a`
        assert!(!lattice.is_valid(&set(&["a", "b", "c"]))); // `c` not in top
    }
}
