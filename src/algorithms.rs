//! # Selective-Disclosure Algorithms
//!
//! Pure, total functions over a [`BoundedDisclosureLattice`] that derive the
//! minimum, maximum, and optimal disclosure sets for a single credential, and
//! a deterministic greedy selector across multiple credentials. None of
//! these can fail: disagreements between what a verifier wants and what a
//! holder is willing to reveal are reported as data (`conflicts`,
//! `unavailable`), never as errors.

use std::collections::HashSet;
use std::hash::Hash;

use crate::lattice::BoundedDisclosureLattice;

/// The result of [`compute_minimum_disclosure`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinimumDisclosure<T: Eq + Hash + Clone> {
    /// The minimum path set: `Bottom ∪ selectable(verifier) ∪ mandatory(verifier) ∪ …`.
    pub selected: HashSet<T>,
    /// Paths requested by any input that are not present in the lattice's `Top`.
    pub unavailable: HashSet<T>,
}

/// Computes the minimum set of paths that must be disclosed to satisfy a
/// verifier's request, a set of regulatory requirements, and a set of
/// structural requirements (e.g. paths implied by the credential's schema).
/// Order of inputs does not affect the result since set union is
/// commutative.
#[must_use]
pub fn compute_minimum_disclosure<T: Eq + Hash + Clone>(
    lattice: &BoundedDisclosureLattice<T>,
    verifier: &HashSet<T>,
    regulatory: &HashSet<T>,
    structural: &HashSet<T>,
) -> MinimumDisclosure<T> {
    let mut selected = lattice.bottom().clone();
    let mut unavailable = HashSet::new();

    for requested in [verifier, regulatory, structural] {
        let normalized = lattice.normalize(Some(requested));
        selected.extend(normalized.mandatory_hit);
        selected.extend(normalized.selectable_hit);
        unavailable.extend(normalized.unavailable);
    }

    MinimumDisclosure { selected, unavailable }
}

/// Computes the maximum set of paths a holder is willing to disclose:
/// `Top \ (exclusions ∩ Selectable)`. Exclusions that name a mandatory
/// (`Bottom`) path are silently dropped — mandatory paths can never be
/// excluded.
#[must_use]
pub fn compute_maximum_disclosure<T: Eq + Hash + Clone>(
    lattice: &BoundedDisclosureLattice<T>,
    exclusions: &HashSet<T>,
) -> HashSet<T> {
    let selectable = lattice.selectable();
    let excluded_selectable: HashSet<T> = exclusions.intersection(&selectable).cloned().collect();
    lattice.top().difference(&excluded_selectable).cloned().collect()
}

/// The result of [`compute_optimal_disclosure`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptimalDisclosure<T: Eq + Hash + Clone> {
    /// The selected path set.
    pub selected: HashSet<T>,
    /// `true` iff the verifier's requirements are fully satisfied (i.e. the
    /// minimum set was achievable within the maximum set and nothing was
    /// unavailable).
    pub satisfies: bool,
    /// Paths the verifier required but the holder excluded (or the
    /// credential cannot provide): `Minimum \ Maximum`. Empty when
    /// `satisfies` is `true`.
    pub conflicts: HashSet<T>,
    /// Paths requested by any input that the credential cannot provide at
    /// all.
    pub unavailable: HashSet<T>,
}

/// Reconciles a [`MinimumDisclosure`] against a maximum (holder-willing) set.
///
/// If the minimum set is a subset of the maximum, the minimum is returned
/// verbatim with `satisfies = (unavailable is empty)`. Otherwise the best
/// achievable compromise — `(Minimum ∩ Maximum) ∪ Bottom` — is returned with
/// `satisfies = false` and the unreachable paths recorded as `conflicts`.
#[must_use]
pub fn compute_optimal_disclosure<T: Eq + Hash + Clone>(
    lattice: &BoundedDisclosureLattice<T>,
    minimum: &MinimumDisclosure<T>,
    maximum: &HashSet<T>,
) -> OptimalDisclosure<T> {
    if minimum.selected.is_subset(maximum) {
        return OptimalDisclosure {
            selected: minimum.selected.clone(),
            satisfies: minimum.unavailable.is_empty(),
            conflicts: HashSet::new(),
            unavailable: minimum.unavailable.clone(),
        };
    }

    let conflicts: HashSet<T> = minimum.selected.difference(maximum).cloned().collect();
    let mut selected: HashSet<T> = minimum.selected.intersection(maximum).cloned().collect();
    selected.extend(lattice.bottom().iter().cloned());

    OptimalDisclosure {
        selected,
        satisfies: false,
        conflicts,
        unavailable: minimum.unavailable.clone(),
    }
}

/// Returns `true` iff `selected` is a valid selection under `lattice` and
/// covers every selectable/mandatory path named in `requirements`.
#[must_use]
pub fn validate_disclosure<T: Eq + Hash + Clone>(
    lattice: &BoundedDisclosureLattice<T>,
    selected: &HashSet<T>,
    requirements: &HashSet<T>,
) -> bool {
    if !lattice.is_valid(selected) {
        return false;
    }
    let normalized = lattice.normalize(Some(requirements));
    let required_coverage: HashSet<T> =
        normalized.selectable_hit.union(&normalized.mandatory_hit).cloned().collect();
    required_coverage.is_subset(selected)
}

/// A candidate credential and the optimal disclosure computed for it, as
/// consumed by [`select_credentials`].
pub struct Candidate<'a, C, T: Eq + Hash + Clone> {
    /// The candidate credential.
    pub credential: &'a C,
    /// The optimal disclosure computed for this credential against the full
    /// requirement set.
    pub optimal: OptimalDisclosure<T>,
}

/// Greedily selects credentials to cover a requirement set.
///
/// At each step, picks the unused candidate whose optimal disclosure covers
/// the largest still-unsatisfied subset of `requirements`, breaking ties by
/// the candidates' stable input order. Terminates when the unsatisfied set
/// is empty or no remaining candidate makes progress.
///
/// This is a heuristic: the returned selection is not guaranteed to be
/// minimal, but it is deterministic for a fixed input order.
#[must_use]
pub fn select_credentials<'a, C, T: Eq + Hash + Clone>(
    candidates: &'a [Candidate<'a, C, T>],
    requirements: &HashSet<T>,
) -> Vec<&'a Candidate<'a, C, T>> {
    let mut unsatisfied: HashSet<T> = requirements.clone();
    let mut used = vec![false; candidates.len()];
    let mut selection = Vec::new();

    loop {
        let mut best: Option<(usize, usize)> = None; // (index, coverage)
        for (i, candidate) in candidates.iter().enumerate() {
            if used[i] {
                continue;
            }
            let coverage = candidate.optimal.selected.intersection(&unsatisfied).count();
            if coverage == 0 {
                continue;
            }
            match best {
                Some((_, best_coverage)) if best_coverage >= coverage => {}
                _ => best = Some((i, coverage)),
            }
        }

        let Some((index, _)) = best else {
            break;
        };
        used[index] = true;
        selection.push(&candidates[index]);
        for path in &candidates[index].optimal.selected {
            unsatisfied.remove(path);
        }
        if unsatisfied.is_empty() {
            break;
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn sample_lattice() -> BoundedDisclosureLattice<String> {
        BoundedDisclosureLattice::new(set(&["iss", "type", "A", "B", "C"]), set(&["iss", "type"]))
            .unwrap()
    }

    #[test]
    fn minimum_is_order_independent() {
        let lattice = sample_lattice();
        let verifier = set(&["A"]);
        let regulatory = set(&["B"]);
        let structural = set(&[]);
        let m1 = compute_minimum_disclosure(&lattice, &verifier, &regulatory, &structural);
        let m2 = compute_minimum_disclosure(&lattice, &regulatory, &verifier, &structural);
        assert_eq!(m1.selected, m2.selected);
        assert_eq!(m1.selected, set(&["iss", "type", "A", "B"]));
    }

    #[test]
    fn maximum_drops_excluded_mandatory() {
        let lattice = sample_lattice();
        // Excluding a mandatory path has no effect.
        let exclusions = set(&["iss", "A"]);
        let max = compute_maximum_disclosure(&lattice, &exclusions);
        assert_eq!(max, set(&["iss", "type", "B", "C"]));
    }

    #[test]
    fn optimal_disclosure_conflict_scenario() {
        // Scenario 4 from the spec: Top={A,B,C,iss,type}, Bottom={iss,type},
        // verifier-requested={B}, user-excluded={B}.
        let lattice = sample_lattice();
        let verifier = set(&["B"]);
        let minimum =
            compute_minimum_disclosure(&lattice, &verifier, &HashSet::new(), &HashSet::new());
        let maximum = compute_maximum_disclosure(&lattice, &set(&["B"]));
        let optimal = compute_optimal_disclosure(&lattice, &minimum, &maximum);

        assert!(!optimal.satisfies);
        assert_eq!(optimal.selected, set(&["iss", "type"]));
        assert_eq!(optimal.conflicts, set(&["B"]));
    }

    #[test]
    fn optimal_disclosure_satisfied_case() {
        let lattice = sample_lattice();
        let verifier = set(&["A"]);
        let minimum =
            compute_minimum_disclosure(&lattice, &verifier, &HashSet::new(), &HashSet::new());
        let maximum = compute_maximum_disclosure(&lattice, &HashSet::new());
        let optimal = compute_optimal_disclosure(&lattice, &minimum, &maximum);
        assert!(optimal.satisfies);
        assert_eq!(optimal.selected, set(&["iss", "type", "A"]));
        assert!(optimal.conflicts.is_empty());
    }

    #[test]
    fn validate_checks_coverage_and_bounds() {
        let lattice = sample_lattice();
        let requirements = set(&["A"]);
        assert!(validate_disclosure(&lattice, &set(&["iss", "type", "A"]), &requirements));
        assert!(!validate_disclosure(&lattice, &set(&["iss", "type"]), &requirements));
        assert!(!validate_disclosure(&lattice, &set(&["type", "A"]), &requirements)); // missing mandatory iss
    }

    #[test]
    fn greedy_selection_is_deterministic_and_terminates() {
        let lattice = sample_lattice();
        let requirements = set(&["A", "B", "C"]);

        let cred_a = "cred-a".to_string();
        let cred_b = "cred-b".to_string();

        let optimal_a = OptimalDisclosure {
            selected: set(&["A", "B"]),
            satisfies: false,
            conflicts: HashSet::new(),
            unavailable: HashSet::new(),
        };
        let optimal_b = OptimalDisclosure {
            selected: set(&["C"]),
            satisfies: false,
            conflicts: HashSet::new(),
            unavailable: HashSet::new(),
        };
        let candidates = vec![
            Candidate { credential: &cred_a, optimal: optimal_a },
            Candidate { credential: &cred_b, optimal: optimal_b },
        ];

        let selection = select_credentials(&candidates, &requirements);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection[0].credential, "cred-a");
        assert_eq!(selection[1].credential, "cred-b");
    }

    #[test]
    fn greedy_selection_terminates_without_progress() {
        let requirements = set(&["Z"]);
        let cred_a = "cred-a".to_string();
        let optimal_a = OptimalDisclosure {
            selected: set(&["A"]),
            satisfies: false,
            conflicts: HashSet::new(),
            unavailable: HashSet::new(),
        };
        let candidates = vec![Candidate { credential: &cred_a, optimal: optimal_a }];
        let selection = select_credentials(&candidates, &requirements);
        assert!(selection.is_empty());
    }
}
