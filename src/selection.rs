//! # Disclosure Selection (C8)
//!
//! Bridges format-specific [`Disclosure`]s and the path-set algebra in
//! [`crate::lattice`]/[`crate::algorithms`]. A property disclosure maps to
//! its own [`CredentialPath`]; an array-element disclosure (no claim name)
//! maps to a synthetic index path at its position in the disclosures list,
//! per the C8 mapping rule.

use std::collections::HashSet;

use crate::algorithms::{MinimumDisclosure, compute_maximum_disclosure, compute_minimum_disclosure, compute_optimal_disclosure};
use crate::disclosure::Disclosure;
use crate::hash::HashAlgorithm;
use crate::lattice::BoundedDisclosureLattice;
use crate::path::CredentialPath;

fn disclosure_path(disclosure: &Disclosure, index: usize) -> CredentialPath {
    if disclosure.claim_name.is_some() {
        disclosure.path.clone()
    } else {
        disclosure.path.parent().unwrap_or_else(CredentialPath::root).append_index(index).unwrap_or_else(|_| disclosure.path.clone())
    }
}

/// Builds the lattice a credential's disclosures live in: `Top` is every
/// disclosure's path, `Bottom` is `mandatory_paths`.
///
/// # Errors
///
/// Returns [`crate::error::Error::MandatoryNotSubset`] if `mandatory_paths`
/// is not a subset of the disclosures' paths.
pub fn create_lattice(
    disclosures: &[Disclosure],
    mandatory_paths: HashSet<CredentialPath>,
) -> crate::error::Result<BoundedDisclosureLattice<CredentialPath>> {
    let top: HashSet<CredentialPath> =
        disclosures.iter().enumerate().map(|(i, d)| disclosure_path(d, i)).collect();
    BoundedDisclosureLattice::new(top, mandatory_paths)
}

/// Filters `disclosures` down to the ones whose path is in `selected_paths`.
#[must_use]
pub fn select<'a>(
    disclosures: &'a [Disclosure],
    selected_paths: &HashSet<CredentialPath>,
) -> Vec<&'a Disclosure> {
    disclosures
        .iter()
        .enumerate()
        .filter(|(i, d)| selected_paths.contains(&disclosure_path(d, *i)))
        .map(|(_, d)| d)
        .collect()
}

/// Verifies that every disclosure's encoded-and-hashed form appears in
/// `expected_digests`.
#[must_use]
pub fn validate_digests(
    disclosures: &[Disclosure],
    expected_digests: &HashSet<Vec<u8>>,
    hash_algorithm: HashAlgorithm,
    encode_fn: impl Fn(&Disclosure) -> crate::error::Result<Vec<u8>>,
) -> bool {
    disclosures.iter().all(|d| {
        encode_fn(d)
            .map(|encoded| expected_digests.contains(&hash_algorithm.digest(&encoded)))
            .unwrap_or(false)
    })
}

/// The result of [`select_optimal`].
pub struct SelectOptimal<'a> {
    /// The disclosures that survive reconciliation.
    pub filtered: Vec<&'a Disclosure>,
    /// `true` iff the verifier's requirements are fully satisfied.
    pub satisfies_requirements: bool,
}

/// Delegates to [`crate::algorithms`] to reconcile a verifier's request
/// against a holder's exclusions, returning the disclosures to present.
#[must_use]
pub fn select_optimal<'a>(
    all_disclosures: &'a [Disclosure],
    verifier_requested: &HashSet<CredentialPath>,
    user_excluded: &HashSet<CredentialPath>,
    mandatory: HashSet<CredentialPath>,
) -> crate::error::Result<SelectOptimal<'a>> {
    let lattice = create_lattice(all_disclosures, mandatory)?;
    let minimum: MinimumDisclosure<CredentialPath> =
        compute_minimum_disclosure(&lattice, verifier_requested, &HashSet::new(), &HashSet::new());
    let maximum = compute_maximum_disclosure(&lattice, user_excluded);
    let optimal = compute_optimal_disclosure(&lattice, &minimum, &maximum);

    Ok(SelectOptimal { filtered: select(all_disclosures, &optimal.selected), satisfies_requirements: optimal.satisfies })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disclosure::SaltFactory;
    use crate::value::Value;

    struct FixedSalts(Vec<&'static str>);
    impl SaltFactory for FixedSalts {
        fn next_salt(&mut self) -> String {
            self.0.remove(0).to_string()
        }
    }

    fn sample_disclosures() -> Vec<Disclosure> {
        let mut salts = FixedSalts(vec!["s1", "s2"]);
        vec![
            Disclosure::property(
                CredentialPath::parse("/credentialSubject/given_name").unwrap(),
                "given_name",
                Value::String("Alice".into()),
                &mut salts,
            ),
            Disclosure::property(
                CredentialPath::parse("/credentialSubject/family_name").unwrap(),
                "family_name",
                Value::String("Smith".into()),
                &mut salts,
            ),
        ]
    }

    #[test]
    fn create_lattice_tops_out_at_all_disclosure_paths() {
        let disclosures = sample_disclosures();
        let lattice = create_lattice(&disclosures, HashSet::new()).unwrap();
        assert_eq!(lattice.top().len(), 2);
    }

    #[test]
    fn select_filters_by_path() {
        let disclosures = sample_disclosures();
        let mut selected = HashSet::new();
        selected.insert(CredentialPath::parse("/credentialSubject/given_name").unwrap());
        let filtered = select(&disclosures, &selected);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].claim_name.as_deref(), Some("given_name"));
    }

    #[test]
    fn select_optimal_narrows_to_verifier_minus_exclusions() {
        let disclosures = sample_disclosures();
        let mut verifier = HashSet::new();
        verifier.insert(CredentialPath::parse("/credentialSubject/given_name").unwrap());
        verifier.insert(CredentialPath::parse("/credentialSubject/family_name").unwrap());
        let mut excluded = HashSet::new();
        excluded.insert(CredentialPath::parse("/credentialSubject/family_name").unwrap());

        let result = select_optimal(&disclosures, &verifier, &excluded, HashSet::new()).unwrap();
        assert!(!result.satisfies_requirements);
        assert_eq!(result.filtered.len(), 1);
        assert_eq!(result.filtered[0].claim_name.as_deref(), Some("given_name"));
    }
}
