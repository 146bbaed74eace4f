//! # Policy Assessor Pipeline (C10)
//!
//! An assessor inspects one credential's proposed disclosure and either
//! rejects it outright, narrows it, or lets it through unchanged. The
//! pipeline is strictly sequential — assessors never run concurrently
//! against the same credential — and an assessor may never *widen* the
//! proposed set; attempting to is a contract violation, not a disagreement,
//! and surfaces as [`crate::error::Error::PolicyWidenedDisclosure`].
//!
//! `async_trait` makes the assessor trait object-safe so rule engines,
//! SAT/ILP solvers, ML scorers, and interactive consent mediators can all
//! implement it and be composed in the same pipeline.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::lattice::BoundedDisclosureLattice;
use crate::path::CredentialPath;
use crate::trace::PolicyRecord;

/// Everything an assessor needs to decide on one credential within one
/// match.
pub struct AssessmentContext<'a, C> {
    /// The candidate credential.
    pub credential: &'a C,
    /// The requirement id this assessment is for.
    pub requirement_id: &'a str,
    /// The currently-proposed disclosure set, narrowed by any assessor that
    /// ran before this one.
    pub proposed_paths: &'a HashSet<CredentialPath>,
    /// The credential's disclosure lattice.
    pub lattice: &'a BoundedDisclosureLattice<CredentialPath>,
    /// Whether `proposed_paths` currently satisfies the verifier's request.
    pub satisfies: bool,
    /// Paths the verifier required that are not currently reachable.
    pub conflicts: &'a HashSet<CredentialPath>,
    /// The credential's format tag (`"sd-jwt"`, `"sd-cwt"`, …).
    pub format: &'a str,
}

/// An assessor's decision for one credential.
#[derive(Clone, Debug)]
pub struct AssessmentOutcome {
    /// Whether the credential is approved at all. `false` drops the
    /// credential from consideration entirely.
    pub approved: bool,
    /// `None` means "no narrowing"; `Some(paths)` narrows the proposed set
    /// to exactly `paths` (which may be empty).
    pub approved_paths: Option<HashSet<CredentialPath>>,
    /// The assessor's self-reported name, recorded in the trace.
    pub assessor_name: String,
    /// An optional free-text justification.
    pub reason: Option<String>,
}

/// A policy assessor: an asynchronous function from an [`AssessmentContext`]
/// to an [`AssessmentOutcome`].
#[async_trait]
pub trait PolicyAssessor<C: Sync>: Send + Sync {
    /// Assesses one credential's proposed disclosure.
    async fn assess(&self, context: AssessmentContext<'_, C>) -> AssessmentOutcome;
}

/// The result of running the full pipeline against one credential.
pub struct PipelineResult {
    /// `true` iff every assessor approved the credential.
    pub approved: bool,
    /// The final, possibly-narrowed proposed set.
    pub selected: HashSet<CredentialPath>,
    /// Whether the final selected set satisfies the verifier's requirement.
    pub satisfies: bool,
    /// One record per assessor that ran before the credential was dropped
    /// (if it was).
    pub records: Vec<PolicyRecord>,
}

/// Runs `assessors` sequentially against one credential, threading the
/// proposed set and satisfaction flag per §4.9.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancellation` is cancelled before any
/// assessor runs, or [`Error::PolicyWidenedDisclosure`] if an assessor's
/// `approved_paths` is not a subset of the current proposed set.
pub async fn run_pipeline<C: Sync>(
    credential: &C,
    requirement_id: &str,
    required: &HashSet<CredentialPath>,
    lattice: &BoundedDisclosureLattice<CredentialPath>,
    initial_selected: HashSet<CredentialPath>,
    initial_conflicts: &HashSet<CredentialPath>,
    format: &str,
    assessors: &[Box<dyn PolicyAssessor<C>>],
    cancellation: &CancellationToken,
) -> Result<PipelineResult> {
    let mut current = initial_selected;
    let mut satisfies = required.is_subset(&current);
    let mut records = Vec::with_capacity(assessors.len());

    for assessor in assessors {
        cancellation.check()?;
        let context = AssessmentContext {
            credential,
            requirement_id,
            proposed_paths: &current,
            lattice,
            satisfies,
            conflicts: initial_conflicts,
            format,
        };
        let outcome = assessor.assess(context).await;

        if !outcome.approved {
            records.push(PolicyRecord {
                requirement_id: requirement_id.to_string(),
                assessor_name: outcome.assessor_name,
                approved: false,
                approved_paths: None,
                removed_paths: HashSet::new(),
                reason: outcome.reason,
            });
            return Ok(PipelineResult { approved: false, selected: current, satisfies: false, records });
        }

        let removed_paths = if let Some(approved_paths) = &outcome.approved_paths {
            if !approved_paths.is_subset(&current) {
                return Err(Error::PolicyWidenedDisclosure(outcome.assessor_name));
            }
            let removed: HashSet<CredentialPath> =
                current.difference(approved_paths).cloned().collect();
            current = lattice.bottom().union(approved_paths).cloned().collect();
            satisfies = required.is_subset(&current);
            removed
        } else {
            HashSet::new()
        };

        records.push(PolicyRecord {
            requirement_id: requirement_id.to_string(),
            assessor_name: outcome.assessor_name,
            approved: true,
            approved_paths: outcome.approved_paths,
            removed_paths,
            reason: outcome.reason,
        });
    }

    Ok(PipelineResult { approved: true, selected: current, satisfies, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NarrowToGivenName;

    #[async_trait]
    impl PolicyAssessor<()> for NarrowToGivenName {
        async fn assess(&self, context: AssessmentContext<'_, ()>) -> AssessmentOutcome {
            let mut approved = HashSet::new();
            for path in context.proposed_paths {
                if path.leaf() == Some("given_name") {
                    approved.insert(path.clone());
                }
            }
            AssessmentOutcome {
                approved: true,
                approved_paths: Some(approved),
                assessor_name: "narrow-to-given-name".to_string(),
                reason: None,
            }
        }
    }

    struct RejectEverything;

    #[async_trait]
    impl PolicyAssessor<()> for RejectEverything {
        async fn assess(&self, _context: AssessmentContext<'_, ()>) -> AssessmentOutcome {
            AssessmentOutcome {
                approved: false,
                approved_paths: None,
                assessor_name: "reject-everything".to_string(),
                reason: Some("denied".to_string()),
            }
        }
    }

    fn sample_lattice() -> BoundedDisclosureLattice<CredentialPath> {
        let given = CredentialPath::parse("/credentialSubject/given_name").unwrap();
        let family = CredentialPath::parse("/credentialSubject/family_name").unwrap();
        BoundedDisclosureLattice::new([given, family].into_iter().collect(), HashSet::new()).unwrap()
    }

    #[tokio::test]
    async fn narrowing_assessor_removes_paths_and_records_them() {
        let lattice = sample_lattice();
        let given = CredentialPath::parse("/credentialSubject/given_name").unwrap();
        let family = CredentialPath::parse("/credentialSubject/family_name").unwrap();
        let initial: HashSet<_> = [given.clone(), family.clone()].into_iter().collect();
        let required: HashSet<_> = [given.clone(), family].into_iter().collect();

        let assessors: Vec<Box<dyn PolicyAssessor<()>>> = vec![Box::new(NarrowToGivenName)];
        let cancellation = CancellationToken::new();
        let result = run_pipeline(
            &(),
            "req-1",
            &required,
            &lattice,
            initial,
            &HashSet::new(),
            "sd-jwt",
            &assessors,
            &cancellation,
        )
        .await
        .unwrap();

        assert!(result.approved);
        assert!(!result.satisfies);
        assert_eq!(result.selected, [given].into_iter().collect());
        assert_eq!(result.records[0].removed_paths.len(), 1);
    }

    #[tokio::test]
    async fn rejecting_assessor_drops_credential() {
        let lattice = sample_lattice();
        let initial: HashSet<CredentialPath> = HashSet::new();
        let assessors: Vec<Box<dyn PolicyAssessor<()>>> = vec![Box::new(RejectEverything)];
        let cancellation = CancellationToken::new();
        let result = run_pipeline(
            &(),
            "req-1",
            &HashSet::new(),
            &lattice,
            initial,
            &HashSet::new(),
            "sd-jwt",
            &assessors,
            &cancellation,
        )
        .await
        .unwrap();
        assert!(!result.approved);
    }

    #[tokio::test]
    async fn widening_attempt_is_a_contract_violation() {
        struct WidenEverything;
        #[async_trait]
        impl PolicyAssessor<()> for WidenEverything {
            async fn assess(&self, context: AssessmentContext<'_, ()>) -> AssessmentOutcome {
                let mut widened = context.proposed_paths.clone();
                widened.insert(CredentialPath::parse("/credentialSubject/extra").unwrap());
                AssessmentOutcome {
                    approved: true,
                    approved_paths: Some(widened),
                    assessor_name: "widen-everything".to_string(),
                    reason: None,
                }
            }
        }

        let lattice = sample_lattice();
        let assessors: Vec<Box<dyn PolicyAssessor<()>>> = vec![Box::new(WidenEverything)];
        let cancellation = CancellationToken::new();
        let result = run_pipeline(
            &(),
            "req-1",
            &HashSet::new(),
            &lattice,
            HashSet::new(),
            &HashSet::new(),
            "sd-jwt",
            &assessors,
            &cancellation,
        )
        .await;
        assert!(matches!(result, Err(Error::PolicyWidenedDisclosure(_))));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_before_any_assessor() {
        let lattice = sample_lattice();
        let assessors: Vec<Box<dyn PolicyAssessor<()>>> = vec![Box::new(RejectEverything)];
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let result = run_pipeline(
            &(),
            "req-1",
            &HashSet::new(),
            &lattice,
            HashSet::new(),
            &HashSet::new(),
            "sd-jwt",
            &assessors,
            &cancellation,
        )
        .await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
