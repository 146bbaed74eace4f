//! # DisclosureComputation Orchestrator (C9)
//!
//! The single entry point that turns a verifier's query matches into a
//! [`DisclosurePlan`]: for each match, builds a lattice, computes the
//! optimal disclosure, runs it through the policy pipeline (C10), and
//! records everything in a [`DecisionRecord`]. Serial across matches and
//! serial across assessors within a match — no internal parallelism; the
//! only suspension points are policy-assessor invocations.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::instrument;

use crate::algorithms::{compute_maximum_disclosure, compute_minimum_disclosure, compute_optimal_disclosure};
use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::lattice::BoundedDisclosureLattice;
use crate::path::CredentialPath;
use crate::policy::{PolicyAssessor, run_pipeline};
use crate::trace::{DecisionRecord, EvaluationRecord, LatticeRecord, TraceContextReader};

/// One verifier query matched against one candidate credential.
pub struct DisclosureMatch<'a, C> {
    /// The candidate credential.
    pub credential: &'a C,
    /// The requirement id this match is for.
    pub requirement_id: String,
    /// Paths the verifier required: `required ⊆ matched ⊆ all_available`.
    pub required: HashSet<CredentialPath>,
    /// Paths the credential actually matched in the query evaluator.
    pub matched: HashSet<CredentialPath>,
    /// Every path the credential could disclose.
    pub all_available: HashSet<CredentialPath>,
    /// Paths that must always be disclosed: `mandatory ⊆ all_available`.
    pub mandatory: HashSet<CredentialPath>,
    /// The credential's format tag.
    pub format: String,
}

/// The per-credential output of one computation.
pub struct CredentialDisclosureDecision<'a, C> {
    /// The credential this decision is for.
    pub credential: &'a C,
    /// The requirement id this decision is for.
    pub requirement_id: String,
    /// The final selected path set: `Bottom ⊆ selected ⊆ Top`.
    pub selected: HashSet<CredentialPath>,
    /// `true` iff `required ⊆ selected`.
    pub satisfies_requirements: bool,
    /// Paths required but unreachable after policy narrowing.
    pub conflicts: HashSet<CredentialPath>,
    /// Paths requested anywhere that the credential cannot provide at all.
    pub unavailable: HashSet<CredentialPath>,
    /// The credential's format tag.
    pub format: String,
    /// The lattice this decision was computed against.
    pub lattice: BoundedDisclosureLattice<CredentialPath>,
}

/// The full output of one [`compute`] call.
pub struct DisclosurePlan<'a, C> {
    /// `true` iff every requirement id was satisfied by some decision.
    pub satisfied: bool,
    /// One decision per match, in input order.
    pub decisions: Vec<CredentialDisclosureDecision<'a, C>>,
    /// Requirement ids no decision satisfied, if any.
    pub unsatisfied_requirement_ids: Vec<String>,
    /// The full decision trace.
    pub decision_record: DecisionRecord,
}

/// Computes a [`DisclosurePlan`] for `matches`.
///
/// Identity is by requirement id; duplicate ids across matches are
/// permitted, but only the first satisfied decision counts toward the
/// satisfied set.
///
/// # Errors
///
/// Returns [`crate::error::Error::Cancelled`] if `cancellation` is
/// cancelled between matches or between assessors, or propagates a policy
/// assessor contract violation.
#[instrument(level = "debug", skip(matches, user_exclusions, assessors, cancellation, trace_reader))]
pub async fn compute<'a, C: Sync>(
    matches: &'a [DisclosureMatch<'a, C>],
    user_exclusions: Option<&HashMap<String, HashSet<CredentialPath>>>,
    assessors: &[Box<dyn PolicyAssessor<C>>],
    cancellation: &CancellationToken,
    trace_reader: &dyn TraceContextReader,
) -> Result<DisclosurePlan<'a, C>> {
    let started_at = Utc::now();
    let mut decision_record = DecisionRecord::start(started_at, matches.len());
    let mut decisions = Vec::new();
    let mut satisfied_ids: HashSet<String> = HashSet::new();

    for candidate_match in matches {
        cancellation.check()?;

        let lattice = BoundedDisclosureLattice::new(
            candidate_match.all_available.clone(),
            candidate_match.mandatory.clone(),
        )?;

        let exclusions = user_exclusions
            .and_then(|by_id| by_id.get(&candidate_match.requirement_id))
            .cloned()
            .unwrap_or_default();

        let minimum = compute_minimum_disclosure(
            &lattice,
            &candidate_match.required,
            &HashSet::new(),
            &HashSet::new(),
        );
        let maximum = compute_maximum_disclosure(&lattice, &exclusions);
        let optimal = compute_optimal_disclosure(&lattice, &minimum, &maximum);

        decision_record.lattices.push(LatticeRecord {
            requirement_id: candidate_match.requirement_id.clone(),
            top: lattice.top().clone(),
            bottom: lattice.bottom().clone(),
            minimum: minimum.selected.clone(),
            maximum: maximum.clone(),
            conflicts: optimal.conflicts.clone(),
            initial_selected: optimal.selected.clone(),
        });

        let pipeline = run_pipeline(
            candidate_match.credential,
            &candidate_match.requirement_id,
            &candidate_match.required,
            &lattice,
            optimal.selected.clone(),
            &optimal.conflicts,
            &candidate_match.format,
            assessors,
            cancellation,
        )
        .await?;

        decision_record.policy_records.extend(pipeline.records);
        decision_record.evaluations.push(EvaluationRecord {
            requirement_id: candidate_match.requirement_id.clone(),
            dropped: !pipeline.approved,
        });

        if !pipeline.approved {
            continue;
        }

        if pipeline.satisfies && !satisfied_ids.contains(&candidate_match.requirement_id) {
            satisfied_ids.insert(candidate_match.requirement_id.clone());
        }

        decisions.push(CredentialDisclosureDecision {
            credential: candidate_match.credential,
            requirement_id: candidate_match.requirement_id.clone(),
            selected: pipeline.selected,
            satisfies_requirements: pipeline.satisfies,
            conflicts: optimal.conflicts,
            unavailable: optimal.unavailable,
            format: candidate_match.format.clone(),
            lattice,
        });
    }

    let all_requirement_ids: HashSet<String> =
        matches.iter().map(|m| m.requirement_id.clone()).collect();
    let mut unsatisfied_requirement_ids: Vec<String> =
        all_requirement_ids.difference(&satisfied_ids).cloned().collect();
    unsatisfied_requirement_ids.sort();
    let satisfied = unsatisfied_requirement_ids.is_empty();

    let finished_at = Utc::now();
    decision_record.finish(finished_at, satisfied, trace_reader.current());

    tracing::debug!(satisfied, decisions = decisions.len(), "completed disclosure computation");

    Ok(DisclosurePlan { satisfied, decisions, unsatisfied_requirement_ids, decision_record })
}
