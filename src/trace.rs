//! # Decision Tracing
//!
//! DisclosureComputation (C9) emits an always-present [`DecisionRecord`]
//! describing exactly what happened: which credentials were evaluated,
//! what their lattices looked like, and which policy assessors ran and
//! with what result. Combined with `tracing` spans at the C7/C9/C11/C12
//! boundaries, this gives operators both a structured log stream and a
//! queryable decision artifact without the core depending on any
//! particular telemetry backend.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::path::CredentialPath;

/// A W3C Trace Context pair (`traceparent` / `tracestate`), carried
/// end-to-end if the caller supplies one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TraceContext {
    /// The `traceparent` header value.
    pub traceparent: String,
    /// The `tracestate` header value, if any.
    pub tracestate: Option<String>,
}

/// Supplies the ambient [`TraceContext`] for a computation call.
///
/// Injectable so the core has no hidden singleton: a caller without
/// distributed tracing can pass [`NoTraceContext`], while a caller that
/// maintains its own span stack adapts it through this trait.
pub trait TraceContextReader {
    /// Returns the current trace context, if any is active.
    fn current(&self) -> Option<TraceContext>;
}

/// A [`TraceContextReader`] that never supplies a context.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTraceContext;

impl TraceContextReader for NoTraceContext {
    fn current(&self) -> Option<TraceContext> {
        None
    }
}

/// One match's lattice construction and the C3 algorithm outputs computed
/// from it, before the policy pipeline runs.
#[derive(Clone, Debug)]
pub struct LatticeRecord {
    /// The requirement id this record is for.
    pub requirement_id: String,
    /// The lattice's `Top` set at construction.
    pub top: HashSet<CredentialPath>,
    /// The lattice's `Bottom` set at construction.
    pub bottom: HashSet<CredentialPath>,
    /// The minimum disclosure set computed from the match's requirements.
    pub minimum: HashSet<CredentialPath>,
    /// The maximum disclosure set computed from user exclusions.
    pub maximum: HashSet<CredentialPath>,
    /// Paths present in `minimum` but absent from `maximum`.
    pub conflicts: HashSet<CredentialPath>,
    /// The initial selected set before the policy pipeline runs.
    pub initial_selected: HashSet<CredentialPath>,
}

/// The outcome of a single assessor invocation within the policy pipeline.
#[derive(Clone, Debug)]
pub struct PolicyRecord {
    /// The requirement id this record is for.
    pub requirement_id: String,
    /// The assessor's self-reported name.
    pub assessor_name: String,
    /// Whether the assessor approved the credential at all.
    pub approved: bool,
    /// The proposed set the assessor narrowed to, if it narrowed.
    pub approved_paths: Option<HashSet<CredentialPath>>,
    /// Paths present before this assessor ran but absent after, if it narrowed.
    pub removed_paths: HashSet<CredentialPath>,
    /// The assessor's free-text justification, if supplied.
    pub reason: Option<String>,
}

/// One match having been evaluated, independent of its lattice/policy detail.
#[derive(Clone, Debug)]
pub struct EvaluationRecord {
    /// The requirement id this record is for.
    pub requirement_id: String,
    /// Whether the match was dropped entirely by a policy assessor.
    pub dropped: bool,
}

/// The full decision trace produced by one [`crate::computation`] call.
#[derive(Clone, Debug)]
pub struct DecisionRecord {
    /// When the computation call started.
    pub started_at: DateTime<Utc>,
    /// How long the computation call took.
    pub duration: Duration,
    /// Number of candidate matches considered.
    pub candidate_count: usize,
    /// Per-match evaluation records, in match order.
    pub evaluations: Vec<EvaluationRecord>,
    /// Per-match lattice records, in match order.
    pub lattices: Vec<LatticeRecord>,
    /// Policy assessor records, in per-credential execution order across all
    /// credentials.
    pub policy_records: Vec<PolicyRecord>,
    /// `true` iff every requirement was satisfied by some decision.
    pub satisfied: bool,
    /// The ambient trace context active when the computation ran, if any.
    pub trace_context: Option<TraceContext>,
}

impl DecisionRecord {
    /// Starts a new, empty record at `started_at`, to be filled in as the
    /// computation proceeds and closed with [`Self::finish`].
    #[must_use]
    pub fn start(started_at: DateTime<Utc>, candidate_count: usize) -> Self {
        Self {
            started_at,
            duration: Duration::default(),
            candidate_count,
            evaluations: Vec::new(),
            lattices: Vec::new(),
            policy_records: Vec::new(),
            satisfied: false,
            trace_context: None,
        }
    }

    /// Closes the record: sets `duration` from `finished_at`, `satisfied`,
    /// and the resolved trace context.
    pub fn finish(
        &mut self,
        finished_at: DateTime<Utc>,
        satisfied: bool,
        trace_context: Option<TraceContext>,
    ) {
        self.duration = (finished_at - self.started_at).to_std().unwrap_or_default();
        self.satisfied = satisfied;
        self.trace_context = trace_context;
    }
}
