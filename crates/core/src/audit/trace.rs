//! Per-ticket execution trace.
//!
//! A `TraceBuilder` is created at ticket intake, collects one record per
//! stage as execution proceeds, and is sealed exactly once at
//! finalization. Sealing consumes the builder, so an `AuditTrace` can
//! never be mutated after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::routing::SkipReason;

/// The four stages a ticket can pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Classification,
    CustomerLookup,
    TechnicalResolution,
    ReplyGeneration,
}

impl StageKind {
    /// Total number of stages available to a ticket. Denominator of the
    /// routing-efficiency metric.
    pub const COUNT: usize = 4;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::CustomerLookup => "customer_lookup",
            Self::TechnicalResolution => "technical_resolution",
            Self::ReplyGeneration => "reply_generation",
        }
    }
}

/// What happened to a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Attempted and returned usable data.
    Succeeded,
    /// Attempted but errored, timed out, or returned nothing usable. An
    /// absence marker was substituted and the pipeline continued.
    Failed { error: String },
    /// Never attempted, with the reason recorded by the planner.
    Skipped { reason: SkipReason },
}

/// One entry in the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: StageKind,
    #[serde(flatten)]
    pub outcome: StageOutcome,
    /// Wall time spent in the stage; zero for skipped stages.
    pub duration_ms: u64,
}

/// The sealed, immutable trace of one ticket's journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrace {
    pub records: Vec<StageRecord>,
    /// The reply text handed to the customer.
    pub reply: String,
    pub started_at: DateTime<Utc>,
    pub sealed_at: DateTime<Utc>,
    /// Stages that succeeded divided by stages available. Always in [0, 1].
    pub routing_efficiency: f32,
}

impl AuditTrace {
    /// Records for stages that were actually attempted (succeeded or failed).
    pub fn attempted(&self) -> impl Iterator<Item = &StageRecord> {
        self.records
            .iter()
            .filter(|r| !matches!(r.outcome, StageOutcome::Skipped { .. }))
    }

    /// Records for stages that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &StageRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, StageOutcome::Skipped { .. }))
    }

    /// Number of stages that succeeded.
    pub fn executed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, StageOutcome::Succeeded))
            .count()
    }
}

/// Incrementally collects stage outcomes during execution.
#[derive(Debug)]
pub struct TraceBuilder {
    started_at: DateTime<Utc>,
    records: Vec<StageRecord>,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            records: Vec::new(),
        }
    }

    /// Record a stage that ran and returned usable data.
    pub fn succeeded(&mut self, stage: StageKind, duration_ms: u64) {
        self.records.push(StageRecord {
            stage,
            outcome: StageOutcome::Succeeded,
            duration_ms,
        });
    }

    /// Record a stage that was attempted but failed or came back empty.
    pub fn failed(&mut self, stage: StageKind, error: impl Into<String>, duration_ms: u64) {
        self.records.push(StageRecord {
            stage,
            outcome: StageOutcome::Failed {
                error: error.into(),
            },
            duration_ms,
        });
    }

    /// Record a stage the planner skipped.
    pub fn skipped(&mut self, stage: StageKind, reason: SkipReason) {
        self.records.push(StageRecord {
            stage,
            outcome: StageOutcome::Skipped { reason },
            duration_ms: 0,
        });
    }

    /// Seal the trace with the final reply. Consumes the builder.
    pub fn seal(self, reply: impl Into<String>) -> AuditTrace {
        let executed = self
            .records
            .iter()
            .filter(|r| matches!(r.outcome, StageOutcome::Succeeded))
            .count();
        let routing_efficiency = executed as f32 / StageKind::COUNT as f32;

        AuditTrace {
            records: self.records,
            reply: reply.into(),
            started_at: self.started_at,
            sealed_at: Utc::now(),
            routing_efficiency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_zero_when_nothing_ran() {
        let mut builder = TraceBuilder::new();
        builder.skipped(StageKind::CustomerLookup, SkipReason::NotRequired);
        builder.skipped(StageKind::TechnicalResolution, SkipReason::NotRequired);
        let trace = builder.seal("reply");
        assert_eq!(trace.routing_efficiency, 0.0);
    }

    #[test]
    fn test_efficiency_counts_succeeded_stages() {
        let mut builder = TraceBuilder::new();
        builder.succeeded(StageKind::Classification, 120);
        builder.skipped(StageKind::CustomerLookup, SkipReason::NotRequired);
        builder.skipped(StageKind::TechnicalResolution, SkipReason::NotRequired);
        builder.succeeded(StageKind::ReplyGeneration, 800);
        let trace = builder.seal("reply");

        assert_eq!(trace.executed_count(), 2);
        assert_eq!(trace.routing_efficiency, 0.5);
    }

    #[test]
    fn test_efficiency_full_pipeline() {
        let mut builder = TraceBuilder::new();
        builder.succeeded(StageKind::Classification, 1);
        builder.succeeded(StageKind::CustomerLookup, 1);
        builder.succeeded(StageKind::TechnicalResolution, 1);
        builder.succeeded(StageKind::ReplyGeneration, 1);
        let trace = builder.seal("reply");
        assert_eq!(trace.routing_efficiency, 1.0);
    }

    #[test]
    fn test_efficiency_always_in_unit_interval() {
        let mut builder = TraceBuilder::new();
        builder.failed(StageKind::Classification, "timeout", 30_000);
        builder.failed(StageKind::CustomerLookup, "connection refused", 5);
        let trace = builder.seal("reply");
        assert!((0.0..=1.0).contains(&trace.routing_efficiency));
        assert_eq!(trace.routing_efficiency, 0.0);
    }

    #[test]
    fn test_attempted_and_skipped_partitions() {
        let mut builder = TraceBuilder::new();
        builder.succeeded(StageKind::Classification, 1);
        builder.failed(StageKind::CustomerLookup, "not found", 2);
        builder.skipped(StageKind::TechnicalResolution, SkipReason::NotRequired);
        let trace = builder.seal("reply");

        assert_eq!(trace.attempted().count(), 2);
        assert_eq!(trace.skipped().count(), 1);
    }

    #[test]
    fn test_trace_serialization_round_trip() {
        let mut builder = TraceBuilder::new();
        builder.succeeded(StageKind::Classification, 10);
        builder.skipped(StageKind::CustomerLookup, SkipReason::MissingIdentifier);
        let trace = builder.seal("Thanks for reaching out");

        let json = serde_json::to_string(&trace).unwrap();
        let parsed: AuditTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, trace);
    }

    #[test]
    fn test_seal_timestamps_ordered() {
        let trace = TraceBuilder::new().seal("r");
        assert!(trace.sealed_at >= trace.started_at);
    }
}
