//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket pipeline (outcomes, stage timings, skips)
//! - Routing (efficiency, planned stages)
//! - LLM usage (tokens per operation)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

use crate::providers::llm::TokenUsage;

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Tickets processed total by outcome.
pub static TICKETS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("helpdesk_tickets_processed_total", "Total tickets processed"),
        &["outcome"], // "completed", "degraded", "failed"
    )
    .unwrap()
});

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "helpdesk_stage_duration_seconds",
            "Duration of pipeline stages",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["stage"],
    )
    .unwrap()
});

/// Stages skipped total by stage and reason.
pub static STAGES_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("helpdesk_stages_skipped_total", "Total stages skipped"),
        &["stage", "reason"], // reason: "not_required", "missing_identifier"
    )
    .unwrap()
});

/// Stage failures total by stage.
pub static STAGE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("helpdesk_stage_failures_total", "Total stage failures"),
        &["stage"],
    )
    .unwrap()
});

/// Classification fallbacks total.
pub static CLASSIFICATION_FALLBACKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "helpdesk_classification_fallbacks_total",
            "Tickets that fell back to the default classification",
        ),
        &["cause"], // "provider_error", "invalid_response"
    )
    .unwrap()
});

// =============================================================================
// Routing Metrics
// =============================================================================

/// Routing efficiency per ticket (executed stages / total stages).
pub static ROUTING_EFFICIENCY: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "helpdesk_routing_efficiency",
            "Fraction of pipeline stages executed per ticket",
        )
        .buckets(vec![0.25, 0.5, 0.75, 1.0]),
    )
    .unwrap()
});

// =============================================================================
// LLM Metrics
// =============================================================================

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("helpdesk_llm_tokens_total", "Total LLM tokens used"),
        &["operation", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

/// Record token usage for one LLM call.
pub fn record_llm_tokens(operation: &str, usage: TokenUsage) {
    LLM_TOKENS
        .with_label_values(&[operation, "input"])
        .inc_by(usage.input_tokens as u64);
    LLM_TOKENS
        .with_label_values(&[operation, "output"])
        .inc_by(usage.output_tokens as u64);
}

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKETS_PROCESSED.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(STAGES_SKIPPED.clone()),
        Box::new(STAGE_FAILURES.clone()),
        Box::new(CLASSIFICATION_FALLBACKS.clone()),
        Box::new(ROUTING_EFFICIENCY.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
