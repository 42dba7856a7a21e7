//! Audit event types.

use serde::{Deserialize, Serialize};

use super::StageKind;

/// Audit event types emitted during ticket processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Ticket lifecycle
    TicketReceived {
        ticket_id: String,
        customer_id: Option<String>,
        /// First line of the ticket, for log readability.
        preview: String,
    },
    ClassificationCompleted {
        ticket_id: String,
        category: String,
        urgency: String,
        sentiment: String,
        needs_customer_data: bool,
        needs_technical_help: bool,
    },
    /// The classification call failed and the safe default was substituted.
    ClassificationFellBack {
        ticket_id: String,
        error: String,
    },
    PlanComputed {
        ticket_id: String,
        lookup: String,
        resolution: String,
    },

    // Stage execution
    StageStarted {
        ticket_id: String,
        stage: StageKind,
    },
    StageCompleted {
        ticket_id: String,
        stage: StageKind,
        duration_ms: u64,
    },
    StageFailed {
        ticket_id: String,
        stage: StageKind,
        error: String,
        duration_ms: u64,
    },
    StageSkipped {
        ticket_id: String,
        stage: StageKind,
        reason: String,
    },

    // Finalization
    ReplyComposed {
        ticket_id: String,
        reply_chars: u32,
        /// True when the composer failed and the canned reply was used.
        degraded: bool,
    },
    TicketFinalized {
        ticket_id: String,
        routing_efficiency: f32,
        stages_executed: u32,
        duration_ms: u64,
    },
}

impl AuditEvent {
    /// Short type name stored in the `event_type` column.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::TicketReceived { .. } => "ticket_received",
            Self::ClassificationCompleted { .. } => "classification_completed",
            Self::ClassificationFellBack { .. } => "classification_fell_back",
            Self::PlanComputed { .. } => "plan_computed",
            Self::StageStarted { .. } => "stage_started",
            Self::StageCompleted { .. } => "stage_completed",
            Self::StageFailed { .. } => "stage_failed",
            Self::StageSkipped { .. } => "stage_skipped",
            Self::ReplyComposed { .. } => "reply_composed",
            Self::TicketFinalized { .. } => "ticket_finalized",
        }
    }

    /// The ticket this event relates to, if any.
    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => None,
            Self::TicketReceived { ticket_id, .. }
            | Self::ClassificationCompleted { ticket_id, .. }
            | Self::ClassificationFellBack { ticket_id, .. }
            | Self::PlanComputed { ticket_id, .. }
            | Self::StageStarted { ticket_id, .. }
            | Self::StageCompleted { ticket_id, .. }
            | Self::StageFailed { ticket_id, .. }
            | Self::StageSkipped { ticket_id, .. }
            | Self::ReplyComposed { ticket_id, .. }
            | Self::TicketFinalized { ticket_id, .. } => Some(ticket_id),
        }
    }
}
