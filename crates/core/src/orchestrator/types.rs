//! Orchestrator result and error types.

use thiserror::Error;

use crate::audit::AuditTrace;
use crate::ticket::{CustomerRecord, TechnicalResolution, TicketClassification, TicketError};

/// Errors that terminate ticket processing.
///
/// Provider and directory failures never appear here: they degrade the
/// ticket and processing continues. Only the persistence boundary is
/// allowed to kill a ticket.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("persistence failure: {0}")]
    Persistence(#[from] TicketError),
}

/// Everything produced for one processed ticket.
#[derive(Debug, Clone)]
pub struct ProcessedTicket {
    /// Store-assigned ticket identifier.
    pub ticket_id: String,
    /// The classification the pipeline ran under (possibly the fallback).
    pub classification: TicketClassification,
    /// Customer data, when the lookup stage ran and succeeded.
    pub customer: Option<CustomerRecord>,
    /// Technical resolution, when the stage ran and produced one.
    pub resolution: Option<TechnicalResolution>,
    /// The reply handed to the customer. Never empty.
    pub reply: String,
    /// The sealed execution trace.
    pub trace: AuditTrace,
}

impl ProcessedTicket {
    /// True when any stage failed and an absence marker or canned text
    /// was substituted.
    pub fn is_degraded(&self) -> bool {
        self.trace
            .records
            .iter()
            .any(|r| matches!(r.outcome, crate::audit::StageOutcome::Failed { .. }))
    }
}
