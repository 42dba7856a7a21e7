//! Ticket persistence trait and types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::audit::AuditTrace;
use crate::ticket::{Ticket, TicketClassification};

/// Error type for ticket persistence operations.
///
/// Persistence is the one collaborator whose failures are terminal for a
/// ticket: the audit record is the compliance-critical output, so the
/// pipeline does not self-heal around it.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("ticket not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted ticket as read back from storage.
#[derive(Debug, Clone)]
pub struct StoredTicket {
    pub id: String,
    pub received_at: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub classification: TicketClassification,
    pub raw_text: String,
    /// Set by `record_resolution`, absent until finalization.
    pub reply: Option<String>,
    /// Sealed trace, absent until finalization.
    pub trace: Option<AuditTrace>,
}

/// Trait for ticket storage backends.
///
/// The coordinator calls `record_ticket` once at intake and
/// `record_resolution` exactly once at finalization, regardless of how
/// many stages were skipped or failed in between.
pub trait TicketStore: Send + Sync {
    /// Persist an incoming ticket with its classification. Returns the
    /// assigned ticket ID.
    fn record_ticket(
        &self,
        ticket: &Ticket,
        classification: &TicketClassification,
    ) -> Result<String, TicketError>;

    /// Persist the final reply and sealed trace for a ticket.
    fn record_resolution(
        &self,
        ticket_id: &str,
        reply: &str,
        trace: &AuditTrace,
    ) -> Result<(), TicketError>;

    /// Read a ticket back by ID.
    fn get(&self, id: &str) -> Result<Option<StoredTicket>, TicketError>;

    /// Count persisted tickets.
    fn count(&self) -> Result<i64, TicketError>;
}
