//! Traits for the external stage collaborators.
//!
//! The orchestrator only ever talks to these contracts; whether a stage
//! is backed by an LLM, a database, or a mock is invisible to it. Every
//! provider failure is recoverable by design: the coordinator records it
//! and continues with an absence marker.

use async_trait::async_trait;
use thiserror::Error;

use crate::ticket::{CustomerRecord, TechnicalResolution, TicketClassification};

/// Errors that can occur during a provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("provider not configured")]
    NotConfigured,
}

/// Classification provider.
///
/// Produces the per-ticket classification from raw text. A failure here
/// does not fail the pipeline: the coordinator substitutes the safe
/// default classification.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Name of this classifier for logging/audit.
    fn name(&self) -> &str;

    async fn classify(&self, raw_text: &str) -> Result<TicketClassification, ProviderError>;
}

/// Technical resolution provider.
#[async_trait]
pub trait TechnicalSolver: Send + Sync {
    /// Name of this solver for logging/audit.
    fn name(&self) -> &str;

    /// Work out remediation for a technical issue.
    ///
    /// `customer` is whatever the lookup stage produced, possibly
    /// nothing. `priority` is the critical-urgency marker and only
    /// affects how the request is framed. Returns `None` when the
    /// provider has nothing useful to say.
    async fn resolve(
        &self,
        classification: &TicketClassification,
        raw_text: &str,
        customer: Option<&CustomerRecord>,
        priority: bool,
    ) -> Result<Option<TechnicalResolution>, ProviderError>;
}

/// Everything the reply composer may draw on.
///
/// All optional fields really are optional: the composer must produce a
/// reply from any subset of them.
#[derive(Debug, Clone, Copy)]
pub struct ReplyContext<'a> {
    pub classification: &'a TicketClassification,
    pub raw_text: &'a str,
    pub customer: Option<&'a CustomerRecord>,
    pub resolution: Option<&'a TechnicalResolution>,
    /// True when the planner skipped the lookup for lack of an
    /// identifier; the reply should ask the customer for it.
    pub request_identifier: bool,
}

/// Reply generation provider.
#[async_trait]
pub trait ReplyComposer: Send + Sync {
    /// Name of this composer for logging/audit.
    fn name(&self) -> &str;

    async fn compose(&self, context: ReplyContext<'_>) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::Backend("connection refused".to_string());
        assert_eq!(err.to_string(), "backend error: connection refused");

        let err = ProviderError::NotConfigured;
        assert_eq!(err.to_string(), "provider not configured");
    }
}
