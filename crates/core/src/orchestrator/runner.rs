//! Ticket orchestrator implementation.
//!
//! Stage order is fixed: classification, customer lookup, technical
//! resolution, reply generation. Earlier stage outputs feed later
//! stages; later stages never run before earlier ones. Reply generation
//! always runs.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::audit::{AuditEvent, AuditHandle, StageKind, TraceBuilder};
use crate::directory::CustomerDirectory;
use crate::metrics;
use crate::providers::{Classifier, ReplyComposer, ReplyContext, TechnicalSolver};
use crate::routing::{self, LookupDecision, ResolutionDecision, SkipReason};
use crate::ticket::{
    CustomerId, CustomerRecord, TechnicalResolution, Ticket, TicketClassification, TicketStore,
};

use super::types::{OrchestratorError, ProcessedTicket};

/// Substituted when the composer itself fails. The customer always gets
/// an answer, even a generic one.
const FALLBACK_REPLY: &str = "Thank you for contacting our support team. \
    We have received your request and a member of our team will get back \
    to you as soon as possible.";

/// The ticket orchestrator - drives one ticket through the pipeline.
pub struct TicketOrchestrator {
    classifier: Arc<dyn Classifier>,
    directory: Arc<dyn CustomerDirectory>,
    solver: Arc<dyn TechnicalSolver>,
    composer: Arc<dyn ReplyComposer>,
    ticket_store: Arc<dyn TicketStore>,
    audit: Option<AuditHandle>,
}

impl TicketOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        directory: Arc<dyn CustomerDirectory>,
        solver: Arc<dyn TechnicalSolver>,
        composer: Arc<dyn ReplyComposer>,
        ticket_store: Arc<dyn TicketStore>,
    ) -> Self {
        Self {
            classifier,
            directory,
            solver,
            composer,
            ticket_store,
            audit: None,
        }
    }

    /// Attach an audit handle. Events are best-effort; ticket processing
    /// never blocks on the audit channel being full.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    async fn emit(&self, event: AuditEvent) {
        if let Some(audit) = &self.audit {
            audit.emit(event).await;
        }
    }

    /// Process one ticket end to end.
    ///
    /// Returns `Err` only when the ticket store rejects a write; every
    /// other failure degrades the ticket and processing continues.
    pub async fn process(
        &self,
        raw_text: &str,
        customer_id: Option<CustomerId>,
    ) -> Result<ProcessedTicket, OrchestratorError> {
        let total_timer = Instant::now();
        let ticket = Ticket::new(raw_text, customer_id);
        let mut trace = TraceBuilder::new();

        // Stage 1: classification. A failure here substitutes the safe
        // default so the ticket still gets a reply.
        let stage_timer = Instant::now();
        let (classification, classify_error) = match self.classifier.classify(&ticket.raw_text).await
        {
            Ok(classification) => (classification, None),
            Err(e) => {
                warn!(error = %e, "classification failed, using fallback");
                metrics::CLASSIFICATION_FALLBACKS
                    .with_label_values(&["provider_error"])
                    .inc();
                (TicketClassification::fallback(), Some(e.to_string()))
            }
        };
        let classify_ms = stage_timer.elapsed().as_millis() as u64;
        metrics::STAGE_DURATION
            .with_label_values(&[StageKind::Classification.as_str()])
            .observe(stage_timer.elapsed().as_secs_f64());
        match &classify_error {
            None => trace.succeeded(StageKind::Classification, classify_ms),
            Some(error) => {
                metrics::STAGE_FAILURES
                    .with_label_values(&[StageKind::Classification.as_str()])
                    .inc();
                trace.failed(StageKind::Classification, error, classify_ms);
            }
        }

        // Intake persistence. The classification travels with the ticket
        // row, so this happens right after classification. A failure
        // here is terminal: an unrecorded ticket must not be answered.
        let ticket_id = self.ticket_store.record_ticket(&ticket, &classification)?;

        info!(
            ticket_id,
            customer_id = ?ticket.customer_id.as_ref().map(|c| c.as_str()),
            category = classification.category.as_str(),
            urgency = classification.urgency.as_str(),
            "ticket received"
        );

        self.emit(AuditEvent::TicketReceived {
            ticket_id: ticket_id.clone(),
            customer_id: ticket.customer_id.as_ref().map(|c| c.as_str().to_string()),
            preview: preview(&ticket.raw_text),
        })
        .await;

        match classify_error {
            None => {
                self.emit(AuditEvent::ClassificationCompleted {
                    ticket_id: ticket_id.clone(),
                    category: classification.category.as_str().to_string(),
                    urgency: classification.urgency.as_str().to_string(),
                    sentiment: classification.sentiment.as_str().to_string(),
                    needs_customer_data: classification.needs_customer_data,
                    needs_technical_help: classification.needs_technical_help,
                })
                .await;
            }
            Some(error) => {
                self.emit(AuditEvent::ClassificationFellBack {
                    ticket_id: ticket_id.clone(),
                    error,
                })
                .await;
            }
        }

        // Derive the plan. Pure; same classification and identifier
        // always yield the same plan.
        let plan = routing::plan(&classification, ticket.customer_id.as_ref());
        debug!(
            ticket_id,
            lookup = plan.lookup.describe(),
            resolution = plan.resolution.describe(),
            "routing plan computed"
        );
        self.emit(AuditEvent::PlanComputed {
            ticket_id: ticket_id.clone(),
            lookup: plan.lookup.describe(),
            resolution: plan.resolution.describe(),
        })
        .await;

        // Stage 2: customer lookup.
        let customer = self
            .run_lookup(&ticket_id, &plan.lookup, &mut trace)
            .await;

        // Stage 3: technical resolution. Gets whatever the lookup stage
        // produced, possibly nothing.
        let resolution = self
            .run_resolution(
                &ticket_id,
                &plan.resolution,
                &classification,
                &ticket.raw_text,
                customer.as_ref(),
                &mut trace,
            )
            .await;

        // Stage 4: reply generation. Always runs.
        let request_identifier = matches!(
            plan.lookup,
            LookupDecision::Skip {
                reason: SkipReason::MissingIdentifier
            }
        );
        let (reply, degraded_reply) = self
            .run_compose(
                &ticket_id,
                ReplyContext {
                    classification: &classification,
                    raw_text: &ticket.raw_text,
                    customer: customer.as_ref(),
                    resolution: resolution.as_ref(),
                    request_identifier,
                },
                &mut trace,
            )
            .await;

        self.emit(AuditEvent::ReplyComposed {
            ticket_id: ticket_id.clone(),
            reply_chars: reply.chars().count() as u32,
            degraded: degraded_reply,
        })
        .await;

        // Seal and persist. Failure to record the resolution is
        // terminal for the same reason intake is.
        let sealed = trace.seal(reply.clone());
        metrics::ROUTING_EFFICIENCY.observe(sealed.routing_efficiency as f64);

        if let Err(e) = self
            .ticket_store
            .record_resolution(&ticket_id, &reply, &sealed)
        {
            error!(ticket_id, error = %e, "failed to record resolution");
            metrics::TICKETS_PROCESSED
                .with_label_values(&["failed"])
                .inc();
            return Err(e.into());
        }

        let processed = ProcessedTicket {
            ticket_id: ticket_id.clone(),
            classification,
            customer,
            resolution,
            reply,
            trace: sealed,
        };

        let outcome = if processed.is_degraded() {
            "degraded"
        } else {
            "completed"
        };
        metrics::TICKETS_PROCESSED.with_label_values(&[outcome]).inc();

        let duration_ms = total_timer.elapsed().as_millis() as u64;
        info!(
            ticket_id,
            outcome,
            routing_efficiency = processed.trace.routing_efficiency,
            stages_executed = processed.trace.executed_count(),
            duration_ms,
            "ticket finalized"
        );
        self.emit(AuditEvent::TicketFinalized {
            ticket_id,
            routing_efficiency: processed.trace.routing_efficiency,
            stages_executed: processed.trace.executed_count() as u32,
            duration_ms,
        })
        .await;

        Ok(processed)
    }

    async fn run_lookup(
        &self,
        ticket_id: &str,
        decision: &LookupDecision,
        trace: &mut TraceBuilder,
    ) -> Option<CustomerRecord> {
        let stage = StageKind::CustomerLookup;
        let request = match decision {
            LookupDecision::Execute(request) => request,
            LookupDecision::Skip { reason } => {
                self.record_skip(ticket_id, stage, *reason, trace).await;
                return None;
            }
        };

        self.emit(AuditEvent::StageStarted {
            ticket_id: ticket_id.to_string(),
            stage,
        })
        .await;

        let timer = Instant::now();
        let result = self
            .directory
            .lookup(&request.customer_id, request.variant)
            .await;
        let duration_ms = timer.elapsed().as_millis() as u64;
        metrics::STAGE_DURATION
            .with_label_values(&[stage.as_str()])
            .observe(timer.elapsed().as_secs_f64());

        match result {
            Ok(record) => {
                debug!(ticket_id, customer_id = request.customer_id.as_str(), "customer lookup succeeded");
                trace.succeeded(stage, duration_ms);
                self.emit(AuditEvent::StageCompleted {
                    ticket_id: ticket_id.to_string(),
                    stage,
                    duration_ms,
                })
                .await;
                Some(record)
            }
            Err(e) => {
                warn!(ticket_id, error = %e, "customer lookup failed, continuing without data");
                metrics::STAGE_FAILURES
                    .with_label_values(&[stage.as_str()])
                    .inc();
                trace.failed(stage, e.to_string(), duration_ms);
                self.emit(AuditEvent::StageFailed {
                    ticket_id: ticket_id.to_string(),
                    stage,
                    error: e.to_string(),
                    duration_ms,
                })
                .await;
                None
            }
        }
    }

    async fn run_resolution(
        &self,
        ticket_id: &str,
        decision: &ResolutionDecision,
        classification: &TicketClassification,
        raw_text: &str,
        customer: Option<&CustomerRecord>,
        trace: &mut TraceBuilder,
    ) -> Option<TechnicalResolution> {
        let stage = StageKind::TechnicalResolution;
        let request = match decision {
            ResolutionDecision::Execute(request) => request,
            ResolutionDecision::Skip { reason } => {
                self.record_skip(ticket_id, stage, *reason, trace).await;
                return None;
            }
        };

        if request.priority {
            info!(ticket_id, "critical urgency, fast-tracking technical resolution");
        }

        self.emit(AuditEvent::StageStarted {
            ticket_id: ticket_id.to_string(),
            stage,
        })
        .await;

        let timer = Instant::now();
        let result = self
            .solver
            .resolve(classification, raw_text, customer, request.priority)
            .await;
        let duration_ms = timer.elapsed().as_millis() as u64;
        metrics::STAGE_DURATION
            .with_label_values(&[stage.as_str()])
            .observe(timer.elapsed().as_secs_f64());

        match result {
            Ok(Some(resolution)) => {
                debug!(ticket_id, steps = resolution.steps.len(), "technical resolution produced");
                trace.succeeded(stage, duration_ms);
                self.emit(AuditEvent::StageCompleted {
                    ticket_id: ticket_id.to_string(),
                    stage,
                    duration_ms,
                })
                .await;
                Some(resolution)
            }
            Ok(None) => {
                warn!(ticket_id, "solver produced nothing usable");
                self.record_stage_failure(
                    ticket_id,
                    stage,
                    "empty resolution".to_string(),
                    duration_ms,
                    trace,
                )
                .await;
                None
            }
            Err(e) => {
                warn!(ticket_id, error = %e, "technical resolution failed, continuing without it");
                self.record_stage_failure(ticket_id, stage, e.to_string(), duration_ms, trace)
                    .await;
                None
            }
        }
    }

    async fn run_compose(
        &self,
        ticket_id: &str,
        context: ReplyContext<'_>,
        trace: &mut TraceBuilder,
    ) -> (String, bool) {
        let stage = StageKind::ReplyGeneration;

        self.emit(AuditEvent::StageStarted {
            ticket_id: ticket_id.to_string(),
            stage,
        })
        .await;

        let timer = Instant::now();
        let result = self.composer.compose(context).await;
        let duration_ms = timer.elapsed().as_millis() as u64;
        metrics::STAGE_DURATION
            .with_label_values(&[stage.as_str()])
            .observe(timer.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                trace.succeeded(stage, duration_ms);
                self.emit(AuditEvent::StageCompleted {
                    ticket_id: ticket_id.to_string(),
                    stage,
                    duration_ms,
                })
                .await;
                (reply, false)
            }
            Err(e) => {
                warn!(ticket_id, error = %e, "reply composition failed, using canned reply");
                self.record_stage_failure(ticket_id, stage, e.to_string(), duration_ms, trace)
                    .await;
                (FALLBACK_REPLY.to_string(), true)
            }
        }
    }

    async fn record_skip(
        &self,
        ticket_id: &str,
        stage: StageKind,
        reason: SkipReason,
        trace: &mut TraceBuilder,
    ) {
        debug!(ticket_id, stage = stage.as_str(), reason = %reason, "stage skipped");
        metrics::STAGES_SKIPPED
            .with_label_values(&[stage.as_str(), reason.as_str()])
            .inc();
        trace.skipped(stage, reason);
        self.emit(AuditEvent::StageSkipped {
            ticket_id: ticket_id.to_string(),
            stage,
            reason: reason.to_string(),
        })
        .await;
    }

    async fn record_stage_failure(
        &self,
        ticket_id: &str,
        stage: StageKind,
        error: String,
        duration_ms: u64,
        trace: &mut TraceBuilder,
    ) {
        metrics::STAGE_FAILURES
            .with_label_values(&[stage.as_str()])
            .inc();
        trace.failed(stage, error.clone(), duration_ms);
        self.emit(AuditEvent::StageFailed {
            ticket_id: ticket_id.to_string(),
            stage,
            error,
            duration_ms,
        })
        .await;
    }
}

/// First line of the ticket, truncated, for logs and audit events.
fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    first_line.chars().take(100).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::StageOutcome;
    use crate::testing::{MockClassifier, MockComposer, MockDirectory, MockSolver};
    use crate::ticket::{Category, SqliteTicketStore, Urgency};

    fn classification(
        needs_customer_data: bool,
        needs_technical_help: bool,
    ) -> TicketClassification {
        TicketClassification {
            category: Category::Technical,
            urgency: Urgency::Medium,
            needs_customer_data,
            needs_technical_help,
            ..TicketClassification::fallback()
        }
    }

    fn orchestrator(
        classifier: MockClassifier,
        directory: MockDirectory,
        solver: MockSolver,
        composer: MockComposer,
    ) -> TicketOrchestrator {
        TicketOrchestrator::new(
            Arc::new(classifier),
            Arc::new(directory),
            Arc::new(solver),
            Arc::new(composer),
            Arc::new(SqliteTicketStore::in_memory().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_minimal_ticket_skips_both_optional_stages() {
        let orchestrator = orchestrator(
            MockClassifier::returning(classification(false, false)),
            MockDirectory::empty(),
            MockSolver::unused(),
            MockComposer::returning("Dear customer, hello."),
        );

        let processed = orchestrator.process("What are your hours?", None).await.unwrap();

        assert_eq!(processed.reply, "Dear customer, hello.");
        assert!(processed.customer.is_none());
        assert!(processed.resolution.is_none());
        assert!(!processed.is_degraded());
        assert_eq!(processed.trace.executed_count(), 2);
        assert_eq!(processed.trace.routing_efficiency, 0.5);
    }

    #[tokio::test]
    async fn test_missing_identifier_requests_one_in_reply() {
        let composer = MockComposer::returning("Please send your ID.");
        let orchestrator = orchestrator(
            MockClassifier::returning(classification(true, false)),
            MockDirectory::empty(),
            MockSolver::unused(),
            composer.clone(),
        );

        let processed = orchestrator.process("My bill is wrong", None).await.unwrap();

        let contexts = composer.seen_contexts().await;
        assert!(contexts[0].request_identifier);

        let lookup = processed
            .trace
            .records
            .iter()
            .find(|r| r.stage == StageKind::CustomerLookup)
            .unwrap();
        assert_eq!(
            lookup.outcome,
            StageOutcome::Skipped {
                reason: SkipReason::MissingIdentifier
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_but_finishes() {
        let orchestrator = orchestrator(
            MockClassifier::returning(classification(true, false)),
            MockDirectory::failing("connection refused"),
            MockSolver::unused(),
            MockComposer::returning("reply"),
        );

        let processed = orchestrator
            .process("Billing issue, Customer ID: CUST001", None)
            .await
            .unwrap();

        assert!(processed.customer.is_none());
        assert!(processed.is_degraded());
        assert_eq!(processed.reply, "reply");
    }

    #[tokio::test]
    async fn test_classifier_failure_falls_back_and_still_replies() {
        let orchestrator = orchestrator(
            MockClassifier::failing("model unavailable"),
            MockDirectory::empty(),
            MockSolver::unused(),
            MockComposer::returning("generic answer"),
        );

        let processed = orchestrator.process("gibberish", None).await.unwrap();

        assert_eq!(processed.classification, TicketClassification::fallback());
        assert!(processed.is_degraded());
        assert_eq!(processed.reply, "generic answer");
        // Fallback activates no optional stages.
        assert!(processed.customer.is_none());
        assert!(processed.resolution.is_none());
    }

    #[tokio::test]
    async fn test_composer_failure_yields_canned_reply() {
        let orchestrator = orchestrator(
            MockClassifier::returning(classification(false, false)),
            MockDirectory::empty(),
            MockSolver::unused(),
            MockComposer::failing("timeout"),
        );

        let processed = orchestrator.process("hello", None).await.unwrap();

        assert_eq!(processed.reply, FALLBACK_REPLY);
        assert!(processed.is_degraded());
        // The canned reply is still persisted.
        assert_eq!(processed.trace.reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_solver_receives_looked_up_customer() {
        let solver = MockSolver::returning(TechnicalResolution {
            summary: "router misconfigured".to_string(),
            steps: vec!["reboot".to_string()],
        });
        let orchestrator = orchestrator(
            MockClassifier::returning(classification(true, true)),
            MockDirectory::with_customer(CustomerRecord {
                customer_id: "CUST001".to_string(),
                name: Some("Anna Keller".to_string()),
                ..Default::default()
            }),
            solver.clone(),
            MockComposer::returning("reply"),
        );

        let processed = orchestrator
            .process("VPN down. Customer ID: CUST001", None)
            .await
            .unwrap();

        assert!(processed.customer.is_some());
        assert!(processed.resolution.is_some());
        assert_eq!(processed.trace.routing_efficiency, 1.0);

        let calls = solver.seen_calls().await;
        assert_eq!(calls[0].customer_name.as_deref(), Some("Anna Keller"));
    }

    #[tokio::test]
    async fn test_empty_resolution_recorded_as_failure() {
        let orchestrator = orchestrator(
            MockClassifier::returning(classification(false, true)),
            MockDirectory::empty(),
            MockSolver::returning_empty(),
            MockComposer::returning("reply"),
        );

        let processed = orchestrator.process("printer on fire", None).await.unwrap();

        assert!(processed.resolution.is_none());
        let stage = processed
            .trace
            .records
            .iter()
            .find(|r| r.stage == StageKind::TechnicalResolution)
            .unwrap();
        assert!(matches!(stage.outcome, StageOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_identifier_extracted_from_text() {
        let directory = MockDirectory::with_customer(CustomerRecord {
            customer_id: "CUST042".to_string(),
            ..Default::default()
        });
        let orchestrator = orchestrator(
            MockClassifier::returning(classification(true, false)),
            directory.clone(),
            MockSolver::unused(),
            MockComposer::returning("reply"),
        );

        orchestrator
            .process("Hi, my account CUST042 is locked", None)
            .await
            .unwrap();

        let lookups = directory.seen_lookups().await;
        assert_eq!(lookups.len(), 1);
        assert_eq!(lookups[0].0.as_str(), "CUST042");
    }

    #[test]
    fn test_preview_truncates() {
        let text = "a".repeat(300);
        assert_eq!(preview(&text).len(), 100);
        assert_eq!(preview("one line\nsecond"), "one line");
    }
}
