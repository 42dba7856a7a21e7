//! Audit pipeline integration tests.
//!
//! Runs a ticket through the orchestrator with the audit system
//! attached and checks the event stream that ends up in SQLite.

use std::sync::Arc;

use helpdesk_core::audit::{create_audit_system, AuditFilter, AuditStore, SqliteAuditStore};
use helpdesk_core::testing::{fixtures, MockClassifier, MockComposer, MockDirectory, MockSolver};
use helpdesk_core::ticket::{Category, SqliteTicketStore, TicketStore, Urgency};
use helpdesk_core::TicketOrchestrator;

#[tokio::test]
async fn test_ticket_lifecycle_emits_ordered_event_stream() {
    let audit_store: Arc<dyn AuditStore> = Arc::new(SqliteAuditStore::in_memory().unwrap());
    let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
    let writer_handle = tokio::spawn(audit_writer.run());

    let orchestrator = TicketOrchestrator::new(
        Arc::new(MockClassifier::returning(fixtures::classification(
            Category::Billing,
            Urgency::Medium,
            true,
            false,
        ))),
        Arc::new(MockDirectory::with_customer(fixtures::customer("CUST001"))),
        Arc::new(MockSolver::unused()),
        Arc::new(MockComposer::returning("Dear Anna, ...")),
        Arc::new(SqliteTicketStore::in_memory().unwrap()) as Arc<dyn TicketStore>,
    )
    .with_audit(audit_handle.clone());

    let processed = orchestrator
        .process("Double charge, Customer ID: CUST001", None)
        .await
        .unwrap();

    // Drop all handles so the writer drains and exits.
    drop(orchestrator);
    drop(audit_handle);
    writer_handle.await.unwrap();

    let records = audit_store
        .query(&AuditFilter::new().with_ticket_id(&processed.ticket_id))
        .unwrap();
    // Query returns newest first.
    let mut event_types: Vec<&str> = records.iter().map(|r| r.event_type.as_str()).collect();
    event_types.reverse();

    assert_eq!(
        event_types,
        vec![
            "ticket_received",
            "classification_completed",
            "plan_computed",
            "stage_started",   // customer_lookup
            "stage_completed", // customer_lookup
            "stage_skipped",   // technical_resolution
            "stage_started",   // reply_generation
            "stage_completed", // reply_generation
            "reply_composed",
            "ticket_finalized",
        ]
    );
}

#[tokio::test]
async fn test_classification_fallback_is_audited() {
    let audit_store: Arc<dyn AuditStore> = Arc::new(SqliteAuditStore::in_memory().unwrap());
    let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
    let writer_handle = tokio::spawn(audit_writer.run());

    let orchestrator = TicketOrchestrator::new(
        Arc::new(MockClassifier::failing("timeout")),
        Arc::new(MockDirectory::empty()),
        Arc::new(MockSolver::unused()),
        Arc::new(MockComposer::returning("generic")),
        Arc::new(SqliteTicketStore::in_memory().unwrap()) as Arc<dyn TicketStore>,
    )
    .with_audit(audit_handle.clone());

    orchestrator.process("???", None).await.unwrap();

    drop(orchestrator);
    drop(audit_handle);
    writer_handle.await.unwrap();

    let fallbacks = audit_store
        .query(&AuditFilter::new().with_event_type("classification_fell_back"))
        .unwrap();
    assert_eq!(fallbacks.len(), 1);

    // No classification_completed event for a fallback ticket.
    let completed = audit_store
        .query(&AuditFilter::new().with_event_type("classification_completed"))
        .unwrap();
    assert!(completed.is_empty());
}

#[tokio::test]
async fn test_processing_without_audit_handle_works() {
    // The audit system is optional; the orchestrator must run without it.
    let orchestrator = TicketOrchestrator::new(
        Arc::new(MockClassifier::returning(fixtures::classification(
            Category::GeneralInquiry,
            Urgency::Low,
            false,
            false,
        ))),
        Arc::new(MockDirectory::empty()),
        Arc::new(MockSolver::unused()),
        Arc::new(MockComposer::returning("reply")),
        Arc::new(SqliteTicketStore::in_memory().unwrap()) as Arc<dyn TicketStore>,
    );

    let processed = orchestrator.process("hi", None).await.unwrap();
    assert_eq!(processed.reply, "reply");
}
