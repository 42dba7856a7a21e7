//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of all provider traits and
//! the customer directory, allowing comprehensive pipeline testing
//! without an LLM backend or real customer data.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk_core::testing::{MockClassifier, MockDirectory, MockSolver, MockComposer};
//!
//! let classifier = MockClassifier::returning(classification);
//! let directory = MockDirectory::with_customer(fixtures::customer("CUST001"));
//! let solver = MockSolver::unused();
//! let composer = MockComposer::returning("Dear customer, ...");
//!
//! // Use in TicketOrchestrator::new(...)
//! ```

mod mock_classifier;
mod mock_composer;
mod mock_directory;
mod mock_solver;

pub use mock_classifier::MockClassifier;
pub use mock_composer::{MockComposer, RecordedCompose};
pub use mock_directory::MockDirectory;
pub use mock_solver::{MockSolver, RecordedSolve};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ticket::{
        Category, CustomerRecord, EstimatedEffort, Sentiment, TicketClassification, Urgency,
    };

    /// A customer record with reasonable defaults.
    pub fn customer(customer_id: &str) -> CustomerRecord {
        CustomerRecord {
            customer_id: customer_id.to_string(),
            name: Some("Anna Keller".to_string()),
            email: Some("anna.keller@example.com".to_string()),
            plan: Some("Premium".to_string()),
            join_date: Some("2023-04-01".to_string()),
            last_payment: Some("2026-08-01".to_string()),
            support_history: vec!["2024-01: invoice question".to_string()],
        }
    }

    /// A classification with every field explicit, for readable tests.
    pub fn classification(
        category: Category,
        urgency: Urgency,
        needs_customer_data: bool,
        needs_technical_help: bool,
    ) -> TicketClassification {
        TicketClassification {
            category,
            urgency,
            sentiment: Sentiment::Neutral,
            needs_customer_data,
            needs_technical_help,
            estimated_effort: EstimatedEffort::FifteenMin,
        }
    }
}
