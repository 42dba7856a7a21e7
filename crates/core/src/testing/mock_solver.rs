//! Mock technical solver for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::providers::{ProviderError, TechnicalSolver};
use crate::ticket::{CustomerRecord, TechnicalResolution, TicketClassification};

/// A recorded solver call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSolve {
    pub raw_text: String,
    /// Name from the customer record passed in, if any.
    pub customer_name: Option<String>,
    pub had_customer: bool,
    pub priority: bool,
}

enum MockSolverBehavior {
    Return(TechnicalResolution),
    ReturnEmpty,
    Fail(String),
    Panic,
}

/// Mock implementation of the TechnicalSolver trait.
#[derive(Clone)]
pub struct MockSolver {
    behavior: Arc<MockSolverBehavior>,
    calls: Arc<RwLock<Vec<RecordedSolve>>>,
}

impl MockSolver {
    /// For tests where the resolution stage must not run. Panics on use,
    /// so a wrongly invoked solver fails the test loudly instead of
    /// surfacing as a soft stage failure.
    pub fn unused() -> Self {
        Self {
            behavior: Arc::new(MockSolverBehavior::Panic),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always produce this resolution.
    pub fn returning(resolution: TechnicalResolution) -> Self {
        Self {
            behavior: Arc::new(MockSolverBehavior::Return(resolution)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always produce nothing usable.
    pub fn returning_empty() -> Self {
        Self {
            behavior: Arc::new(MockSolverBehavior::ReturnEmpty),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always fail with a backend error.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            behavior: Arc::new(MockSolverBehavior::Fail(error.into())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Calls made so far, in order.
    pub async fn seen_calls(&self) -> Vec<RecordedSolve> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl TechnicalSolver for MockSolver {
    fn name(&self) -> &str {
        "mock_solver"
    }

    async fn resolve(
        &self,
        _classification: &TicketClassification,
        raw_text: &str,
        customer: Option<&CustomerRecord>,
        priority: bool,
    ) -> Result<Option<TechnicalResolution>, ProviderError> {
        self.calls.write().await.push(RecordedSolve {
            raw_text: raw_text.to_string(),
            customer_name: customer.and_then(|c| c.name.clone()),
            had_customer: customer.is_some(),
            priority,
        });

        match &*self.behavior {
            MockSolverBehavior::Return(resolution) => Ok(Some(resolution.clone())),
            MockSolverBehavior::ReturnEmpty => Ok(None),
            MockSolverBehavior::Fail(error) => Err(ProviderError::Backend(error.clone())),
            MockSolverBehavior::Panic => panic!("solver should not have been called"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[should_panic(expected = "solver should not have been called")]
    async fn test_unused_solver_panics_when_invoked() {
        let solver = MockSolver::unused();
        let _ = solver
            .resolve(&TicketClassification::fallback(), "text", None, false)
            .await;
    }

    #[tokio::test]
    async fn test_failing_solver_returns_backend_error() {
        let solver = MockSolver::failing("backend down");
        let result = solver
            .resolve(&TicketClassification::fallback(), "text", None, false)
            .await;
        assert!(matches!(result, Err(ProviderError::Backend(_))));
        assert_eq!(solver.seen_calls().await.len(), 1);
    }
}
