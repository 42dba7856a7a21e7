//! Mock classifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::providers::{Classifier, ProviderError};
use crate::ticket::TicketClassification;

/// Mock implementation of the Classifier trait.
///
/// Returns a fixed classification or a fixed error, and records every
/// ticket text it was asked to classify.
#[derive(Clone)]
pub struct MockClassifier {
    result: Arc<Result<TicketClassification, String>>,
    seen: Arc<RwLock<Vec<String>>>,
}

impl MockClassifier {
    /// Always classify as `classification`.
    pub fn returning(classification: TicketClassification) -> Self {
        Self {
            result: Arc::new(Ok(classification)),
            seen: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always fail with a backend error.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            result: Arc::new(Err(error.into())),
            seen: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Ticket texts seen so far, in order.
    pub async fn seen_texts(&self) -> Vec<String> {
        self.seen.read().await.clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock_classifier"
    }

    async fn classify(&self, raw_text: &str) -> Result<TicketClassification, ProviderError> {
        self.seen.write().await.push(raw_text.to_string());
        match &*self.result {
            Ok(classification) => Ok(classification.clone()),
            Err(error) => Err(ProviderError::Backend(error.clone())),
        }
    }
}
