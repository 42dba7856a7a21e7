//! Mock reply composer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::providers::{ProviderError, ReplyComposer, ReplyContext};

/// A recorded compose call for test assertions. Owns copies of the
/// context flags; the borrowed context itself cannot outlive the call.
#[derive(Debug, Clone)]
pub struct RecordedCompose {
    pub raw_text: String,
    pub had_customer: bool,
    pub had_resolution: bool,
    pub request_identifier: bool,
}

/// Mock implementation of the ReplyComposer trait.
#[derive(Clone)]
pub struct MockComposer {
    result: Arc<Result<String, String>>,
    contexts: Arc<RwLock<Vec<RecordedCompose>>>,
}

impl MockComposer {
    /// Always produce this reply.
    pub fn returning(reply: impl Into<String>) -> Self {
        Self {
            result: Arc::new(Ok(reply.into())),
            contexts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always fail with a backend error.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            result: Arc::new(Err(error.into())),
            contexts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Contexts seen so far, in order.
    pub async fn seen_contexts(&self) -> Vec<RecordedCompose> {
        self.contexts.read().await.clone()
    }
}

#[async_trait]
impl ReplyComposer for MockComposer {
    fn name(&self) -> &str {
        "mock_composer"
    }

    async fn compose(&self, context: ReplyContext<'_>) -> Result<String, ProviderError> {
        self.contexts.write().await.push(RecordedCompose {
            raw_text: context.raw_text.to_string(),
            had_customer: context.customer.is_some(),
            had_resolution: context.resolution.is_some(),
            request_identifier: context.request_identifier,
        });

        match &*self.result {
            Ok(reply) => Ok(reply.clone()),
            Err(error) => Err(ProviderError::Backend(error.clone())),
        }
    }
}
