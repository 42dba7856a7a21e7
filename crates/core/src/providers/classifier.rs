//! LLM-backed ticket classifier.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::metrics;
use crate::providers::llm::{complete_json, ChatRequest, LlmClient};
use crate::providers::traits::{Classifier, ProviderError};
use crate::ticket::{Category, EstimatedEffort, Sentiment, TicketClassification, Urgency};

const SYSTEM_PROMPT: &str = r#"You are a ticket routing specialist. Analyze support tickets and determine:

1. ticket_type: "billing", "technical", "account", "general_inquiry", "complaint"
2. urgency: "low", "medium", "high", "critical"
3. requires_customer_data: true/false (if we need to look up customer information)
4. requires_technical_help: true/false (if technical problem-solving is needed)
5. customer_sentiment: "positive", "neutral", "frustrated", "angry"
6. estimated_resolution_time: "5min", "15min", "30min", "1hour+"

Return valid JSON with these exact keys and nothing else."#;

/// Wire shape of the model's answer. Keys follow the prompt, not our
/// internal field names.
#[derive(Debug, Deserialize)]
struct ClassificationWire {
    ticket_type: Category,
    urgency: Urgency,
    requires_customer_data: bool,
    requires_technical_help: bool,
    customer_sentiment: Sentiment,
    estimated_resolution_time: EstimatedEffort,
}

impl From<ClassificationWire> for TicketClassification {
    fn from(wire: ClassificationWire) -> Self {
        Self {
            category: wire.ticket_type,
            urgency: wire.urgency,
            sentiment: wire.customer_sentiment,
            needs_customer_data: wire.requires_customer_data,
            needs_technical_help: wire.requires_technical_help,
            estimated_effort: wire.estimated_resolution_time,
        }
    }
}

/// Classifies tickets by asking an LLM for a structured verdict.
pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    fn name(&self) -> &str {
        "llm_classifier"
    }

    async fn classify(&self, raw_text: &str) -> Result<TicketClassification, ProviderError> {
        let request = ChatRequest::new(format!("Analyze this support ticket:\n\n{}", raw_text))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(512);

        let (wire, usage): (ClassificationWire, _) = complete_json(&*self.client, request)
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        metrics::record_llm_tokens("classify", usage);
        let classification = TicketClassification::from(wire);
        debug!(
            category = classification.category.as_str(),
            urgency = classification.urgency.as_str(),
            "ticket classified"
        );
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_parses_prompt_keys() {
        let json = r#"{
            "ticket_type": "billing",
            "urgency": "high",
            "requires_customer_data": true,
            "requires_technical_help": false,
            "customer_sentiment": "frustrated",
            "estimated_resolution_time": "30min"
        }"#;

        let wire: ClassificationWire = serde_json::from_str(json).unwrap();
        let classification = TicketClassification::from(wire);

        assert_eq!(classification.category, Category::Billing);
        assert_eq!(classification.urgency, Urgency::High);
        assert_eq!(classification.sentiment, Sentiment::Frustrated);
        assert!(classification.needs_customer_data);
        assert!(!classification.needs_technical_help);
        assert_eq!(classification.estimated_effort, EstimatedEffort::ThirtyMin);
    }

    #[test]
    fn test_wire_format_rejects_unknown_category() {
        let json = r#"{
            "ticket_type": "mystery",
            "urgency": "low",
            "requires_customer_data": false,
            "requires_technical_help": false,
            "customer_sentiment": "neutral",
            "estimated_resolution_time": "5min"
        }"#;

        assert!(serde_json::from_str::<ClassificationWire>(json).is_err());
    }
}
