//! LLM-backed technical problem solver.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::metrics;
use crate::providers::llm::{complete_json, ChatRequest, LlmClient};
use crate::providers::traits::{ProviderError, TechnicalSolver};
use crate::ticket::{CustomerRecord, TechnicalResolution, TicketClassification};

const SYSTEM_PROMPT: &str = r#"You are a technical support expert. Analyze the technical issue and provide:

1. A clear diagnosis of the problem
2. Step-by-step solution instructions
3. Preventive measures
4. An escalation recommendation if needed

Be technical but user-friendly in your explanations.

Return valid JSON with exactly these keys:
{"summary": "<one-paragraph diagnosis>", "steps": ["<step 1>", "<step 2>", ...]}"#;

#[derive(Debug, Deserialize)]
struct ResolutionWire {
    summary: String,
    #[serde(default)]
    steps: Vec<String>,
}

/// Generates technical resolutions for tickets flagged as needing them.
pub struct LlmSolver {
    client: Arc<dyn LlmClient>,
}

impl LlmSolver {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    fn build_prompt(
        raw_text: &str,
        customer: Option<&CustomerRecord>,
        priority: bool,
    ) -> String {
        let context = match customer {
            Some(record) => {
                serde_json::to_string(record).unwrap_or_else(|_| "Not available".to_string())
            }
            None => "Not available".to_string(),
        };

        let mut prompt = String::new();
        if priority {
            prompt.push_str("CRITICAL PRIORITY: this issue is fast-tracked.\n\n");
        }
        prompt.push_str(&format!(
            "Technical Issue:\n{}\n\nContext:\nCustomer Info: {}",
            raw_text, context
        ));
        prompt
    }
}

#[async_trait]
impl TechnicalSolver for LlmSolver {
    fn name(&self) -> &str {
        "llm_solver"
    }

    async fn resolve(
        &self,
        _classification: &TicketClassification,
        raw_text: &str,
        customer: Option<&CustomerRecord>,
        priority: bool,
    ) -> Result<Option<TechnicalResolution>, ProviderError> {
        let request = ChatRequest::new(Self::build_prompt(raw_text, customer, priority))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(1024);

        let (wire, usage): (ResolutionWire, _) = complete_json(&*self.client, request)
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        metrics::record_llm_tokens("resolve", usage);

        let resolution = TechnicalResolution {
            summary: wire.summary.trim().to_string(),
            steps: wire.steps,
        };
        if resolution.is_empty() {
            debug!("solver returned an empty resolution");
            return Ok(None);
        }
        debug!(steps = resolution.steps.len(), "technical resolution generated");
        Ok(Some(resolution))
    }
}
