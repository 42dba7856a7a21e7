//! LLM-backed reply composer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ReplyConfig;
use crate::metrics;
use crate::providers::llm::{ChatRequest, LlmClient};
use crate::providers::traits::{ProviderError, ReplyComposer, ReplyContext};

/// Composes customer-facing replies in the configured language.
pub struct LlmComposer {
    client: Arc<dyn LlmClient>,
    reply: ReplyConfig,
}

impl LlmComposer {
    pub fn new(client: Arc<dyn LlmClient>, reply: ReplyConfig) -> Self {
        Self { client, reply }
    }

    fn system_prompt(&self, context: &ReplyContext<'_>) -> String {
        let language = &self.reply.language;
        let mut prompt = format!(
            "You are a professional customer support representative. Compose a helpful, \
             empathetic email reply IN {}.\n\n\
             Customer sentiment: {}\n\
             Ticket urgency: {}\n\n\
             Guidelines:\n\
             - Write the entire email in {}\n\
             - Be warm and professional\n\
             - Address the customer by name if available\n\
             - Acknowledge their specific concern\n\
             - Provide clear, actionable information\n\
             - Match the tone to their sentiment (more empathetic if frustrated/angry)\n\
             - Include relevant account information when helpful\n\
             - End with next steps or additional support offer\n",
            language.to_uppercase(),
            context.classification.sentiment.as_str(),
            context.classification.urgency.as_str(),
            language,
        );

        if context.request_identifier {
            prompt.push_str(
                "- We could not identify the customer's account. Politely ask them to \
                 reply with their customer ID (format CUST followed by digits)\n",
            );
        }

        if let Some(signature) = &self.reply.signature {
            prompt.push_str(&format!("- Always sign the email with: \"{}\"\n", signature));
        }

        prompt.push_str(&format!(
            "\nIMPORTANT: The entire email response must be written in {}.",
            language
        ));
        prompt
    }

    fn user_prompt(context: &ReplyContext<'_>) -> String {
        let mut lines = Vec::new();
        if let Some(customer) = context.customer {
            if let Some(name) = &customer.name {
                lines.push(format!("Customer: {}", name));
            }
            if let Some(plan) = &customer.plan {
                lines.push(format!("Plan: {}", plan));
            }
            if let Some(last_payment) = &customer.last_payment {
                lines.push(format!("Last payment: {}", last_payment));
            }
            if !customer.support_history.is_empty() {
                lines.push(format!(
                    "Support history: {}",
                    customer.support_history.join("; ")
                ));
            }
        }
        if let Some(resolution) = context.resolution {
            lines.push(format!("Technical diagnosis: {}", resolution.summary));
            for (i, step) in resolution.steps.iter().enumerate() {
                lines.push(format!("Solution step {}: {}", i + 1, step));
            }
        }

        let context_block = if lines.is_empty() {
            "None".to_string()
        } else {
            lines.join("\n")
        };

        format!(
            "Original ticket: {}\n\nAvailable context:\n{}\n\nCompose a professional email reply.",
            context.raw_text, context_block
        )
    }
}

#[async_trait]
impl ReplyComposer for LlmComposer {
    fn name(&self) -> &str {
        "llm_composer"
    }

    async fn compose(&self, context: ReplyContext<'_>) -> Result<String, ProviderError> {
        let request = ChatRequest::new(Self::user_prompt(&context))
            .with_system(self.system_prompt(&context))
            .with_max_tokens(1024)
            .with_temperature(0.7);

        let response = self
            .client
            .complete(request)
            .await
            .map_err(|e| ProviderError::Backend(e.to_string()))?;

        metrics::record_llm_tokens("compose", response.usage);

        let reply = response.text.trim().to_string();
        if reply.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "composer returned empty reply".to_string(),
            ));
        }
        debug!(chars = reply.len(), "reply composed");
        Ok(reply)
    }
}
