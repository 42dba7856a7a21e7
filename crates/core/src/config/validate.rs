use super::{
    types::{Config, LlmProvider},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Anthropic provider has an API key
/// - LLM timeout is not 0
/// - Reply language is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if let Some(llm) = &config.llm {
        if llm.provider == LlmProvider::Anthropic && llm.api_key.is_none() {
            return Err(ConfigError::ValidationError(
                "llm.api_key is required when llm.provider = \"anthropic\"".to_string(),
            ));
        }
        if llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_secs cannot be 0".to_string(),
            ));
        }
        if llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model cannot be empty".to_string(),
            ));
        }
    }

    if config.reply.language.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "reply.language cannot be empty".to_string(),
        ));
    }

    Ok(())
}
