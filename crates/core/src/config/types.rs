use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// Database configuration. Tickets, audit events, and the customer
/// directory share one SQLite file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("helpdesk.db")
}

/// LLM backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Model name, e.g. "claude-3-5-haiku-latest" or "llama3".
    pub model: String,
    /// API key (required when provider = "anthropic")
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override the provider's default API base URL
    #[serde(default)]
    pub api_base: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Available LLM providers
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Anthropic,
    Ollama,
}

/// Reply composition configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplyConfig {
    /// Language replies are written in.
    #[serde(default = "default_language")]
    pub language: String,
    /// Fixed signature appended to every reply, if set.
    #[serde(default)]
    pub signature: Option<String>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            signature: None,
        }
    }
}

fn default_language() -> String {
    "English".to_string()
}

/// Sanitized config for logs and status output (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<SanitizedLlmConfig>,
    pub reply: ReplyConfig,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            database: config.database.clone(),
            llm: config.llm.as_ref().map(|llm| SanitizedLlmConfig {
                provider: match llm.provider {
                    LlmProvider::Anthropic => "anthropic".to_string(),
                    LlmProvider::Ollama => "ollama".to_string(),
                },
                model: llm.model.clone(),
                api_key_configured: llm.api_key.is_some(),
                api_base: llm.api_base.clone(),
                timeout_secs: llm.timeout_secs,
            }),
            reply: config.reply.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("helpdesk.db"));
        assert!(config.llm.is_none());
        assert_eq!(config.reply.language, "English");
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config = Config {
            llm: Some(LlmConfig {
                provider: LlmProvider::Anthropic,
                model: "claude-3-5-haiku-latest".to_string(),
                api_key: Some("sk-secret".to_string()),
                api_base: None,
                timeout_secs: 30,
            }),
            ..Default::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let llm = sanitized.llm.unwrap();
        assert!(llm.api_key_configured);

        let json = serde_json::to_string(&llm).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
