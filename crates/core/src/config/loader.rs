use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("HELPDESK_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[database]
path = "tickets.db"

[llm]
provider = "ollama"
model = "llama3"

[reply]
language = "German"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.database.path.to_str(), Some("tickets.db"));
        assert_eq!(config.llm.unwrap().provider, LlmProvider::Ollama);
        assert_eq!(config.reply.language, "German");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.database.path.to_str(), Some("helpdesk.db"));
        assert!(config.llm.is_none());
    }

    #[test]
    fn test_load_config_from_str_bad_provider() {
        let toml = r#"
[llm]
provider = "openai"
model = "gpt-4"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[llm]
provider = "anthropic"
model = "claude-3-5-haiku-latest"
api_key = "sk-test"
timeout_secs = 10
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        let llm = config.llm.unwrap();
        assert_eq!(llm.provider, LlmProvider::Anthropic);
        assert_eq!(llm.timeout_secs, 10);
    }
}
