pub mod audit;
pub mod config;
pub mod directory;
pub mod metrics;
pub mod orchestrator;
pub mod providers;
pub mod routing;
pub mod testing;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    LlmConfig, LlmProvider, ReplyConfig, SanitizedConfig,
};
pub use orchestrator::{OrchestratorError, ProcessedTicket, TicketOrchestrator};
