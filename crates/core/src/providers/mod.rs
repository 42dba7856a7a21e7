//! Pluggable providers for the natural-language stages.
//!
//! The coordinator only sees the traits in [`traits`]; the LLM-backed
//! implementations here are one choice of backend.

pub mod classifier;
pub mod composer;
pub mod llm;
pub mod solver;
pub mod traits;

pub use classifier::LlmClassifier;
pub use composer::LlmComposer;
pub use llm::{
    AnthropicClient, ChatRequest, ChatResponse, LlmClient, LlmError, OllamaClient, TokenUsage,
};
pub use solver::LlmSolver;
pub use traits::{Classifier, ProviderError, ReplyComposer, ReplyContext, TechnicalSolver};
