//! truthlens-llm — LLM backend abstraction layer.
//! Provides the `LlmBackend` trait, provider backends, the analysis prompt
//! and response schema, JSON repair for model output, call pacing and audit
//! records.

pub mod backend;
pub mod parse;
pub mod prompt;
pub mod quota;
pub mod audit;

pub use backend::{GeminiBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, Message, OpenAiCompatibleBackend};
