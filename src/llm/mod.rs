// Re-export common types from types module
pub use crate::types::llm::{GenerationParams, ModelClient, ModelError, ModelResponse};

/// Module containing implementations for model providers.
///
/// Supported providers:
/// - Gemini: Google's generative models
pub mod providers;

/// Extraction of the first balanced JSON object from free-form text.
pub mod json;

pub use json::extract_json_object;
pub use providers::GeminiClient;
