use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during model invocations
#[derive(Error, Debug)]
pub enum ModelError {
    /// API request failed, timed out, or could not connect
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Response did not match the expected shape
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::RequestFailed(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ModelError::RequestFailed(format!("Connection failed: {}", err))
        } else {
            ModelError::RequestFailed(err.to_string())
        }
    }
}

/// Parameters for a single generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature for generation (0.0 to 1.0)
    pub temperature: f32,

    /// Top-p sampling parameter
    pub top_p: f32,

    /// Top-k sampling parameter
    pub top_k: u32,

    /// Maximum number of tokens to generate
    pub max_output_tokens: usize,

    /// Additional model-specific parameters
    pub extra_params: HashMap<String, String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            extra_params: HashMap::new(),
        }
    }
}

impl GenerationParams {
    /// Same defaults with a different temperature.
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }
}

/// Response from a model generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Generated text
    pub text: String,

    /// Number of tokens used, when the provider reports it
    pub tokens_used: Option<usize>,

    /// Model that produced the response
    pub model: String,
}

/// Trait for generative model clients.
///
/// The pipeline treats generation as a black box: prompt in, text out.
/// Implementations own their transport, authentication, and timeout; the
/// caller only supplies sampling parameters per call.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate text from a prompt
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ModelResponse, ModelError>;

    /// Identifier of the underlying model, stamped into analysis metadata
    fn model_name(&self) -> &str;
}
