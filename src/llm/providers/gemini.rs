use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::types::llm::{GenerationParams, ModelClient, ModelError, ModelResponse};
use crate::types::GeminiConfig;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent` response format
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<usize>,
}

/// Gemini client implementation
pub struct GeminiClient {
    /// HTTP client
    client: Client,

    /// Client configuration
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig, timeout_secs: u64) -> Result<Self, ModelError> {
        if config.api_key.is_empty() {
            return Err(ModelError::ConfigError(
                "API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the API request URL
    fn build_url(&self) -> String {
        let endpoint = self
            .config
            .api_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT);
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            endpoint, self.config.model, self.config.api_key
        )
    }

    /// Build request payload
    fn build_request(&self, prompt: &str, params: &GenerationParams) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": params.temperature,
                "topP": params.top_p,
                "topK": params.top_k,
                "maxOutputTokens": params.max_output_tokens,
            }
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ModelResponse, ModelError> {
        let response = self
            .client
            .post(self.build_url())
            .json(&self.build_request(prompt, params))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::RateLimitExceeded(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| ModelError::InvalidResponse("no candidates in response".to_string()))?;

        Ok(ModelResponse {
            text,
            tokens_used: parsed.usage_metadata.and_then(|u| u.total_token_count),
            model: self.config.model.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
