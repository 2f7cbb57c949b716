//! FundLens - evidence-anchored risk analysis for private fund documents
//!
//! This library ingests private-fund legal documents, infers the reviewing
//! party's stance (fund manager vs. investor), and produces a structured,
//! evidence-anchored risk analysis plus a conversational interface over
//! that analysis. The generative model is a trait boundary; everything
//! around it — prompt policy, output validation, conversation state — is
//! this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::sync::Arc;

// Module declarations
/// Processing module for document handling and pipeline stages.
///
/// Provides:
/// - Text extraction per document format
/// - Preview extraction
/// - Classification, analysis, validation, and conversation stages
pub mod processing;

/// Model module for generative model operations.
///
/// Provides:
/// - The `ModelClient` trait boundary
/// - Provider implementations (Gemini)
/// - JSON extraction from free-form responses
pub mod llm;

/// Common types and configuration structures.
///
/// Contains:
/// - Error types and Result aliases
/// - Configuration structures
/// - The analysis domain model
pub mod types;

/// Utility functions and helper traits.
pub mod utils;

// Re-exports
pub use crate::processing::{AnalysisRequest, ChatOutcome, ChatTurn, SessionDocuments};
pub use crate::types::{
    AnalysisResult, Config, Error, PreflightResult, Result, SessionState, UserRole,
};

use crate::llm::GeminiClient;
use crate::processing::{ConversationManager, DocumentAnalyzer, DocumentClassifier};
use crate::types::ModelClient;

/// Main FundLens struct that coordinates the pipeline stages.
///
/// Each call is a pure function of its inputs plus one model invocation;
/// there is no shared mutable state, so a single instance can serve
/// concurrent requests without coordination.
#[derive(Clone)]
pub struct FundLens {
    // Model provider shared by all stages
    model: Arc<dyn ModelClient>,

    // Configuration
    config: Arc<Config>,
}

impl FundLens {
    /// Creates a new instance over an explicit model client.
    pub fn new(model: Arc<dyn ModelClient>, config: Config) -> Self {
        Self {
            model,
            config: Arc::new(config),
        }
    }

    /// Creates a new instance from configuration, building the Gemini
    /// client from `config.api_config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let gemini = config
            .api_config
            .gemini
            .clone()
            .ok_or_else(|| Error::InvalidInput("no model provider configured".to_string()))?;
        let client = GeminiClient::new(gemini, config.timeout_secs)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Replaces the model client.
    pub fn with_model(mut self, model: Arc<dyn ModelClient>) -> Self {
        self.model = model;
        self
    }

    /// Parse an uploaded document into plain text.
    ///
    /// # Arguments
    /// * `bytes` - Raw file content
    /// * `mime_hint` - MIME type reported by the uploader, if any
    /// * `filename` - Original filename, used as a detection fallback
    ///
    /// # Returns
    /// The extracted text if the format is supported and non-empty
    pub async fn parse_document(
        &self,
        bytes: &[u8],
        mime_hint: Option<&str>,
        filename: &str,
    ) -> Result<String> {
        Ok(processing::parse_document(bytes, mime_hint, filename).await?)
    }

    /// Classify a document preview to infer the reviewing role.
    ///
    /// A manual role short-circuits nothing here — it overrides the inferred
    /// fields after classification. Callers that want to skip the model call
    /// entirely should use [`PreflightResult::manual`] instead.
    pub async fn classify(
        &self,
        document_preview: &str,
        manual_role: Option<UserRole>,
    ) -> Result<PreflightResult> {
        DocumentClassifier::new(self.model.clone(), &self.config.generation)
            .classify(document_preview, manual_role)
            .await
    }

    /// Analyze a document and return the normalized structured result.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        DocumentAnalyzer::new(self.model.clone(), &self.config.generation)
            .analyze(request)
            .await
    }

    /// Run one conversational turn over a completed analysis.
    pub async fn chat(&self, turn: ChatTurn) -> Result<ChatOutcome> {
        ConversationManager::new(
            self.model.clone(),
            &self.config.generation,
            self.config.max_history_turns,
        )
        .send(turn)
        .await
    }
}
