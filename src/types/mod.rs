//! Core types and configuration for FundLens

use serde::{Deserialize, Serialize};

// Submodules
/// Model-call types and interfaces.
///
/// This module provides:
/// - Generation parameters and response types
/// - The `ModelClient` trait boundary
/// - Error types specific to model invocations
pub mod llm;

/// Domain model for classification and analysis results.
///
/// This module provides:
/// - Role, verdict, and risk enums
/// - Issue, clause-reference, and fix structures
/// - Preflight and chat message types
pub mod analysis;

pub mod error;

pub mod session;

// Re-exports
pub use analysis::{
    AnalysisMetadata, AnalysisResult, ChatMessage, ChatRole, ClauseDocument, ClauseReference,
    Confidence, Directionality, DocumentKind, FixApproach, FlagStatus, Issue, IssueTopic,
    PreflightResult, RedlineChange, RegulatoryCategory, RegulatoryFlag, RiskLevel, SuggestedFix,
    UserRole, Verdict,
};
pub use error::{Error, Result, Stage};
pub use llm::{GenerationParams, ModelClient, ModelError, ModelResponse};
pub use session::SessionState;

/// Configuration for the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default generation parameters (classification overrides temperature)
    pub generation: GenerationParams,

    /// How many recent conversation turns are replayed into chat prompts
    pub max_history_turns: usize,

    /// Request timeout for model invocations, in seconds
    pub timeout_secs: u64,

    /// API configuration
    pub api_config: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: GenerationParams::default(),
            max_history_turns: 20,
            timeout_secs: 120,
            api_config: ApiConfig { gemini: None },
        }
    }
}

/// API provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Gemini API configuration
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,

    /// Model name
    pub model: String,

    /// API endpoint override (defaults to the public endpoint)
    pub api_endpoint: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash-exp".to_string(),
            api_endpoint: None,
        }
    }
}
