use thiserror::Error;

use crate::processing::formats::FormatError;
use crate::types::llm::ModelError;

/// Pipeline stage that produced an unparseable model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Preflight document classification
    Classification,
    /// Full document analysis
    Analysis,
    /// Conversational follow-up
    Chat,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Classification => write!(f, "classification"),
            Stage::Analysis => write!(f, "analysis"),
            Stage::Chat => write!(f, "chat"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Required input was missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document format could not be parsed
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Parsed document text was blank
    #[error("Empty content: {0}")]
    EmptyContent(String),

    /// The generative call failed, timed out, or was rate-limited
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),

    /// No valid JSON object found in a model response
    #[error("No JSON object found in {stage} response")]
    ResponseParse {
        /// Stage whose response could not be parsed
        stage: Stage,
    },

    /// Parsed JSON violated structural invariants beyond safe correction
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::UnsupportedFormat(fmt) => Error::UnsupportedFormat(fmt),
            FormatError::EmptyDocument(name) => Error::EmptyContent(name),
            FormatError::Processing(msg) => Error::UnsupportedFormat(msg),
        }
    }
}
