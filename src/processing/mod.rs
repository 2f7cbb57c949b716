//! Document processing and analysis pipeline stages
//!
//! This module provides the stages of the pipeline, including:
//! - Document format handling and text extraction
//! - Bounded preview extraction
//! - Preflight classification, full analysis, and result normalization
//! - Conversational follow-up

/// Document format handling and text extraction.
///
/// This module provides functionality for:
/// - Detecting document formats from MIME hints and file extensions
/// - Extracting text content from various document types
/// - Supporting multiple formats including:
///   - Plain text (.txt)
///   - PDF (.pdf)
///   - Word documents (.docx)
pub mod formats;

/// Bounded preview extraction for classification.
pub mod preview;

/// Preflight classification stage.
pub mod classify;

/// Role-conditioned analysis stage.
pub mod analyze;

/// Validation and normalization of model-produced analyses.
pub mod validate;

/// Conversational follow-up stage.
pub mod conversation;

pub use analyze::{AnalysisRequest, DocumentAnalyzer, DOCUMENT_TRUNCATION_CHARS};
pub use classify::DocumentClassifier;
pub use conversation::{
    detect_intent, needs_document_text, ChatIntent, ChatOutcome, ChatTurn, ConversationManager,
    SessionDocuments,
};
pub use formats::{
    detect_format, get_format_handler, parse_document, DocumentFormat, FormatError, FormatHandler,
};
pub use preview::{preview, PREVIEW_MAX_CHARS};
pub use validate::{derive_verdict, normalize, SourceTexts, VerdictFlags};
