/// Gemini API client implementation.
///
/// Provides integration with Google's Gemini models through their REST API.
/// Supports:
/// - Text generation via `generateContent`
/// - Per-request sampling parameters
/// - Timeout and rate-limit error mapping
pub mod gemini;

pub use gemini::GeminiClient;
