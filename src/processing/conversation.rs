//! Conversational follow-up over a completed analysis.
//!
//! Each turn is stateless at the transport level: the caller replays the
//! accumulated history, the analysis result, and the document texts, and
//! gets back the reply plus the extended history. Full document text is
//! attached to the prompt only when the message looks like it needs deep
//! citation, which keeps typical turns cheap.

use std::sync::Arc;
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use tracing::info;

use crate::types::llm::{GenerationParams, ModelClient};
use crate::types::{AnalysisResult, ChatMessage, ChatRole, Error, Result};
use crate::utils::compute_hash_id;

/// Character cap for attached target document text.
pub const TARGET_ATTACH_CHARS: usize = 50_000;

/// Character cap for attached reference document text.
pub const REFERENCE_ATTACH_CHARS: usize = 30_000;

const TRUNCATION_MARKER: &str = "\n[Document truncated]";

/// What a chat turn is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatIntent {
    /// Requests new contract language
    Drafting,
    /// Questions about the analysis or documents
    Qa,
}

/// Document texts carried by the session
#[derive(Debug, Clone)]
pub struct SessionDocuments {
    /// Full target document text
    pub target: String,
    /// Target document filename
    pub target_name: String,
    /// Full reference document text, when one was uploaded
    pub reference: Option<String>,
    /// Reference document filename
    pub reference_name: Option<String>,
}

/// Inputs to one chat turn
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// The user's message
    pub message: String,
    /// Accumulated conversation history, replayed by the caller
    pub history: Vec<ChatMessage>,
    /// The analysis this conversation is about
    pub analysis: AnalysisResult,
    /// Session document texts
    pub documents: SessionDocuments,
}

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The assistant's reply
    pub reply: String,
    /// History with the new user and assistant messages appended
    pub updated_history: Vec<ChatMessage>,
}

fn drafting_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(draft|write|create|generate|compose)\b").unwrap()
    })
}

fn attachment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)section|clause|article|show me|find").unwrap())
}

/// Tag a message as drafting or Q&A.
pub fn detect_intent(message: &str) -> ChatIntent {
    if drafting_pattern().is_match(message) {
        ChatIntent::Drafting
    } else {
        ChatIntent::Qa
    }
}

/// Whether the message needs the full document text attached.
pub fn needs_document_text(message: &str) -> bool {
    attachment_pattern().is_match(message)
}

/// Conversation stage over a model client
pub struct ConversationManager {
    /// Model provider
    model: Arc<dyn ModelClient>,

    /// Generation parameters
    params: GenerationParams,

    /// How many recent turns are replayed into the prompt. The stored
    /// history stays append-only; only the prompt window is bounded.
    max_history_turns: usize,
}

impl ConversationManager {
    /// Create a new conversation manager
    pub fn new(
        model: Arc<dyn ModelClient>,
        params: &GenerationParams,
        max_history_turns: usize,
    ) -> Self {
        Self {
            model,
            params: params.clone(),
            max_history_turns,
        }
    }

    /// Run one turn: build the prompt, invoke the model, append the new
    /// user and assistant messages to the caller's history.
    pub async fn send(&self, turn: ChatTurn) -> Result<ChatOutcome> {
        if turn.message.trim().is_empty() {
            return Err(Error::InvalidInput("message must not be empty".to_string()));
        }

        let intent = detect_intent(&turn.message);
        let prompt = self.build_prompt(&turn, intent);
        let response = self.model.generate(&prompt, &self.params).await?;

        let user_timestamp = Utc::now();
        let user_message = ChatMessage {
            id: compute_hash_id(
                &format!("{}:{}", user_timestamp.to_rfc3339(), turn.message),
                "msg-",
            ),
            role: ChatRole::User,
            content: turn.message,
            timestamp: user_timestamp,
        };

        let assistant_timestamp = Utc::now();
        let assistant_message = ChatMessage {
            id: compute_hash_id(
                &format!("{}:{}", assistant_timestamp.to_rfc3339(), response.text),
                "msg-",
            ),
            role: ChatRole::Assistant,
            content: response.text.clone(),
            timestamp: assistant_timestamp,
        };

        let mut updated_history = turn.history;
        updated_history.push(user_message);
        updated_history.push(assistant_message);

        info!(intent = ?intent, turns = updated_history.len() / 2, "chat turn complete");

        Ok(ChatOutcome {
            reply: response.text,
            updated_history,
        })
    }

    fn build_prompt(&self, turn: &ChatTurn, intent: ChatIntent) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are a private fund legal analyst answering follow-up questions about a document \
             you have already analyzed for the {} ({}).\n\n",
            turn.analysis.protecting_role.tag(),
            turn.analysis.protecting_role.display_name(),
        ));

        prompt.push_str(&format_analysis_context(&turn.analysis));

        if needs_document_text(&turn.message) {
            prompt.push_str(&format!(
                "\n--- TARGET DOCUMENT ({}) ---\n{}\n---\n",
                turn.documents.target_name,
                attach_document(&turn.documents.target, TARGET_ATTACH_CHARS)
            ));
            if let Some(reference) = &turn.documents.reference {
                prompt.push_str(&format!(
                    "\n--- REFERENCE DOCUMENT ({}) ---\n{}\n---\n",
                    turn.documents.reference_name.as_deref().unwrap_or("reference"),
                    attach_document(reference, REFERENCE_ATTACH_CHARS)
                ));
            }
        } else {
            prompt.push_str(
                "\nThe full document text is available on request; ask the user to point at a \
                 section, clause, or article if you need exact language.\n",
            );
        }

        let recent = self.recent_history(&turn.history);
        if !recent.is_empty() {
            prompt.push_str("\nPrevious conversation:\n");
            prompt.push_str(&recent);
        }

        match intent {
            ChatIntent::Drafting => prompt.push_str(
                "\nThe user is asking you to draft language. Respond with two labeled sections:\n\
                 PROPOSED LANGUAGE: the exact text, ready to copy into the document\n\
                 EXPLANATION: why the language is drafted this way and what it protects\n",
            ),
            ChatIntent::Qa => prompt.push_str(
                "\nAnswer directly, citing the specific sections of the document you rely on. \
                 If the document does not address the question, say plainly that it is not in \
                 the document; do not speculate.\n",
            ),
        }

        prompt.push_str(&format!("\nUser: {}\nAssistant:", turn.message));
        prompt
    }

    /// Serialize the most recent turns as alternating User/Assistant lines,
    /// in original order.
    fn recent_history(&self, history: &[ChatMessage]) -> String {
        let window = self.max_history_turns * 2;
        let start = history.len().saturating_sub(window);
        history[start..]
            .iter()
            .map(|message| {
                let speaker = match message.role {
                    ChatRole::User => "User",
                    ChatRole::Assistant => "Assistant",
                };
                format!("{}: {}\n", speaker, message.content)
            })
            .collect()
    }
}

/// Render the analysis as a compact context block: enough for grounded
/// answers without replaying entire documents every turn.
fn format_analysis_context(analysis: &AnalysisResult) -> String {
    let mut context = String::from("--- ANALYSIS CONTEXT ---\n");
    context.push_str(&format!(
        "Verdict: {} (protecting {})\n",
        analysis.verdict,
        analysis.protecting_role.tag()
    ));
    if !analysis.key_action.is_empty() {
        context.push_str(&format!("Key action: {}\n", analysis.key_action));
    }
    for issue in analysis
        .critical_issues
        .iter()
        .chain(analysis.issues.iter())
    {
        context.push_str(&format!(
            "[{}] {:?}: {} — {}\n",
            issue.id, issue.risk, issue.title, issue.summary
        ));
    }
    for assumption in &analysis.assumptions {
        context.push_str(&format!("Assumption: {}\n", assumption));
    }
    context.push_str("---\n");
    context
}

fn attach_document(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drafting_keywords_detected() {
        assert_eq!(detect_intent("Draft a revised MFN clause"), ChatIntent::Drafting);
        assert_eq!(detect_intent("please WRITE new language"), ChatIntent::Drafting);
        assert_eq!(detect_intent("compose a response"), ChatIntent::Drafting);
    }

    #[test]
    fn questions_default_to_qa() {
        assert_eq!(detect_intent("What's the next step?"), ChatIntent::Qa);
        assert_eq!(detect_intent("Is the fee market?"), ChatIntent::Qa);
    }

    #[test]
    fn attachment_triggers() {
        assert!(needs_document_text("What does Section 4.2 say?"));
        assert!(needs_document_text("show me the indemnity language"));
        assert!(needs_document_text("find the clawback provision"));
        assert!(!needs_document_text("What's the next step?"));
    }

    #[test]
    fn attached_document_capped_and_marked() {
        let text = "y".repeat(60_000);
        let attached = attach_document(&text, TARGET_ATTACH_CHARS);
        assert!(attached.ends_with(TRUNCATION_MARKER));
        assert_eq!(attached.len(), TARGET_ATTACH_CHARS + TRUNCATION_MARKER.len());
    }
}
