use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisResult, ChatMessage};

/// How long a client-held session snapshot stays usable.
pub const SESSION_FRESHNESS_MINUTES: i64 = 30;

/// Client-held session snapshot.
///
/// The pipeline keeps no server-side state; the caller carries this snapshot
/// between calls and replays the relevant parts into each one. Expired
/// sessions are discarded rather than reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Opaque session identifier
    pub session_id: String,
    /// The analysis this session is about
    pub analysis_result: AnalysisResult,
    /// Full extracted target document text
    pub target_document_text: String,
    /// Target document filename
    pub target_document_name: String,
    /// Full extracted reference document text, when one was uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_document_text: Option<String>,
    /// Reference document filename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_document_name: Option<String>,
    /// Append-only conversation history
    pub conversation_history: Vec<ChatMessage>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    /// Whether the snapshot has aged past the freshness window.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::minutes(SESSION_FRESHNESS_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::analysis::{AnalysisMetadata, UserRole, Verdict};

    fn sample_session(created_at: DateTime<Utc>) -> SessionState {
        SessionState {
            session_id: "sess-1".to_string(),
            analysis_result: AnalysisResult {
                verdict: Verdict::SafeToSign,
                verdict_rationale: String::new(),
                protecting_role: UserRole::Lp,
                key_action: String::new(),
                critical_issues: vec![],
                issues: vec![],
                regulatory_flags: vec![],
                assumptions: vec![],
                metadata: AnalysisMetadata::default(),
            },
            target_document_text: "text".to_string(),
            target_document_name: "doc.pdf".to_string(),
            reference_document_text: None,
            reference_document_name: None,
            conversation_history: vec![],
            created_at,
        }
    }

    #[test]
    fn fresh_session_within_window() {
        let now = Utc::now();
        let session = sample_session(now - Duration::minutes(29));
        assert!(!session.is_expired(now));
    }

    #[test]
    fn expired_session_past_window() {
        let now = Utc::now();
        let session = sample_session(now - Duration::minutes(31));
        assert!(session.is_expired(now));
    }
}
