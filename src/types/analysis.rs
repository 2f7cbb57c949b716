//! Domain model for document classification and risk analysis.
//!
//! Wire names follow the JSON schema the analysis prompt instructs the model
//! to emit (camelCase fields, kebab-case enum values), so raw model output
//! deserializes directly into these types before normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The literal quote value a model must use when no supporting text exists.
pub const QUOTE_NOT_FOUND: &str = "Not found in document";

/// Maximum length of a clause quote, in characters.
pub const MAX_QUOTE_CHARS: usize = 250;

/// Party the analysis is conducted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// General Partner — fund manager
    Gp,
    /// Limited Partner — investor
    Lp,
}

impl UserRole {
    /// Long-form label used in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Gp => "General Partner / Fund Manager",
            UserRole::Lp => "Limited Partner / Investor",
        }
    }

    /// Short uppercase tag used in prompts
    pub fn tag(&self) -> &'static str {
        match self {
            UserRole::Gp => "GP",
            UserRole::Lp => "LP",
        }
    }

    /// Wire name, as it appears in JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Gp => "gp",
            UserRole::Lp => "lp",
        }
    }
}

/// Classification confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Kind of fund document, inferred during preflight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    SideLetter,
    Lpa,
    SubDoc,
    CoInvest,
    Other,
}

/// Whether the document was received or drafted by the reviewing side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directionality {
    Incoming,
    Outgoing,
    Unknown,
}

/// Result of the preflight classification stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightResult {
    /// Role the document is most likely being reviewed for
    pub inferred_role: UserRole,
    /// Confidence in the inference
    pub confidence: Confidence,
    /// Kind of document
    pub document_type: DocumentKind,
    /// Incoming or outgoing from the reviewer's perspective
    pub directionality: Directionality,
    /// One sentence explaining the inference
    pub rationale: String,
}

impl PreflightResult {
    /// Synthesized record for a manually selected role; classification is
    /// skipped entirely when the caller already knows the answer.
    pub fn manual(role: UserRole) -> Self {
        Self {
            inferred_role: role,
            confidence: Confidence::High,
            document_type: DocumentKind::Other,
            directionality: Directionality::Unknown,
            rationale: "User manually selected role".to_string(),
        }
    }
}

/// Overall signing recommendation, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    SafeToSign,
    Negotiate,
    HighRisk,
    DoNotSign,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Verdict::SafeToSign => "safe-to-sign",
            Verdict::Negotiate => "negotiate",
            Verdict::HighRisk => "high-risk",
            Verdict::DoNotSign => "do-not-sign",
        };
        write!(f, "{}", name)
    }
}

/// Risk level of an individual issue, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Standard,
    Negotiate,
    Blocker,
}

/// Subject area of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueTopic {
    ManagementFee,
    CarriedInterest,
    PreferredReturn,
    Clawback,
    FeeOffset,
    Indemnification,
    Exculpation,
    Mfn,
    CoInvest,
    Liquidity,
    TransferRestrictions,
    Reporting,
    AuditRights,
    Governance,
    LpAdvisoryCommittee,
    KeyPerson,
    GpRemoval,
    TermExtensions,
    Erisa,
    Tax,
    Confidentiality,
    Other,
}

impl Default for IssueTopic {
    fn default() -> Self {
        IssueTopic::Other
    }
}

/// Which uploaded document a clause reference points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseDocument {
    Target,
    Reference,
}

/// A pointer into one of the session documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClauseReference {
    /// Document the quote was taken from
    pub document: ClauseDocument,
    /// Human-readable locator, e.g. "Section 4.2", "Article VII"
    pub locator: String,
    /// Verbatim text, max 250 chars, `[...]` for omissions — or the
    /// literal "Not found in document"
    pub quote: String,
}

impl Default for ClauseReference {
    fn default() -> Self {
        Self {
            document: ClauseDocument::Target,
            locator: String::new(),
            quote: QUOTE_NOT_FOUND.to_string(),
        }
    }
}

/// A proposed textual edit with justification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedlineChange {
    /// Exact text to remove
    pub original: String,
    /// Exact text to insert
    pub proposed: String,
    /// Why this change is reasonable or market
    pub market_justification: String,
}

/// How aggressive a suggested fix is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixApproach {
    /// Minor tweak
    Soft,
    /// Significant revision
    Hard,
}

impl Default for FixApproach {
    fn default() -> Self {
        FixApproach::Soft
    }
}

/// A concrete remediation for an issue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestedFix {
    /// Soft (tweak) or hard (rewrite)
    pub approach: FixApproach,
    /// What this fix accomplishes
    pub description: String,
    /// The proposed edit
    pub redline: RedlineChange,
}

/// A single finding in the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Unique identifier, e.g. "issue-001"
    #[serde(default)]
    pub id: String,
    /// Severity of the finding
    #[serde(default = "default_risk")]
    pub risk: RiskLevel,
    /// Subject area
    #[serde(default)]
    pub topic: IssueTopic,
    /// Short headline
    #[serde(default)]
    pub title: String,
    /// 1-2 sentence explanation of the problem
    #[serde(default)]
    pub summary: String,
    /// Why this matters to the client
    #[serde(default)]
    pub impact_analysis: String,
    /// Quote from the target document
    #[serde(default)]
    pub target_ref: ClauseReference,
    /// Quote from the reference document, when a conflict is claimed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_ref: Option<ClauseReference>,
    /// At least one fix is required
    #[serde(default)]
    pub fixes: Vec<SuggestedFix>,
    /// What is typical in the market
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_context: Option<String>,
}

fn default_risk() -> RiskLevel {
    RiskLevel::Standard
}

/// Regulatory regime a flag concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegulatoryCategory {
    Erisa,
    UbtiEci,
    Foia,
    OfacAml,
    StateLaw,
}

/// Status of a regulatory flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagStatus {
    Clear,
    Flag,
    NeedsReview,
}

/// A regulatory observation attached to the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryFlag {
    /// Regulatory regime
    pub category: RegulatoryCategory,
    /// Clear, flagged, or needs review
    pub status: FlagStatus,
    /// Brief explanation
    #[serde(default)]
    pub summary: String,
}

/// Facts about the analysis run, stamped by the pipeline — never taken
/// from model output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisMetadata {
    /// When the analysis completed (RFC 3339)
    pub analysis_timestamp: String,
    /// Target document filename
    pub target_document_name: String,
    /// Reference document filename, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_document_name: Option<String>,
    /// Model identifier
    pub model_used: String,
}

/// The central structured artifact of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Signing recommendation, derived from issue counts
    pub verdict: Verdict,
    /// 2-3 sentences explaining the verdict
    #[serde(default)]
    pub verdict_rationale: String,
    /// Role the analysis protects
    pub protecting_role: UserRole,
    /// Single-sentence next step
    #[serde(default)]
    pub key_action: String,
    /// Max 3, all blockers
    #[serde(default)]
    pub critical_issues: Vec<Issue>,
    /// All other issues, max 10, negotiate before standard
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Regulatory observations
    #[serde(default)]
    pub regulatory_flags: Vec<RegulatoryFlag>,
    /// Caveats: what was assumed, plus normalization warnings
    #[serde(default)]
    pub assumptions: Vec<String>,
    /// Stamped run facts
    #[serde(default)]
    pub metadata: AnalysisMetadata,
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One immutable message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message id
    pub id: String,
    /// Who sent it
    pub role: ChatRole,
    /// Message text
    pub content: String,
    /// When it was created
    pub timestamp: DateTime<Utc>,
}
