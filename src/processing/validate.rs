//! Structural validation and normalization of model-produced analyses.
//!
//! Raw model JSON is not trusted: caps are enforced, quotes are grounded
//! against the documents they claim to cite, and the verdict is re-derived
//! from issue counts. Corrections that are safe (dropping excess issues,
//! truncating quotes) happen silently except for a warning appended to
//! `assumptions`; anything else keeps the partial value and is flagged the
//! same way. Normalization is idempotent: a second pass over an already
//! normalized result changes nothing.

use serde_json::Value;
use tracing::warn;

use crate::types::analysis::{
    AnalysisResult, ClauseReference, Issue, RegulatoryFlag, RiskLevel, UserRole, Verdict,
    MAX_QUOTE_CHARS, QUOTE_NOT_FOUND,
};
use crate::utils::compute_hash_id;

/// Maximum number of critical issues retained.
pub const MAX_CRITICAL_ISSUES: usize = 3;

/// Maximum number of non-critical issues retained.
pub const MAX_ISSUES: usize = 10;

/// Document texts quotes are grounded against. `None` skips the grounding
/// check for that document (the text is not always available to the caller).
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTexts<'a> {
    /// Full target document text
    pub target: Option<&'a str>,
    /// Full reference document text
    pub reference: Option<&'a str>,
}

/// Escalation signals that widen the count-based verdict rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictFlags {
    /// An uncurable structural defect justifies do-not-sign below 3 blockers
    pub uncurable_structural: bool,
    /// Material economic impact justifies negotiate below 3 negotiate items
    pub material_economic_impact: bool,
}

/// Derive the verdict from issue counts.
///
/// - do-not-sign: 3+ blockers, or an uncurable structural defect
/// - high-risk: 1-2 blockers
/// - negotiate: no blockers but 3+ negotiate items, or material economics
/// - safe-to-sign: no blockers, at most 2 negotiate items
pub fn derive_verdict(blockers: usize, negotiates: usize, flags: VerdictFlags) -> Verdict {
    if blockers >= 3 || flags.uncurable_structural {
        Verdict::DoNotSign
    } else if blockers >= 1 {
        Verdict::HighRisk
    } else if negotiates >= 3 || flags.material_economic_impact {
        Verdict::Negotiate
    } else {
        Verdict::SafeToSign
    }
}

/// Parse an extracted model JSON object into a normalized [`AnalysisResult`].
///
/// Field-level leniency: a malformed issue or regulatory flag is skipped
/// with a warning instead of failing the whole analysis. Metadata is left
/// empty; the analysis stage stamps it.
pub fn from_model_json(raw: &Value, role: UserRole, docs: &SourceTexts) -> AnalysisResult {
    let mut warnings = Vec::new();

    let declared_verdict = field::<Verdict>(raw, "verdict");
    let verdict_rationale = field::<String>(raw, "verdictRationale").unwrap_or_default();
    let key_action = field::<String>(raw, "keyAction").unwrap_or_default();
    let mut assumptions = field::<Vec<String>>(raw, "assumptions").unwrap_or_default();
    let regulatory_flags = collect_items::<RegulatoryFlag>(raw, "regulatoryFlags", &mut warnings);

    let mut issues = collect_items::<Issue>(raw, "criticalIssues", &mut warnings);
    issues.extend(collect_items::<Issue>(raw, "issues", &mut warnings));

    for message in warnings {
        push_warning(&mut assumptions, message);
    }

    normalize_parts(
        declared_verdict,
        verdict_rationale,
        role,
        key_action,
        issues,
        regulatory_flags,
        assumptions,
        Default::default(),
        docs,
    )
}

/// Re-enforce all invariants on an existing result. Idempotent.
pub fn normalize(result: AnalysisResult, docs: &SourceTexts) -> AnalysisResult {
    let AnalysisResult {
        verdict,
        verdict_rationale,
        protecting_role,
        key_action,
        critical_issues,
        issues,
        regulatory_flags,
        assumptions,
        metadata,
    } = result;

    let mut all_issues = critical_issues;
    all_issues.extend(issues);

    normalize_parts(
        Some(verdict),
        verdict_rationale,
        protecting_role,
        key_action,
        all_issues,
        regulatory_flags,
        assumptions,
        metadata,
        docs,
    )
}

fn field<T: serde::de::DeserializeOwned>(raw: &Value, key: &str) -> Option<T> {
    raw.get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

fn collect_items<T: serde::de::DeserializeOwned>(
    raw: &Value,
    key: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    let Some(items) = raw.get(key).and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(value) => parsed.push(value),
            Err(e) => {
                warn!(key, index, error = %e, "skipping malformed entry in model output");
                warnings.push(format!(
                    "Skipped malformed entry {} in '{}' from model output",
                    index + 1,
                    key
                ));
            }
        }
    }
    parsed
}

#[allow(clippy::too_many_arguments)]
fn normalize_parts(
    declared_verdict: Option<Verdict>,
    verdict_rationale: String,
    protecting_role: UserRole,
    key_action: String,
    issues: Vec<Issue>,
    regulatory_flags: Vec<RegulatoryFlag>,
    mut assumptions: Vec<String>,
    metadata: crate::types::analysis::AnalysisMetadata,
    docs: &SourceTexts,
) -> AnalysisResult {
    let mut kept = Vec::with_capacity(issues.len());
    for mut issue in issues {
        if issue.title.trim().is_empty() {
            push_warning(
                &mut assumptions,
                "Dropped an issue with no title from model output".to_string(),
            );
            continue;
        }
        if issue.fixes.is_empty() {
            push_warning(
                &mut assumptions,
                format!("Dropped issue '{}': no suggested fixes provided", issue.title),
            );
            continue;
        }

        if issue.id.is_empty() {
            issue.id = compute_hash_id(&format!("{}{}", issue.title, issue.summary), "issue-");
        }

        normalize_quote(
            &mut issue.target_ref,
            docs.target,
            &issue.title,
            &mut assumptions,
        );
        if let Some(reference_ref) = issue.reference_ref.as_mut() {
            normalize_quote(reference_ref, docs.reference, &issue.title, &mut assumptions);
        }

        kept.push(issue);
    }

    let (blockers, mut others): (Vec<Issue>, Vec<Issue>) = kept
        .into_iter()
        .partition(|issue| issue.risk == RiskLevel::Blocker);

    // Counts are taken before the caps so four blockers still derive
    // do-not-sign even though only three survive below.
    let blocker_count = blockers.len();
    let negotiate_count = others
        .iter()
        .filter(|issue| issue.risk == RiskLevel::Negotiate)
        .count();

    let mut critical_issues = blockers;
    for dropped in critical_issues.split_off(critical_issues.len().min(MAX_CRITICAL_ISSUES)) {
        push_warning(
            &mut assumptions,
            format!(
                "Critical issue cap exceeded: dropped blocker '{}'",
                dropped.title
            ),
        );
    }

    others.sort_by(|a, b| b.risk.cmp(&a.risk));
    for dropped in others.split_off(others.len().min(MAX_ISSUES)) {
        push_warning(
            &mut assumptions,
            format!("Issue cap exceeded: dropped '{}'", dropped.title),
        );
    }

    let flags = VerdictFlags {
        uncurable_structural: declared_verdict == Some(Verdict::DoNotSign) && blocker_count < 3,
        material_economic_impact: declared_verdict == Some(Verdict::Negotiate)
            && blocker_count == 0
            && negotiate_count < 3,
    };
    let derived = derive_verdict(blocker_count, negotiate_count, flags);
    let verdict = match declared_verdict {
        None => {
            push_warning(
                &mut assumptions,
                "Model omitted the verdict; derived from issue counts".to_string(),
            );
            derived
        }
        Some(declared) if declared == derived => declared,
        Some(declared) => {
            push_warning(
                &mut assumptions,
                format!(
                    "Verdict mismatch: model reported {}, issue counts imply {}; keeping the more severe",
                    declared, derived
                ),
            );
            declared.max(derived)
        }
    };

    AnalysisResult {
        verdict,
        verdict_rationale,
        protecting_role,
        key_action,
        critical_issues,
        issues: others,
        regulatory_flags,
        assumptions,
        metadata,
    }
}

/// Enforce the quote invariants on one clause reference: grounding against
/// the source document (every `[...]`-separated span must appear verbatim),
/// then the length cap.
fn normalize_quote(
    reference: &mut ClauseReference,
    doc_text: Option<&str>,
    issue_title: &str,
    assumptions: &mut Vec<String>,
) {
    if reference.quote == QUOTE_NOT_FOUND {
        return;
    }

    if reference.quote.trim().is_empty() {
        reference.quote = QUOTE_NOT_FOUND.to_string();
        push_warning(
            assumptions,
            format!("Issue '{}': empty quote replaced with not-found marker", issue_title),
        );
        return;
    }

    if let Some(text) = doc_text {
        let grounded = reference
            .quote
            .split("[...]")
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .all(|segment| text.contains(segment));
        if !grounded {
            reference.quote = QUOTE_NOT_FOUND.to_string();
            push_warning(
                assumptions,
                format!(
                    "Issue '{}': quote could not be located in the document and was discarded",
                    issue_title
                ),
            );
            return;
        }
    }

    if reference.quote.chars().count() > MAX_QUOTE_CHARS {
        let marker = " [...]";
        let keep = MAX_QUOTE_CHARS - marker.chars().count();
        let cut: String = reference.quote.chars().take(keep).collect();
        reference.quote = format!("{}{}", cut.trim_end(), marker);
        push_warning(
            assumptions,
            format!(
                "Issue '{}': quote exceeded {} characters and was truncated",
                issue_title, MAX_QUOTE_CHARS
            ),
        );
    }
}

/// Append a normalization warning unless an identical one is already
/// present. Keeps repeated normalization a no-op.
fn push_warning(assumptions: &mut Vec<String>, message: String) {
    if !assumptions.contains(&message) {
        assumptions.push(message);
    }
}
