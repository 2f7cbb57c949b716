//! Preflight document classification.
//!
//! Infers the likely reviewing party, document kind, and directionality from
//! a bounded preview. Runs at low temperature: a categorical decision wants
//! low variance, not varied phrasing.

use std::sync::Arc;

use tracing::info;

use crate::llm::extract_json_object;
use crate::processing::preview::{preview, PREVIEW_MAX_CHARS};
use crate::types::llm::{GenerationParams, ModelClient};
use crate::types::{Confidence, Error, PreflightResult, Result, Stage, UserRole};

/// Temperature for classification calls.
const CLASSIFY_TEMPERATURE: f32 = 0.3;

const CLASSIFY_PROMPT_HEADER: &str = r#"You are classifying a private fund document to determine the likely user perspective.

Analyze the provided document excerpts and return JSON:

{
  "inferredRole": "gp" or "lp",
  "confidence": "high" or "medium" or "low",
  "documentType": "side-letter" or "lpa" or "sub-doc" or "co-invest" or "other",
  "directionality": "incoming" or "outgoing" or "unknown",
  "rationale": "One sentence explaining your inference"
}

CLASSIFICATION LOGIC:

Document Type Signals:
- "Side Letter" in title, references to "Investor" rights -> side-letter
- "Limited Partnership Agreement," "LPA" -> lpa
- "Subscription Agreement," "Subscription Booklet" -> sub-doc
- "Co-Investment," "Co-Invest" in title -> co-invest

Role Inference:
- Side letter with requests/asks seeking concessions -> LP drafting (outgoing), infer LP
- Side letter being reviewed for what to grant -> GP reviewing (incoming), infer GP
- LPA being reviewed -> more likely LP (conducting diligence), medium confidence
- Sub docs being reviewed -> more likely GP (checking LP compliance), medium confidence

Confidence Calibration:
- HIGH: Clear signals in document title, party names, or explicit role references
- MEDIUM: Document type suggests likely role but no explicit confirmation
- LOW: Ambiguous or insufficient information

Directionality:
- incoming: Document received from counterparty for review/approval
- outgoing: Document drafted by user's side, seeking feedback
- unknown: Cannot determine from context

Only analyze the first 2-3 pages. Be concise."#;

/// Classification stage over a model client
pub struct DocumentClassifier {
    /// Model provider
    model: Arc<dyn ModelClient>,

    /// Generation parameters (classification temperature applied)
    params: GenerationParams,
}

impl DocumentClassifier {
    /// Create a new classifier
    pub fn new(model: Arc<dyn ModelClient>, base_params: &GenerationParams) -> Self {
        let params = GenerationParams {
            temperature: CLASSIFY_TEMPERATURE,
            ..base_params.clone()
        };
        Self { model, params }
    }

    /// Build the classification prompt for a document preview
    fn build_prompt(document_preview: &str) -> String {
        format!(
            "{header}\n\n--- DOCUMENT TEXT ---\n{text}\n---\n\nReturn only valid JSON.",
            header = CLASSIFY_PROMPT_HEADER,
            // Re-cap defensively; callers are supposed to pass a preview
            // but the bound is cheap to enforce twice.
            text = preview(document_preview, PREVIEW_MAX_CHARS),
        )
    }

    /// Classify a document preview.
    ///
    /// When `manual_role` is supplied the inferred fields are overwritten
    /// post-hoc; the override is authoritative and does not influence the
    /// prompt. Callers that already know the role can skip this stage
    /// entirely via [`PreflightResult::manual`].
    pub async fn classify(
        &self,
        document_preview: &str,
        manual_role: Option<UserRole>,
    ) -> Result<PreflightResult> {
        let prompt = Self::build_prompt(document_preview);
        let response = self.model.generate(&prompt, &self.params).await?;

        let raw = extract_json_object(&response.text).ok_or(Error::ResponseParse {
            stage: Stage::Classification,
        })?;
        let mut classification: PreflightResult =
            serde_json::from_str(raw).map_err(|_| Error::ResponseParse {
                stage: Stage::Classification,
            })?;

        if let Some(role) = manual_role {
            classification.inferred_role = role;
            classification.confidence = Confidence::High;
            classification.rationale = "User manually selected role".to_string();
        }

        info!(
            role = classification.inferred_role.tag(),
            document_type = ?classification.document_type,
            "document classified"
        );

        Ok(classification)
    }
}
