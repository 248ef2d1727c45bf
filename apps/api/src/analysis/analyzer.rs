//! Analyzer — turns one workspace image into a `CareerMatchResult`.
//!
//! Pipeline per action: select backend → send prompt + image → normalize the
//! reply → decode. No state survives between calls; identical inputs against
//! a deterministic backend give identical results.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::backend::{select_backend, BackendFactory};
use crate::analysis::models::CareerMatchResult;
use crate::analysis::prompts::CAREER_MATCH_PROMPT;
use crate::intake::WorkspaceImage;
use crate::llm_client::{extract_json_object, strip_json_fences};
use crate::session::Credential;

/// Progress of a single analysis action. `Parsed` and `ParseFailed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Idle,
    BackendSelected,
    RequestSent,
    ResponseReceived,
    Parsed,
    ParseFailed,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No inference backend available: {0}")]
    BackendUnavailable(String),

    /// Covers transport failures, non-JSON text and missing fields alike.
    #[error("Error parsing AI response: {reason}")]
    ResponseUnparseable {
        /// `RequestSent` when the call itself failed, `ParseFailed` when
        /// text came back but did not decode.
        reached: AnalysisStage,
        reason: String,
        raw_output: Option<String>,
    },
}

impl AnalysisError {
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            AnalysisError::ResponseUnparseable { raw_output, .. } => raw_output.as_deref(),
            AnalysisError::BackendUnavailable(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: CareerMatchResult,
    /// Always `Parsed` for a returned outcome.
    pub stage: AnalysisStage,
    pub model_used: String,
    pub notice: Option<String>,
}

pub struct Analyzer {
    factory: Arc<dyn BackendFactory>,
    candidates: Vec<String>,
}

impl Analyzer {
    /// `candidates` is the ordered model list: primary first, fallback last.
    pub fn new(factory: Arc<dyn BackendFactory>, candidates: Vec<String>) -> Self {
        Self {
            factory,
            candidates,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub async fn analyze(
        &self,
        image: &WorkspaceImage,
        credential: &Credential,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let mut stage = AnalysisStage::Idle;

        let selected = select_backend(self.factory.as_ref(), &self.candidates, credential)
            .await
            .map_err(AnalysisError::BackendUnavailable)?;
        stage = advance(stage, AnalysisStage::BackendSelected);
        if let Some(notice) = &selected.notice {
            warn!("{notice}");
        }

        let model = selected.backend.model().to_string();
        stage = advance(stage, AnalysisStage::RequestSent);
        let raw = selected
            .backend
            .generate(CAREER_MATCH_PROMPT, image)
            .await
            .map_err(|e| AnalysisError::ResponseUnparseable {
                reached: stage,
                reason: e.to_string(),
                raw_output: None,
            })?;
        stage = advance(stage, AnalysisStage::ResponseReceived);

        match decode_career_match(&raw) {
            Ok(result) => {
                let stage = advance(stage, AnalysisStage::Parsed);
                info!(
                    "Analysis complete: model={}, current_role={:?}, match={}%",
                    model, result.current_role, result.match_percentage
                );
                Ok(AnalysisOutcome {
                    result,
                    stage,
                    model_used: model,
                    notice: selected.notice,
                })
            }
            Err(e) => {
                warn!("Model {model} returned an unparseable response: {e}");
                Err(AnalysisError::ResponseUnparseable {
                    reached: advance(stage, AnalysisStage::ParseFailed),
                    reason: e.to_string(),
                    raw_output: Some(raw),
                })
            }
        }
    }
}

fn advance(from: AnalysisStage, to: AnalysisStage) -> AnalysisStage {
    tracing::debug!("analysis stage {from:?} -> {to:?}");
    to
}

/// Strips fences, isolates the first JSON object and decodes it.
pub fn decode_career_match(raw: &str) -> Result<CareerMatchResult, serde_json::Error> {
    let cleaned = strip_json_fences(raw);
    let candidate = extract_json_object(&cleaned).unwrap_or(&cleaned);
    serde_json::from_str(candidate)
}
