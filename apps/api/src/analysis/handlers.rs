//! Axum route handlers for image intake and career analysis.

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::analyzer::AnalysisStage;
use crate::analysis::dashboard::DashboardView;
use crate::analysis::models::CareerMatchResult;
use crate::errors::AppError;
use crate::intake::{ImageSummary, WorkspaceImage};
use crate::session::{resolve_credential, CredentialSource};
use crate::state::AppState;

/// Header carrying a user-entered key when it is not sent as a form field.
pub const API_KEY_HEADER: &str = "x-api-key";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct UploadForm {
    image: Option<WorkspaceImage>,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub image: ImageSummary,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub stage: AnalysisStage,
    pub model_used: String,
    pub notice: Option<String>,
    pub credential_source: CredentialSource,
    pub image: ImageSummary,
    pub result: CareerMatchResult,
    pub dashboard: DashboardView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/images/inspect
///
/// Decodes the `image` field and returns preview metadata. No model call.
pub async fn handle_inspect(multipart: Multipart) -> Result<Json<InspectResponse>, AppError> {
    let form = read_upload(multipart).await?;
    let image = require_image(form.image)?;
    Ok(Json(InspectResponse {
        image: image.summary(),
    }))
}

/// POST /api/v1/analyze
///
/// Runs one analysis action: intake → backend selection → model call →
/// decode → dashboard mapping. Failures after intake are reported with the
/// raw model text when there is one.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_upload(multipart).await?;
    let image = require_image(form.image)?;

    let header_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    // A blank form field does not shadow the header.
    let user_key = form
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .or(header_key);
    let credential = resolve_credential(state.config.gemini_api_key.as_deref(), user_key)
        .ok_or(AppError::Unauthorized)?;

    let analysis_id = Uuid::new_v4();
    info!(
        "Analysis {analysis_id} started: {} ({}x{}, {} bytes), credential={:?}",
        image.file_name,
        image.width,
        image.height,
        image.bytes.len(),
        credential.source()
    );

    let outcome = state.analyzer.analyze(&image, &credential).await?;
    let dashboard = DashboardView::from_result(&outcome.result);

    Ok(Json(AnalyzeResponse {
        analysis_id,
        analyzed_at: Utc::now(),
        stage: outcome.stage,
        model_used: outcome.model_used,
        notice: outcome.notice,
        credential_source: credential.source(),
        image: image.summary(),
        result: outcome.result,
        dashboard,
    }))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.image = Some(WorkspaceImage::from_upload(&file_name, bytes)?);
            }
            Some("api_key") => form.api_key = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

fn require_image(image: Option<WorkspaceImage>) -> Result<WorkspaceImage, AppError> {
    image.ok_or_else(|| AppError::Validation("multipart field 'image' is required".to_string()))
}
