use anyhow::anyhow;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::orchestrator::start_run;
use crate::errors::AppError;
use crate::extract::extract_document;
use crate::ingest::{ingest_files, BatchIngestReport, IngestedFile};
use crate::models::AnalysisResult;
use crate::session::SessionSnapshot;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SetJdRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct JdUploadResponse {
    pub filename: String,
    pub chars: usize,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub total: usize,
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session().snapshot())
}

/// PUT /api/v1/jd
pub async fn handle_set_jd(
    State(state): State<AppState>,
    Json(req): Json<SetJdRequest>,
) -> StatusCode {
    state.session_mut().set_jd(req.text);
    StatusCode::NO_CONTENT
}

/// POST /api/v1/jd/file
/// Extracts the uploaded file through the same extractor as resumes and
/// installs its text as the job description.
pub async fn handle_upload_jd(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<JdUploadResponse>, AppError> {
    let mut files = collect_upload(&mut multipart).await?;
    let file = files
        .pop()
        .ok_or_else(|| AppError::Validation("no file in upload".to_string()))?;

    let filename = file.filename.clone();
    let extracted =
        tokio::task::spawn_blocking(move || extract_document(&file.filename, &file.bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))??;
    let chars = extracted.text.chars().count();
    state.session_mut().set_jd(extracted.text);

    Ok(Json(JdUploadResponse { filename, chars }))
}

/// POST /api/v1/resumes
/// Batch upload. Per-file failures are reported in the body, not as an
/// error status: partial success is success for ingestion.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchIngestReport>, AppError> {
    let files = collect_upload(&mut multipart).await?;
    if files.is_empty() {
        return Err(AppError::Validation("no files in upload".to_string()));
    }
    let report = ingest_files(&state, files).await?;
    Ok(Json(report))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_remove_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.session_mut().remove_document(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/analyze
/// Starts the batch run on a background task and returns 202 immediately;
/// clients follow progress through GET /api/v1/session.
pub async fn handle_analyze(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let total = start_run(&state)?;
    Ok((StatusCode::ACCEPTED, Json(AnalyzeResponse { total })))
}

/// GET /api/v1/results
/// Ordered results of the last successful run; empty otherwise. Ranking is
/// a client concern (sort by match_score).
pub async fn handle_get_results(State(state): State<AppState>) -> Json<Vec<AnalysisResult>> {
    Json(state.session().results().to_vec())
}

/// POST /api/v1/reset
pub async fn handle_reset(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.session_mut().reset()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drains a multipart body into named files. Fields without a filename
/// (plain form values) are skipped.
async fn collect_upload(multipart: &mut Multipart) -> Result<Vec<IngestedFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload '{filename}': {e}")))?;
        files.push(IngestedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}
