//! Axum route handlers for the Resume API.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::document::{extract_text, DocumentError};
use crate::resume::profile::CandidateProfile;
use crate::resume::ResumeDocument;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub status: String,
    pub message: String,
    pub resume_id: Uuid,
    pub candidate_info: CandidateProfile,
    pub chunk_count: usize,
    pub resume_processed: bool,
}

/// POST /api/resume/upload
///
/// Multipart upload (field `file`, PDF only). Extracts text, structures it with the
/// LLM, indexes it, and makes it the active resume. Any previous match report is
/// discarded because it no longer describes the active pair.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let (file_name, bytes) = read_file_field(&mut multipart).await?;

    let name = file_name.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
        .await
        .map_err(|e| DocumentError::Extraction(format!("extraction task failed: {e}")))??;

    let document =
        ResumeDocument::ingest(file_name, text, state.llm.as_ref(), state.embedder.as_ref())
            .await?;

    let response = ResumeUploadResponse {
        status: "success".to_string(),
        message: "Resume uploaded and analyzed".to_string(),
        resume_id: document.id,
        candidate_info: document.profile.clone(),
        chunk_count: document.index.len(),
        resume_processed: true,
    };

    state.workspace.write().await.set_resume(Arc::new(document));

    Ok(Json(response))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Uploaded file has no file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Could not read upload", e))?;
        return Ok((file_name, bytes));
    }

    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

/// Oversized bodies keep their 413; every other multipart failure is a bad request.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: upload exceeds the size limit"))
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}
