//! Axum route handlers for the Job API.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::job::profile::{JobProfile, DEFAULT_JOB_DESCRIPTION};
use crate::job::JobDocument;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JobUploadRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobUploadResponse {
    pub status: String,
    pub message: String,
    pub job_id: Uuid,
    pub job_info: JobProfile,
    pub job_summary: String,
    pub job_processed: bool,
    pub loaded_at: DateTime<Utc>,
}

/// POST /api/job/upload-requirement
///
/// Optional body `{ "text": "..." }`. An empty body, missing text or blank text
/// loads the built-in posting; a body that is not that shape is rejected with 400.
/// Replaces the active job and discards the current match report.
pub async fn handle_upload_requirement(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<JobUploadResponse>, AppError> {
    let request = parse_upload_request(&body)?;
    let supplied = request.text.filter(|t| !t.trim().is_empty());
    let (text, message) = match supplied {
        Some(text) => (text, "Job requirement uploaded and analyzed"),
        None => (
            DEFAULT_JOB_DESCRIPTION.to_string(),
            "Default job requirement loaded and analyzed",
        ),
    };

    let document = JobDocument::ingest(text, state.llm.as_ref(), state.embedder.as_ref()).await?;

    let response = JobUploadResponse {
        status: "success".to_string(),
        message: message.to_string(),
        job_id: document.id,
        job_info: document.profile.clone(),
        job_summary: document.summary.clone(),
        job_processed: true,
        loaded_at: document.loaded_at,
    };

    state.workspace.write().await.set_job(Arc::new(document));

    Ok(Json(response))
}

fn parse_upload_request(body: &[u8]) -> Result<JobUploadRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JobUploadRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid job requirement body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_means_default_posting() {
        assert!(parse_upload_request(b"").unwrap().text.is_none());
        assert!(parse_upload_request(b" \n").unwrap().text.is_none());
        assert!(parse_upload_request(b"{}").unwrap().text.is_none());
        assert!(parse_upload_request(b"{\"text\": null}").unwrap().text.is_none());
    }

    #[test]
    fn test_text_is_read_from_body() {
        let request = parse_upload_request(br#"{"text": "Rust engineer"}"#).unwrap();
        assert_eq!(request.text.as_deref(), Some("Rust engineer"));
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let bodies: [&[u8]; 3] = [br#"{"text": 5}"#, b"{\"text\": ", b"[1, 2]"];
        for body in bodies {
            assert!(matches!(
                parse_upload_request(body),
                Err(AppError::Validation(_))
            ));
        }
    }
}
