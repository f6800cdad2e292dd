//! Axum route handlers for the Matching API.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::matching::{build_match_report, MatchInput, MatchReport};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub status: String,
    pub message: String,
    pub match_report: MatchReport,
    pub candidate_name: String,
    pub job_title: String,
}

/// POST /api/match/analyze
///
/// Scores the active resume against the active job and stores the report for
/// the interview. The previous report is discarded before scoring starts.
pub async fn handle_analyze_match(
    State(state): State<AppState>,
) -> Result<Json<MatchResponse>, AppError> {
    let (resume, job) = {
        let mut workspace = state.workspace.write().await;
        workspace.clear_match_report();
        (workspace.require_resume()?, workspace.require_job()?)
    };

    let report = build_match_report(
        MatchInput {
            resume_text: &resume.text,
            candidate: &resume.profile,
            job_text: &job.text,
            job: &job.profile,
        },
        state.llm.as_ref(),
        state.embedder.as_ref(),
    )
    .await;

    let response = MatchResponse {
        status: "success".to_string(),
        message: "Match analysis completed".to_string(),
        match_report: report.clone(),
        candidate_name: resume.profile.name.clone(),
        job_title: job.profile.display_title().to_string(),
    };

    state
        .workspace
        .write()
        .await
        .set_match_report(resume.id, job.id, Arc::new(report));

    Ok(Json(response))
}
