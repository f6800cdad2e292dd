pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::job::handlers as job;
use crate::matching::handlers as matching;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Upload limit for resume documents.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume & job ingestion
        .route(
            "/api/resume/upload",
            post(resume::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/job/upload-requirement",
            post(job::handle_upload_requirement),
        )
        // Match analysis
        .route("/api/match/analyze", post(matching::handle_analyze_match))
        // Interview
        .route("/api/interview/start", post(interview::handle_start_interview))
        .route("/api/interview/answer", post(interview::handle_submit_answer))
        .route(
            "/api/interview/history/:session_id",
            get(interview::handle_get_history),
        )
        .route(
            "/api/interview/candidate-info",
            get(interview::handle_candidate_info),
        )
        .route(
            "/api/interview/end/:session_id",
            post(interview::handle_end_interview),
        )
        .route("/api/interview/sessions", get(interview::handle_list_sessions))
        .with_state(state)
}
