//! Axum route handlers for the Interview API.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::session::{duplicate, CandidateSnapshot, Role};
use crate::interview::{advance, open_session};
use crate::resume::profile::CandidateProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_follow_up: bool,
    pub asked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub candidate_info: CandidateSnapshot,
    pub question_count: u32,
    pub current_is_follow_up: bool,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CandidateInfoResponse {
    pub candidate_info: CandidateProfile,
    pub resume_summary: String,
    pub vector_db_ready: bool,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InterviewSummary {
    pub candidate_name: String,
    pub total_questions: u32,
    pub total_answers: usize,
    pub duration_minutes: i64,
    pub session_ended_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EndInterviewResponse {
    pub status: String,
    pub message: String,
    pub summary: InterviewSummary,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub candidate_name: String,
    pub question_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub active_sessions: usize,
    pub sessions: Vec<SessionInfo>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/interview/start
///
/// Opens a session for the active resume, job and match report and returns the
/// opening question as a JSON string.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<String>, AppError> {
    let session_id = request.session_id.trim().to_string();
    if session_id.is_empty() {
        return Err(AppError::Validation("session_id cannot be empty".to_string()));
    }
    if state.sessions.contains(&session_id).await {
        return Err(duplicate(&session_id));
    }

    let (resume, job, report) = {
        let workspace = state.workspace.read().await;
        (
            workspace.require_resume()?,
            workspace.require_job()?,
            workspace.require_match_report()?,
        )
    };

    let session = open_session(session_id, &resume, &job, &report, state.llm.as_ref()).await?;
    let question = session.last_question().to_string();
    state.sessions.insert(session).await?;

    Ok(Json(question))
}

/// POST /api/interview/answer
///
/// Records the candidate's answer and returns the next question as a JSON string.
/// The session is only updated when the next question was generated.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<String>, AppError> {
    let entry = state.sessions.get(request.session_id.trim()).await?;
    let answer = request.message.trim();
    if answer.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let (resume, job) = {
        let workspace = state.workspace.read().await;
        (workspace.require_resume()?, workspace.require_job()?)
    };

    let _turn = entry.begin_turn().await;
    let mut updated = entry.snapshot().await;
    let question = advance(
        &mut updated,
        answer,
        &resume,
        &job,
        state.llm.as_ref(),
        state.embedder.as_ref(),
    )
    .await?;
    entry.commit(updated).await;

    Ok(Json(question))
}

/// GET /api/interview/history/:session_id
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session = state.sessions.get(&session_id).await?.snapshot().await;

    Ok(Json(HistoryResponse {
        session_id: session.session_id.clone(),
        candidate_info: session.candidate.clone(),
        question_count: session.question_count,
        current_is_follow_up: session.current_is_follow_up,
        history: session
            .turns
            .iter()
            .map(|t| HistoryEntry {
                role: t.role,
                content: t.content.clone(),
                category: t.category.clone(),
                is_follow_up: t.is_follow_up,
                asked_at: t.asked_at,
            })
            .collect(),
        created_at: session.created_at,
    }))
}

/// GET /api/interview/candidate-info
pub async fn handle_candidate_info(
    State(state): State<AppState>,
) -> Result<Json<CandidateInfoResponse>, AppError> {
    let resume = state.workspace.read().await.require_resume()?;

    Ok(Json(CandidateInfoResponse {
        candidate_info: resume.profile.clone(),
        resume_summary: resume.summary(),
        vector_db_ready: !resume.index.is_empty(),
        file_name: resume.file_name.clone(),
        uploaded_at: resume.uploaded_at,
    }))
}

/// POST /api/interview/end/:session_id
pub async fn handle_end_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<EndInterviewResponse>, AppError> {
    let session = state.sessions.remove(&session_id).await?;
    let ended_at = Utc::now();

    Ok(Json(EndInterviewResponse {
        status: "success".to_string(),
        message: "Interview ended".to_string(),
        summary: InterviewSummary {
            candidate_name: session.candidate.profile.name.clone(),
            total_questions: session.question_count,
            total_answers: session.answer_count(),
            duration_minutes: (ended_at - session.created_at).num_minutes(),
            session_ended_at: ended_at,
        },
    }))
}

/// GET /api/interview/sessions
pub async fn handle_list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions: Vec<SessionInfo> = state
        .sessions
        .list()
        .await
        .into_iter()
        .map(|s| SessionInfo {
            candidate_name: s.candidate.profile.name.clone(),
            session_id: s.session_id,
            question_count: s.question_count,
            created_at: s.created_at,
            last_activity: s.last_activity,
        })
        .collect();

    Json(SessionListResponse {
        active_sessions: sessions.len(),
        sessions,
    })
}
