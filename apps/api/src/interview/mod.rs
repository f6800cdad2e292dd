//! Interview driver: opens sessions and advances them one answer at a time.

pub mod generator;
pub mod handlers;
pub mod policy;
pub mod prompts;
pub mod session;

use tracing::{info, warn};

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::interview::generator::{InterviewGenerator, QuestionRequest, RetrievedContext};
use crate::interview::policy::allow_follow_up;
use crate::interview::session::{CandidateSnapshot, InterviewSession};
use crate::job::JobDocument;
use crate::llm_client::ChatModel;
use crate::matching::MatchReport;
use crate::resume::ResumeDocument;
use crate::retrieval::DEFAULT_TOP_K;

/// Creates a session and asks the opening question. The session is returned
/// only when the question was generated, so a failed start leaves no trace.
pub async fn open_session(
    session_id: String,
    resume: &ResumeDocument,
    job: &JobDocument,
    report: &MatchReport,
    llm: &dyn ChatModel,
) -> Result<InterviewSession, AppError> {
    let candidate = CandidateSnapshot {
        profile: resume.profile.clone(),
        match_score: report.total_score,
        match_level: report.match_level.clone(),
        job_title: job.profile.display_title().to_string(),
    };
    let mut session = InterviewSession::new(session_id, candidate);

    session.question_count = 1;
    let question = InterviewGenerator::new(llm)
        .next_question(&QuestionRequest {
            candidate: &session.candidate,
            job: &job.profile,
            turns: &session.turns,
            round: session.question_count,
            context: &RetrievedContext::default(),
        })
        .await?;
    session.record_question(&question, false);

    info!("Interview session '{}' started", session.session_id);
    Ok(session)
}

/// Records the answer and produces the next question, either a follow-up on the
/// same topic or a fresh question for the next round.
pub async fn advance(
    session: &mut InterviewSession,
    answer: &str,
    resume: &ResumeDocument,
    job: &JobDocument,
    llm: &dyn ChatModel,
    embedder: &dyn Embedder,
) -> Result<String, AppError> {
    let last_question = session.last_question().to_string();
    session.record_answer(answer);

    let context = retrieve_context(answer, resume, job, embedder).await;
    let generator = InterviewGenerator::new(llm);

    let decision = match generator
        .follow_up_decision(&last_question, answer, &context)
        .await
    {
        Ok(decision) => Some(decision),
        Err(e) => {
            warn!("Follow-up decision failed, moving to a new question: {e}");
            None
        }
    };
    let wants_follow_up = decision.as_ref().is_some_and(|d| d.should_follow_up);

    session.question_count += 1;

    let (question, is_follow_up) = match decision {
        Some(decision) if allow_follow_up(wants_follow_up, session.follow_up_count) => {
            let question = generator
                .follow_up_question(&last_question, answer, decision.focus(), &context)
                .await?;
            session.follow_up_count += 1;
            (question, true)
        }
        _ => {
            let question = generator
                .next_question(&QuestionRequest {
                    candidate: &session.candidate,
                    job: &job.profile,
                    turns: &session.turns,
                    round: session.question_count,
                    context: &context,
                })
                .await?;
            session.follow_up_count = 0;
            (question, false)
        }
    };

    session.record_question(&question, is_follow_up);
    info!(
        "Session '{}' round {} (follow-up: {})",
        session.session_id, session.question_count, is_follow_up
    );
    Ok(question.question)
}

/// Top resume and job chunks for the answer. Retrieval failures yield no context.
async fn retrieve_context(
    answer: &str,
    resume: &ResumeDocument,
    job: &JobDocument,
    embedder: &dyn Embedder,
) -> RetrievedContext {
    let resume_chunks = resume
        .index
        .search(answer, DEFAULT_TOP_K, embedder)
        .await
        .unwrap_or_else(|e| {
            warn!("Resume retrieval failed: {e}");
            Vec::new()
        });
    let job_chunks = job
        .index
        .search(answer, DEFAULT_TOP_K, embedder)
        .await
        .unwrap_or_else(|e| {
            warn!("Job retrieval failed: {e}");
            Vec::new()
        });

    RetrievedContext {
        resume: resume_chunks,
        job: job_chunks,
    }
}
