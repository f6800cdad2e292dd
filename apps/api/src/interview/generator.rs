//! Interview Generator — asks the LLM for the next question, a follow-up
//! decision, or a follow-up question. Every call carries the full context it
//! needs; nothing is remembered by the model between calls.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::policy::{summarize_history, Guidance, InterviewStage};
use crate::interview::prompts::{
    FOLLOW_UP_DECISION_PROMPT_TEMPLATE, FOLLOW_UP_DECISION_ROLE,
    FOLLOW_UP_QUESTION_PROMPT_TEMPLATE, INTERVIEWER_ROLE, NEXT_QUESTION_PROMPT_TEMPLATE,
};
use crate::interview::session::{CandidateSnapshot, Turn};
use crate::job::profile::JobProfile;
use crate::llm_client::prompts::{json_system, render};
use crate::llm_client::{call_json, lenient, ChatModel};

const INTERVIEW_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_FOLLOW_UP_FOCUS: &str = "technical details";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub question_type: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub focus: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub expected_depth: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub interviewer_thinking: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub context_used: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub follow_up_level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowUpDecision {
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub should_follow_up: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reason: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub follow_up_focus: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub confidence: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub suggested_direction: String,
}

impl FollowUpDecision {
    pub fn focus(&self) -> &str {
        if self.follow_up_focus.trim().is_empty() {
            DEFAULT_FOLLOW_UP_FOCUS
        } else {
            &self.follow_up_focus
        }
    }
}

/// Resume and job excerpts retrieved for the latest answer.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub resume: Vec<String>,
    pub job: Vec<String>,
}

impl RetrievedContext {
    /// Prompt section listing the excerpts; empty when nothing was retrieved.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.resume.is_empty() {
            out.push_str("\n## Relevant resume excerpts\n");
            for chunk in &self.resume {
                out.push_str(&format!("- {chunk}\n"));
            }
        }
        if !self.job.is_empty() {
            out.push_str("\n## Relevant job requirements\n");
            for chunk in &self.job {
                out.push_str(&format!("- {chunk}\n"));
            }
        }
        out
    }
}

/// Everything the next-question prompt is built from.
pub struct QuestionRequest<'a> {
    pub candidate: &'a CandidateSnapshot,
    pub job: &'a JobProfile,
    pub turns: &'a [Turn],
    pub round: u32,
    pub context: &'a RetrievedContext,
}

pub struct InterviewGenerator<'a> {
    llm: &'a dyn ChatModel,
}

impl<'a> InterviewGenerator<'a> {
    pub fn new(llm: &'a dyn ChatModel) -> Self {
        Self { llm }
    }

    pub async fn next_question(
        &self,
        request: &QuestionRequest<'_>,
    ) -> Result<GeneratedQuestion, AppError> {
        let candidate_info = to_pretty_json(request.candidate)?;
        let job_info = to_pretty_json(request.job)?;
        let round = request.round.to_string();
        let stage = InterviewStage::for_round(request.round).to_string();
        let guidance = Guidance::for_transcript(request.round, request.turns);
        let history_summary = summarize_history(request.turns);
        let context = request.context.render();

        let prompt = render(
            NEXT_QUESTION_PROMPT_TEMPLATE,
            &[
                ("candidate_info", candidate_info.as_str()),
                ("job_info", job_info.as_str()),
                ("guidance", guidance.instructions()),
                ("context", context.as_str()),
                ("round", round.as_str()),
                ("stage", stage.as_str()),
                ("history_summary", history_summary.as_str()),
            ],
        );

        let question = self
            .ask::<GeneratedQuestion>(&prompt, INTERVIEWER_ROLE, "Question generation")
            .await?;
        require_question(question, "Question generation")
    }

    pub async fn follow_up_decision(
        &self,
        question: &str,
        answer: &str,
        context: &RetrievedContext,
    ) -> Result<FollowUpDecision, AppError> {
        let prompt = render(
            FOLLOW_UP_DECISION_PROMPT_TEMPLATE,
            &[
                ("question", question),
                ("answer", answer),
                ("context", context.render().as_str()),
            ],
        );
        self.ask(&prompt, FOLLOW_UP_DECISION_ROLE, "Follow-up decision").await
    }

    pub async fn follow_up_question(
        &self,
        question: &str,
        answer: &str,
        focus: &str,
        context: &RetrievedContext,
    ) -> Result<GeneratedQuestion, AppError> {
        let prompt = render(
            FOLLOW_UP_QUESTION_PROMPT_TEMPLATE,
            &[
                ("question", question),
                ("answer", answer),
                ("focus", focus),
                ("context", context.render().as_str()),
            ],
        );
        let question = self
            .ask::<GeneratedQuestion>(&prompt, INTERVIEWER_ROLE, "Follow-up generation")
            .await?;
        require_question(question, "Follow-up generation")
    }

    async fn ask<T: serde::de::DeserializeOwned>(
        &self,
        prompt: &str,
        role: &str,
        step: &str,
    ) -> Result<T, AppError> {
        call_json(self.llm, prompt, &json_system(role), INTERVIEW_TEMPERATURE)
            .await
            .map_err(|e| AppError::Llm(format!("{step} failed: {e}")))
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Internal(e.into()))
}

fn require_question(question: GeneratedQuestion, step: &str) -> Result<GeneratedQuestion, AppError> {
    if question.question.trim().is_empty() {
        return Err(AppError::Llm(format!("{step} returned no question")));
    }
    Ok(question)
}
