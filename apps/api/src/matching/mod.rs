//! Matching — fuses embedding similarity with an LLM fit judgement.
//!
//! `total = 0.2 * vector + 0.8 * llm`, both clamped to [0, 1]. When the LLM
//! judgement is unavailable the report degrades to the vector score alone.

pub mod handlers;
pub mod prompts;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::embedding::{cosine_similarity, Embedder, EmbeddingError};
use crate::job::profile::JobProfile;
use crate::llm_client::prompts::{json_system, render, FRESH_CONTEXT_INSTRUCTION};
use crate::llm_client::{call_json, lenient, ChatModel, LlmError};
use crate::matching::prompts::{MATCH_PROMPT_TEMPLATE, MATCH_ROLE, SHORT_RESUME_PROMPT_TEMPLATE};
use crate::resume::profile::CandidateProfile;

const VECTOR_WEIGHT: f64 = 0.2;
const LLM_WEIGHT: f64 = 0.8;
const SHORT_RESUME_CHARS: usize = 50;
const MATCH_TEMPERATURE: f32 = 0.3;

pub const METHOD_FUSED: &str = "vector_and_llm";
pub const METHOD_VECTOR_ONLY: &str = "vector_only";
pub const VECTOR_ONLY_LEVEL: &str = "Vector similarity only";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSimilarity {
    pub similarity_score: f64,
    pub resume_length: usize,
    pub job_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceAnalysis {
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub decision: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reason: String,
}

/// The LLM's structured fit judgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitAnalysis {
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub match_level: String,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub skill_analysis: SkillAnalysis,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub experience_analysis: ExperienceAnalysis,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub interview_focus: Vec<String>,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub recommendation: Recommendation,
    #[serde(default, deserialize_with = "lenient::text")]
    pub analysis_summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub total_score: f64,
    pub match_level: String,
    pub vector_similarity: Option<VectorSimilarity>,
    pub llm_analysis: Option<FitAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_error: Option<String>,
    pub recommendation: Recommendation,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub interview_focus: Vec<String>,
    pub analysis_summary: String,
    pub analysis_method: String,
    pub generated_at: DateTime<Utc>,
}

/// Inputs to one match analysis.
pub struct MatchInput<'a> {
    pub resume_text: &'a str,
    pub candidate: &'a CandidateProfile,
    pub job_text: &'a str,
    pub job: &'a JobProfile,
}

/// Cosine similarity of the full resume and job texts. Both texts go in one batch
/// so the two vectors always come from the same backend.
pub async fn vector_similarity(
    resume_text: &str,
    job_text: &str,
    embedder: &dyn Embedder,
) -> Result<VectorSimilarity, EmbeddingError> {
    let mut vectors = embedder
        .embed_batch(&[resume_text.to_string(), job_text.to_string()])
        .await?
        .into_iter();
    let (Some(resume_vec), Some(job_vec)) = (vectors.next(), vectors.next()) else {
        return Err(EmbeddingError::InvalidResponse(
            "expected vectors for resume and job".to_string(),
        ));
    };
    Ok(VectorSimilarity {
        similarity_score: f64::from(cosine_similarity(&resume_vec, &job_vec)),
        resume_length: resume_text.trim().chars().count(),
        job_length: job_text.trim().chars().count(),
    })
}

/// Asks the LLM for a fit judgement. Short resumes get a prompt that forbids invention.
pub async fn analyze_fit(
    resume_text: &str,
    job: &JobProfile,
    llm: &dyn ChatModel,
) -> Result<FitAnalysis, LlmError> {
    let job_requirements = serde_json::to_string_pretty(job).map_err(LlmError::Parse)?;
    let resume_length = resume_text.trim().chars().count();

    let prompt = if resume_length < SHORT_RESUME_CHARS {
        render(
            SHORT_RESUME_PROMPT_TEMPLATE,
            &[
                ("fresh_context", FRESH_CONTEXT_INSTRUCTION),
                ("job_requirements", job_requirements.as_str()),
                ("resume_length", resume_length.to_string().as_str()),
                ("resume_text", resume_text),
            ],
        )
    } else {
        render(
            MATCH_PROMPT_TEMPLATE,
            &[
                ("fresh_context", FRESH_CONTEXT_INSTRUCTION),
                ("job_requirements", job_requirements.as_str()),
                ("resume_text", resume_text),
            ],
        )
    };

    call_json(llm, &prompt, &json_system(MATCH_ROLE), MATCH_TEMPERATURE).await
}

/// `0.2 * vector + 0.8 * llm`, each clamped to [0, 1].
pub fn fuse_scores(vector: Option<f64>, llm: f64) -> f64 {
    VECTOR_WEIGHT * clamp_unit(vector.unwrap_or(0.0)) + LLM_WEIGHT * clamp_unit(llm)
}

fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Produces the full report. Never fails: embedding or LLM failures degrade the report.
pub async fn build_match_report(
    input: MatchInput<'_>,
    llm: &dyn ChatModel,
    embedder: &dyn Embedder,
) -> MatchReport {
    let vector = if !input.resume_text.trim().is_empty() && !input.job_text.trim().is_empty() {
        match vector_similarity(input.resume_text, input.job_text, embedder).await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Vector similarity failed, scoring without it: {e}");
                None
            }
        }
    } else {
        None
    };
    let vector_score = vector.as_ref().map(|v| v.similarity_score);

    let llm_input = if input.resume_text.trim().is_empty() {
        serde_json::to_string_pretty(input.candidate).unwrap_or_default()
    } else {
        input.resume_text.to_string()
    };

    match analyze_fit(&llm_input, input.job, llm).await {
        Ok(analysis) => {
            let total_score = fuse_scores(vector_score, analysis.overall_score);
            info!(
                "Match analyzed: total={:.3}, vector={:?}, llm={:.3}",
                total_score, vector_score, analysis.overall_score
            );
            MatchReport {
                total_score,
                match_level: analysis.match_level.clone(),
                vector_similarity: vector,
                recommendation: analysis.recommendation.clone(),
                strengths: analysis.strengths.clone(),
                weaknesses: analysis.weaknesses.clone(),
                interview_focus: analysis.interview_focus.clone(),
                analysis_summary: analysis.analysis_summary.clone(),
                llm_analysis: Some(analysis),
                llm_error: None,
                analysis_method: METHOD_FUSED.to_string(),
                generated_at: Utc::now(),
            }
        }
        Err(e) => {
            warn!("LLM fit analysis failed, falling back to vector similarity: {e}");
            MatchReport {
                total_score: clamp_unit(vector_score.unwrap_or(0.0)),
                match_level: VECTOR_ONLY_LEVEL.to_string(),
                vector_similarity: vector,
                llm_analysis: None,
                llm_error: Some(e.to_string()),
                recommendation: Recommendation::default(),
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                interview_focus: Vec::new(),
                analysis_summary: "LLM analysis unavailable; assessed on vector similarity only"
                    .to_string(),
                analysis_method: METHOD_VECTOR_ONLY.to_string(),
                generated_at: Utc::now(),
            }
        }
    }
}
