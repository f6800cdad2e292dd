//! Resume Profile — structures raw resume text into candidate fields via the LLM.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::{json_system, render};
use crate::llm_client::{call_json, lenient, ChatModel};
use crate::resume::prompts::{RESUME_PARSE_PROMPT_TEMPLATE, RESUME_PARSE_ROLE};

const ANALYSIS_TEMPERATURE: f32 = 0.3;
const NOT_MENTIONED: &str = "Not mentioned";
const NOT_ANALYZED: &str = "Not analyzed";

/// A project listed on the resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tech_stack: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub achievements: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub duration: String,
}

/// Structured candidate information extracted from a resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub education: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub experience: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub skills: String,
    #[serde(default, deserialize_with = "lenient::object_list")]
    pub projects: Vec<ProjectSummary>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub contact: String,
}

impl CandidateProfile {
    /// Placeholder used when the LLM could not structure the resume.
    /// Interviews can still run; the interviewer is told to ask for details.
    pub fn placeholder() -> Self {
        Self {
            name: "Candidate".to_string(),
            position: "Unknown".to_string(),
            education: NOT_ANALYZED.to_string(),
            experience: NOT_ANALYZED.to_string(),
            skills: NOT_ANALYZED.to_string(),
            projects: vec![ProjectSummary {
                name: "To be discussed".to_string(),
                description: "Resume analysis failed; ask the candidate".to_string(),
                tech_stack: "To be discussed".to_string(),
                role: "To be discussed".to_string(),
                achievements: "To be discussed".to_string(),
                duration: "To be discussed".to_string(),
            }],
            contact: NOT_ANALYZED.to_string(),
        }
    }

    /// Replaces blank fields with "Not mentioned".
    fn fill_missing(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.position,
            &mut self.education,
            &mut self.experience,
            &mut self.skills,
            &mut self.contact,
        ] {
            if field.trim().is_empty() {
                *field = NOT_MENTIONED.to_string();
            }
        }
        for project in &mut self.projects {
            for field in [
                &mut project.name,
                &mut project.description,
                &mut project.tech_stack,
                &mut project.role,
                &mut project.achievements,
                &mut project.duration,
            ] {
                if field.trim().is_empty() {
                    *field = NOT_MENTIONED.to_string();
                }
            }
        }
        self
    }
}

/// Structures resume text with the LLM. Never fails: any LLM or decoding error
/// yields [`CandidateProfile::placeholder`].
pub async fn analyze_resume(resume_text: &str, llm: &dyn ChatModel) -> CandidateProfile {
    let prompt = render(RESUME_PARSE_PROMPT_TEMPLATE, &[("resume_text", resume_text)]);
    let system = json_system(RESUME_PARSE_ROLE);

    match call_json::<CandidateProfile>(llm, &prompt, &system, ANALYSIS_TEMPERATURE).await {
        Ok(profile) => profile.fill_missing(),
        Err(e) => {
            warn!("Resume analysis failed, using placeholder profile: {e}");
            CandidateProfile::placeholder()
        }
    }
}
