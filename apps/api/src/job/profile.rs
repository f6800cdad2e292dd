//! Job Profile — structured requirements extracted from a job posting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::job::prompts::{JOB_PARSE_PROMPT_TEMPLATE, JOB_PARSE_ROLE};
use crate::llm_client::prompts::{json_system, render};
use crate::llm_client::{call_json, lenient, ChatModel};

const ANALYSIS_TEMPERATURE: f32 = 0.3;
const SUMMARY_TOP_SKILLS: usize = 3;

/// Built-in posting used when the client supplies no job text.
pub const DEFAULT_JOB_DESCRIPTION: &str = include_str!("../../data/default_job_description.txt");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRequirement {
    #[serde(default, deserialize_with = "lenient::number")]
    pub min_years: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_years: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationRequirement {
    #[serde(default, deserialize_with = "lenient::text")]
    pub min_degree: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub preferred_majors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardRequirements {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub required_experience: Vec<String>,
}

/// Importance of a single skill within the posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillWeight {
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub level: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub required: bool,
}

/// Full structured output of job parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    #[serde(default, deserialize_with = "lenient::text")]
    pub job_title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub department: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub salary_range: String,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub experience_requirement: ExperienceRequirement,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub education_requirement: EducationRequirement,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub hard_requirements: HardRequirements,
    #[serde(default, deserialize_with = "lenient::object_map")]
    pub core_skills: BTreeMap<String, SkillWeight>,
    #[serde(default, deserialize_with = "lenient::object_map")]
    pub preferred_skills: BTreeMap<String, SkillWeight>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub project_requirements: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub bonus_points: Vec<String>,
}

impl JobProfile {
    /// Core skills ordered by descending weight, ties broken by name.
    pub fn top_core_skills(&self, n: usize) -> Vec<&str> {
        let mut skills: Vec<(&String, &SkillWeight)> = self.core_skills.iter().collect();
        skills.sort_by(|a, b| {
            b.1.weight
                .partial_cmp(&a.1.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        skills.into_iter().take(n).map(|(name, _)| name.as_str()).collect()
    }

    /// Short human-readable overview of the posting.
    pub fn summary(&self) -> String {
        let exp = &self.experience_requirement;
        let mut summary = format!(
            "Position: {}\nCompany: {}\nExperience: {}-{} years\n",
            or_unknown(&self.job_title, "Unknown position"),
            or_unknown(&self.company, "Unknown company"),
            format_years(exp.min_years),
            format_years(exp.max_years),
        );

        let top = self.top_core_skills(SUMMARY_TOP_SKILLS);
        if !top.is_empty() {
            summary.push_str(&format!("Core skills: {}", top.join(", ")));
        }
        summary
    }

    /// Title shown to candidates; falls back to a generic label.
    pub fn display_title(&self) -> &str {
        or_unknown(&self.job_title, "AI Engineer")
    }
}

fn or_unknown<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn format_years(years: Option<f64>) -> String {
    let years = years.unwrap_or(0.0);
    if years.fract() == 0.0 {
        format!("{}", years as i64)
    } else {
        format!("{years:.1}")
    }
}

/// Structures a job posting with the LLM. Unlike resumes there is no placeholder:
/// a job profile the interviewer cannot trust is worse than an error.
pub async fn analyze_job(job_text: &str, llm: &dyn ChatModel) -> Result<JobProfile, AppError> {
    let prompt = render(JOB_PARSE_PROMPT_TEMPLATE, &[("job_text", job_text)]);
    let system = json_system(JOB_PARSE_ROLE);
    call_json::<JobProfile>(llm, &prompt, &system, ANALYSIS_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Job parsing failed: {e}")))
}
