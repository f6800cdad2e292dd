// All LLM prompt constants for the Job module.

/// Role description for job structuring; combined with the JSON-only contract.
pub const JOB_PARSE_ROLE: &str = "You are an expert job description analyst. \
    Extract structured hiring requirements from a job posting.";

/// Job structuring prompt template. Replace `{job_text}` before sending.
pub const JOB_PARSE_PROMPT_TEMPLATE: &str = r#"Analyze the job posting below and extract its key information.

JOB POSTING:
{job_text}

Return a JSON object with this EXACT schema:
{
  "job_title": "position title",
  "company": "company name",
  "department": "department",
  "salary_range": "salary range",
  "experience_requirement": {
    "min_years": 3,
    "max_years": 5,
    "level": "seniority description"
  },
  "education_requirement": {
    "min_degree": "minimum degree",
    "preferred_majors": ["major 1", "major 2"]
  },
  "hard_requirements": {
    "required_skills": ["skill 1", "skill 2"],
    "required_experience": ["experience 1", "experience 2"]
  },
  "core_skills": {
    "Computer Vision": {"weight": 0.35, "level": "expert", "required": true}
  },
  "preferred_skills": {
    "CUDA programming": {"weight": 0.1, "level": "familiar"}
  },
  "project_requirements": ["project requirement 1"],
  "bonus_points": ["bonus 1"]
}

RULES:
1. Weights are decimals between 0 and 1; core skill weights should sum to roughly 1.
2. Use "Not mentioned" for missing text fields and [] for missing lists.
3. min_years / max_years are numbers; use null when the posting gives none."#;
