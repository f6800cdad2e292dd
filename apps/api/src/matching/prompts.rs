// All LLM prompt constants for the Matching module.

/// Role description for fit analysis; combined with the JSON-only contract.
pub const MATCH_ROLE: &str = "You are a senior technical recruiter. \
    Judge how well a resume fits a job using only the evidence provided.";

/// Normal fit-analysis prompt.
/// Replace `{fresh_context}`, `{job_requirements}` and `{resume_text}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"{fresh_context}

Analyze how well this resume matches the job.

JOB REQUIREMENTS:
{job_requirements}

RESUME:
{resume_text}

Base every statement on the actual resume content. Return JSON:
{
  "overall_score": 0.0,
  "match_level": "match level",
  "skill_analysis": {"score": 0.0, "matched_skills": ["skills actually matched"], "missing_skills": ["skills missing"]},
  "experience_analysis": {"score": 0.0, "description": "experience assessment"},
  "strengths": ["real strengths"],
  "weaknesses": ["real weaknesses"],
  "interview_focus": ["topics to probe in the interview"],
  "recommendation": {"decision": "recommend / consider with caution / not recommended", "reason": "why"},
  "analysis_summary": "summary"
}

All scores are decimals between 0.0 and 1.0."#;

/// Prompt for resumes too short to assess.
/// Replace `{fresh_context}`, `{job_requirements}`, `{resume_length}` and `{resume_text}`.
pub const SHORT_RESUME_PROMPT_TEMPLATE: &str = r#"{fresh_context}

Analyze how well this resume matches the job.

JOB REQUIREMENTS:
{job_requirements}

RESUME ({resume_length} characters):
{resume_text}

IMPORTANT: the resume contains almost no information. Do NOT invent any experience,
skills or projects. Return JSON:
{
  "overall_score": 0.1,
  "match_level": "Not a match",
  "skill_analysis": {"score": 0.1, "matched_skills": [], "missing_skills": ["all required skills"]},
  "experience_analysis": {"score": 0.1, "description": "Resume lacks information; cannot assess"},
  "strengths": ["None identifiable"],
  "weaknesses": ["Severely insufficient information"],
  "interview_focus": ["Request a complete resume"],
  "recommendation": {"decision": "not recommended", "reason": "insufficient information"},
  "analysis_summary": "Resume lacks information; cannot assess"
}"#;
