// All LLM prompt constants for the Resume module.

/// Role description for resume structuring; combined with the JSON-only contract.
pub const RESUME_PARSE_ROLE: &str = "You are a meticulous technical recruiter who extracts \
    structured facts from resumes. Never invent information that is not in the resume.";

/// Resume structuring prompt template. Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Analyze the resume below and return a JSON object.

RESUME TEXT:
{resume_text}

Return exactly this schema:
{
  "name": "candidate full name",
  "position": "target or most recent position",
  "education": "education background",
  "experience": "work experience summary",
  "skills": "comma-separated skills",
  "projects": [
    {
      "name": "project name",
      "description": "what the project does",
      "tech_stack": "technologies used",
      "role": "candidate's role",
      "achievements": "measurable outcomes",
      "duration": "time span"
    }
  ],
  "contact": "contact details"
}

If a field is not present in the resume, use "Not mentioned"."#;
