// All LLM prompt constants for the Interview module.

/// Role description for question generation; combined with the JSON-only contract.
pub const INTERVIEWER_ROLE: &str = "You are an experienced technical interviewer \
    running a live interview. Ask one question at a time.";

/// Next-question prompt. Placeholders: `{candidate_info}`, `{job_info}`,
/// `{guidance}`, `{context}`, `{round}`, `{stage}`, `{history_summary}`.
pub const NEXT_QUESTION_PROMPT_TEMPLATE: &str = r#"Generate the next interview question from the information below.

## Candidate resume
{candidate_info}

## Job requirements
{job_info}

## Important
{guidance}
{context}
## Progress
- This is question number {round}
- Interview stage: {stage}

## Conversation so far
{history_summary}

## Interviewer principles
1. Judge the stage from the conversation and the quality of the answers, not from the round alone.
2. Verify the fundamentals of the job's core skills before going deep into projects.
3. Prefer questions grounded in the retrieved resume excerpts and job requirements.
4. Think like a real interviewer: consider the background, the role and what is already known.
5. Progress gradually: fundamentals, then project experience, then depth of thinking.
6. Stay targeted on the core skills the job requires.
7. Do not repeat topics already discussed.
8. Keep transitions natural.
9. When retrieved content is relevant, ask about its concrete details.
10. If the fundamentals are solid, move on early; if they are weak, keep consolidating them.

Return JSON:
{
  "type": "context_enhanced_question",
  "category": "question category (e.g. skill verification, project experience, way of thinking)",
  "question": "the question, natural and professional",
  "focus": "what the question assesses",
  "expected_depth": "basic | medium | high",
  "interviewer_thinking": "why this question now",
  "context_used": true
}"#;

/// Role description for follow-up decisions.
pub const FOLLOW_UP_DECISION_ROLE: &str = "You are an experienced interviewer \
    deciding whether an answer deserves a follow-up question.";

/// Follow-up decision prompt. Placeholders: `{question}`, `{answer}`, `{context}`.
pub const FOLLOW_UP_DECISION_PROMPT_TEMPLATE: &str = r#"Analyze the candidate's answer and decide whether to follow up.

Question: {question}

Candidate answer: {answer}
{context}
Follow up when:
1. The answer is short or vague and lacks concrete detail.
2. An interesting technical point was mentioned but not explained.
3. Jargon was used without showing real understanding.
4. A project or experience was mentioned without data or results.
5. The answer seems inconsistent with the resume.
6. The topic is a core skill of the job and worth exploring.

Do NOT follow up when:
1. The answer is detailed and already demonstrates the ability.
2. The same topic has already been followed up twice in a row.
3. The answer has little relevance to the job.
4. The candidate clearly does not know the topic.
5. The candidate explicitly declined to answer.

Return JSON:
{
  "should_follow_up": true,
  "reason": "why",
  "follow_up_focus": "what to focus on if following up",
  "confidence": "high | medium | low",
  "suggested_direction": "suggested follow-up or next topic"
}"#;

/// Follow-up question prompt. Placeholders: `{question}`, `{answer}`, `{focus}`, `{context}`.
pub const FOLLOW_UP_QUESTION_PROMPT_TEMPLATE: &str = r#"Write one precise follow-up question based on the candidate's answer.

Original question: {question}

Candidate answer: {answer}

Follow-up focus: {focus}
{context}
The follow-up must:
1. Build on what the candidate just said.
2. Dig into deeper technical detail or practical experience.
3. Check how well the candidate really understands the topic.
4. Keep the conversation natural.
5. Cross-check against the resume where possible.

Return JSON:
{
  "type": "follow_up_question",
  "category": "follow-up category",
  "question": "the follow-up question",
  "focus": "what it assesses",
  "expected_depth": "basic | medium | high",
  "interviewer_thinking": "why this follow-up",
  "follow_up_level": "first | second | third"
}"#;
