//! Interview flow policy: stage by round, guidance from the transcript,
//! history summary and the follow-up cap.

use std::fmt;

use crate::interview::session::{Role, Turn};

/// Consecutive follow-ups allowed before the interviewer must change topic.
pub const MAX_CONSECUTIVE_FOLLOW_UPS: u32 = 2;

const MIN_TURNS_FOR_FUNDAMENTALS: usize = 4;
const MIN_KEYWORD_HITS: usize = 2;
const MAX_SUMMARY_TOPICS: usize = 5;

const FUNDAMENTALS_KEYWORDS: &[&str] = &[
    "algorithm",
    "data structure",
    "principle",
    "concept",
    "fundamental",
    "theory",
    "definition",
    "difference",
    "pros and cons",
];

const PROJECT_KEYWORDS: &[&str] = &[
    "project",
    "develop",
    "implement",
    "architecture",
    "tech stack",
    "challenge",
    "solution",
    "experience",
];

const TOPIC_KEYWORDS: &[&str] = &[
    "skill",
    "project",
    "experience",
    "work",
    "learning",
    "challenge",
    "team",
    "technology",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStage {
    Opening,
    Fundamentals,
    Projects,
    DeepAssessment,
}

impl InterviewStage {
    /// Stage for a 1-based question round.
    pub fn for_round(round: u32) -> Self {
        match round {
            0 | 1 => Self::Opening,
            2..=3 => Self::Fundamentals,
            4..=8 => Self::Projects,
            _ => Self::DeepAssessment,
        }
    }
}

impl fmt::Display for InterviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Opening => "Opening - self-introduction",
            Self::Fundamentals => "Fundamentals - verify professional basics",
            Self::Projects => "Project experience - probe practical ability",
            Self::DeepAssessment => "Deep assessment - overall capability",
        };
        f.write_str(label)
    }
}

/// What the next question should aim at, judged from the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guidance {
    SelfIntroduction,
    VerifyFundamentals,
    MoveToProjects,
    DeepAssessment,
}

impl Guidance {
    pub fn for_transcript(round: u32, turns: &[Turn]) -> Self {
        if round <= 1 {
            return Self::SelfIntroduction;
        }
        if !fundamentals_covered(turns) {
            Self::VerifyFundamentals
        } else if !projects_covered(turns) {
            Self::MoveToProjects
        } else {
            Self::DeepAssessment
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            Self::SelfIntroduction => {
                "This is the FIRST question: it must ask for a self-introduction. \
                 Do not ask about specific technologies or projects yet."
            }
            Self::VerifyFundamentals => {
                "Current priority: verify fundamentals.\n\
                 - Focus on the basic knowledge behind the job's core skills\n\
                 - Make sure the candidate has the necessary theory\n\
                 - Do not dig into project details yet unless the candidate raised them convincingly\n\
                 - Ask about essential concepts and technical principles for this role"
            }
            Self::MoveToProjects => {
                "Fundamentals have been checked; move to project experience.\n\
                 - Explore the candidate's projects in depth\n\
                 - Ask about implementation details, challenges and solutions\n\
                 - Verify how theory was applied in practice\n\
                 - Learn about concrete contributions and growth"
            }
            Self::DeepAssessment => {
                "Enter deep assessment.\n\
                 - Examine problem-solving approach\n\
                 - Assess learning ability and adaptability\n\
                 - Evaluate technical vision and potential\n\
                 - Or revisit earlier answers that lacked detail"
            }
        }
    }
}

fn transcript_text(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| t.content.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn distinct_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

fn fundamentals_covered(turns: &[Turn]) -> bool {
    turns.len() >= MIN_TURNS_FOR_FUNDAMENTALS
        && distinct_hits(&transcript_text(turns), FUNDAMENTALS_KEYWORDS) >= MIN_KEYWORD_HITS
}

fn projects_covered(turns: &[Turn]) -> bool {
    distinct_hits(&transcript_text(turns), PROJECT_KEYWORDS) >= MIN_KEYWORD_HITS
}

/// Short description of what has been discussed so far.
pub fn summarize_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "The interview is just starting; there is no history yet.".to_string();
    }

    let mut topics: Vec<String> = Vec::new();
    let mut add = |topic: &str| {
        if !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    };

    let categories: Vec<&str> = turns.iter().filter_map(|t| t.category.as_deref()).collect();
    if categories.is_empty() {
        for turn in turns.iter().filter(|t| t.role == Role::Interviewer) {
            let question = turn.content.to_lowercase();
            for keyword in TOPIC_KEYWORDS.iter().filter(|k| question.contains(*k)) {
                add(keyword);
            }
        }
    } else {
        for category in categories {
            add(category);
        }
    }

    if topics.is_empty() {
        "The history is unclear; start from the basics.".to_string()
    } else {
        topics.truncate(MAX_SUMMARY_TOPICS);
        format!("Topics already discussed: {}", topics.join(", "))
    }
}

/// A follow-up is asked only when the model wants one and the cap is not reached.
pub fn allow_follow_up(model_wants_follow_up: bool, follow_up_count: u32) -> bool {
    model_wants_follow_up && follow_up_count < MAX_CONSECUTIVE_FOLLOW_UPS
}
