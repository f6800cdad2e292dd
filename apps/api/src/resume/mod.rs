// Resume ingestion: PDF text extraction, LLM structuring, retrieval index.

pub mod document;
pub mod handlers;
pub mod profile;
pub mod prompts;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::embedding::{Embedder, EmbeddingError};
use crate::llm_client::ChatModel;
use crate::resume::profile::{analyze_resume, CandidateProfile};
use crate::retrieval::{TextSplitter, VectorIndex};

const SUMMARY_CHARS: usize = 500;

/// The active resume: raw text, structured profile and its chunk index.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub id: Uuid,
    pub file_name: String,
    pub text: String,
    pub profile: CandidateProfile,
    pub index: VectorIndex,
    pub uploaded_at: DateTime<Utc>,
}

impl ResumeDocument {
    /// Structures the text with the LLM and indexes it for retrieval.
    pub async fn ingest(
        file_name: String,
        text: String,
        llm: &dyn ChatModel,
        embedder: &dyn Embedder,
    ) -> Result<Self, EmbeddingError> {
        let profile = analyze_resume(&text, llm).await;
        let index = VectorIndex::build(&text, &TextSplitter::for_resume(), embedder).await?;
        info!(
            "Resume '{}' ingested: candidate={}, chunks={}",
            file_name,
            profile.name,
            index.len()
        );

        Ok(Self {
            id: Uuid::new_v4(),
            file_name,
            text,
            profile,
            index,
            uploaded_at: Utc::now(),
        })
    }

    /// First 500 characters of the resume, with an ellipsis when truncated.
    pub fn summary(&self) -> String {
        summarize(&self.text)
    }
}

fn summarize(text: &str) -> String {
    if text.chars().count() > SUMMARY_CHARS {
        let head: String = text.chars().take(SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::llm_client::testing::ScriptedChatModel;

    #[test]
    fn test_summary_truncates_long_text() {
        let long = "x".repeat(600);
        let summary = summarize(&long);
        assert_eq!(summary.chars().count(), 503);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_summary_keeps_short_text() {
        assert_eq!(summarize("short resume"), "short resume");
    }

    #[tokio::test]
    async fn test_ingest_builds_profile_and_index() {
        let llm = ScriptedChatModel::new([r#"{"name": "Jane Doe", "skills": "Rust"}"#]);
        let doc = ResumeDocument::ingest(
            "jane.pdf".to_string(),
            "Jane Doe\n\nRust engineer building storage systems.".to_string(),
            &llm,
            &HashingEmbedder::default(),
        )
        .await
        .unwrap();

        assert_eq!(doc.profile.name, "Jane Doe");
        assert_eq!(doc.index.len(), 1);
        assert_eq!(doc.file_name, "jane.pdf");
    }
}
