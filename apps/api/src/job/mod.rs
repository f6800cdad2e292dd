// Job requirement ingestion: LLM structuring and retrieval index.

pub mod handlers;
pub mod profile;
pub mod prompts;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::job::profile::{analyze_job, JobProfile};
use crate::llm_client::ChatModel;
use crate::retrieval::{TextSplitter, VectorIndex};

/// The active job posting: raw text, structured profile and its chunk index.
#[derive(Debug, Clone)]
pub struct JobDocument {
    pub id: Uuid,
    pub text: String,
    pub profile: JobProfile,
    pub summary: String,
    pub index: VectorIndex,
    pub loaded_at: DateTime<Utc>,
}

impl JobDocument {
    /// Structures the posting and indexes it. LLM failures are surfaced,
    /// unlike resume ingestion which degrades to a placeholder.
    pub async fn ingest(
        text: String,
        llm: &dyn ChatModel,
        embedder: &dyn Embedder,
    ) -> Result<Self, AppError> {
        let profile = analyze_job(&text, llm).await?;
        let index = VectorIndex::build(&text, &TextSplitter::for_job(), embedder).await?;
        let summary = profile.summary();
        info!(
            "Job '{}' ingested: chunks={}",
            profile.display_title(),
            index.len()
        );

        Ok(Self {
            id: Uuid::new_v4(),
            text,
            profile,
            summary,
            index,
            loaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::job::profile::DEFAULT_JOB_DESCRIPTION;
    use crate::llm_client::testing::ScriptedChatModel;

    #[tokio::test]
    async fn test_ingest_default_description_splits_into_chunks() {
        let llm = ScriptedChatModel::new([
            r#"{"job_title": "AI Algorithm Engineer", "company": "Horizon Robotics Lab"}"#,
        ]);
        let doc = JobDocument::ingest(
            DEFAULT_JOB_DESCRIPTION.to_string(),
            &llm,
            &HashingEmbedder::default(),
        )
        .await
        .unwrap();

        assert!(doc.index.len() > 1);
        assert!(doc.summary.starts_with("Position: AI Algorithm Engineer"));
        assert!(llm.prompts()[0].contains("Horizon Robotics Lab"));
    }

    #[tokio::test]
    async fn test_ingest_fails_when_llm_fails() {
        let llm = ScriptedChatModel::default();
        llm.push_failure("overloaded");
        let result =
            JobDocument::ingest("posting".to_string(), &llm, &HashingEmbedder::default()).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}
