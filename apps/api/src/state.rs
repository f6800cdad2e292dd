use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::interview::session::SessionStore;
use crate::job::JobDocument;
use crate::llm_client::ChatModel;
use crate::matching::MatchReport;
use crate::resume::ResumeDocument;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Chat backend. Production: `LlmClient`; tests swap in a scripted model.
    pub llm: Arc<dyn ChatModel>,
    /// Embedding backend. Hashing by default, HTTP when `EMBEDDING_API_URL` is set.
    pub embedder: Arc<dyn Embedder>,
    pub config: Config,
    pub workspace: Arc<RwLock<Workspace>>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(llm: Arc<dyn ChatModel>, embedder: Arc<dyn Embedder>, config: Config) -> Self {
        Self {
            llm,
            embedder,
            config,
            workspace: Arc::new(RwLock::new(Workspace::default())),
            sessions: Arc::new(SessionStore::default()),
        }
    }
}

/// Report together with the resume and job it was computed for.
#[derive(Debug, Clone)]
struct StoredMatch {
    resume_id: Uuid,
    job_id: Uuid,
    report: Arc<MatchReport>,
}

/// The single active resume, job and match report.
#[derive(Debug, Default)]
pub struct Workspace {
    resume: Option<Arc<ResumeDocument>>,
    job: Option<Arc<JobDocument>>,
    match_report: Option<StoredMatch>,
}

impl Workspace {
    /// Replaces the active resume; the match report no longer applies.
    pub fn set_resume(&mut self, resume: Arc<ResumeDocument>) {
        self.resume = Some(resume);
        self.match_report = None;
    }

    /// Replaces the active job; the match report no longer applies.
    pub fn set_job(&mut self, job: Arc<JobDocument>) {
        self.job = Some(job);
        self.match_report = None;
    }

    /// Stores a report if the resume and job it was computed for are still active.
    pub fn set_match_report(&mut self, resume_id: Uuid, job_id: Uuid, report: Arc<MatchReport>) {
        let current = self.resume.as_ref().map(|r| r.id) == Some(resume_id)
            && self.job.as_ref().map(|j| j.id) == Some(job_id);
        if current {
            info!("Match report stored (total_score={:.3})", report.total_score);
            self.match_report = Some(StoredMatch {
                resume_id,
                job_id,
                report,
            });
        } else {
            warn!("Discarding match report: resume or job changed during analysis");
        }
    }

    pub fn clear_match_report(&mut self) {
        self.match_report = None;
    }

    pub fn require_resume(&self) -> Result<Arc<ResumeDocument>, AppError> {
        self.resume
            .clone()
            .ok_or_else(|| AppError::Validation("Upload a resume first".to_string()))
    }

    pub fn require_job(&self) -> Result<Arc<JobDocument>, AppError> {
        self.job
            .clone()
            .ok_or_else(|| AppError::Validation("Load a job requirement first".to_string()))
    }

    pub fn require_match_report(&self) -> Result<Arc<MatchReport>, AppError> {
        self.match_report
            .as_ref()
            .filter(|m| {
                self.resume.as_ref().map(|r| r.id) == Some(m.resume_id)
                    && self.job.as_ref().map(|j| j.id) == Some(m.job_id)
            })
            .map(|m| Arc::clone(&m.report))
            .ok_or_else(|| AppError::Validation("Run the match analysis first".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::fixtures::{job, report, resume};

    #[tokio::test]
    async fn test_new_resume_clears_report() {
        let mut workspace = Workspace::default();
        let (r, j) = (Arc::new(resume().await), Arc::new(job().await));
        workspace.set_resume(r.clone());
        workspace.set_job(j.clone());
        workspace.set_match_report(r.id, j.id, Arc::new(report()));
        assert!(workspace.require_match_report().is_ok());

        workspace.set_resume(Arc::new(resume().await));
        assert!(matches!(
            workspace.require_match_report(),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_report_is_discarded() {
        let mut workspace = Workspace::default();
        let (r, j) = (Arc::new(resume().await), Arc::new(job().await));
        workspace.set_resume(r.clone());
        workspace.set_job(j);

        workspace.set_match_report(r.id, Uuid::new_v4(), Arc::new(report()));
        assert!(workspace.require_match_report().is_err());
    }

    #[test]
    fn test_requirements_without_documents() {
        let workspace = Workspace::default();
        assert!(workspace.require_resume().is_err());
        assert!(workspace.require_job().is_err());
        assert!(workspace.require_match_report().is_err());
    }
}
