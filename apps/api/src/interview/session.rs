//! Interview sessions: transcript, counters and the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::errors::AppError;
use crate::interview::generator::GeneratedQuestion;
use crate::resume::profile::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Interviewer,
    Candidate,
}

/// One message of the transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Question category reported by the generator; `None` for answers.
    pub category: Option<String>,
    pub is_follow_up: bool,
    pub asked_at: DateTime<Utc>,
}

/// Candidate profile enriched with the match outcome and target job.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSnapshot {
    #[serde(flatten)]
    pub profile: CandidateProfile,
    pub match_score: f64,
    pub match_level: String,
    pub job_title: String,
}

#[derive(Debug, Clone)]
pub struct InterviewSession {
    pub session_id: String,
    pub candidate: CandidateSnapshot,
    pub turns: Vec<Turn>,
    pub question_count: u32,
    /// Consecutive follow-ups on the current topic.
    pub follow_up_count: u32,
    pub current_is_follow_up: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(session_id: String, candidate: CandidateSnapshot) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            candidate,
            turns: Vec::new(),
            question_count: 0,
            follow_up_count: 0,
            current_is_follow_up: false,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn record_question(&mut self, question: &GeneratedQuestion, is_follow_up: bool) {
        let category = Some(question.category.clone()).filter(|c| !c.trim().is_empty());
        self.push(Role::Interviewer, question.question.clone(), category, is_follow_up);
        self.current_is_follow_up = is_follow_up;
    }

    pub fn record_answer(&mut self, answer: &str) {
        self.push(Role::Candidate, answer.to_string(), None, false);
    }

    fn push(&mut self, role: Role, content: String, category: Option<String>, is_follow_up: bool) {
        let now = Utc::now();
        self.turns.push(Turn {
            role,
            content,
            category,
            is_follow_up,
            asked_at: now,
        });
        self.last_activity = now;
    }

    /// Most recent interviewer question, or "" before the first one.
    pub fn last_question(&self) -> &str {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Interviewer)
            .map(|t| t.content.as_str())
            .unwrap_or_default()
    }

    pub fn answer_count(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::Candidate).count()
    }
}

/// One stored session. `turn` serializes answers while the LLM runs; `committed`
/// is only locked for the copy in and the write back, so readers never wait on a
/// turn in progress.
#[derive(Debug)]
pub struct SessionEntry {
    turn: Mutex<()>,
    committed: RwLock<InterviewSession>,
}

impl SessionEntry {
    fn new(session: InterviewSession) -> Self {
        Self {
            turn: Mutex::new(()),
            committed: RwLock::new(session),
        }
    }

    /// Waits for any other turn on this session to finish.
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// Copy of the last committed state.
    pub async fn snapshot(&self) -> InterviewSession {
        self.committed.read().await.clone()
    }

    /// Replaces the committed state. Call while holding the turn guard.
    pub async fn commit(&self, session: InterviewSession) {
        *self.committed.write().await = session;
    }
}

/// Active sessions by id. Answers to one session run one at a time while other
/// sessions proceed; history and listing read committed state only.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionEntry>>>,
}

impl SessionStore {
    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Inserts a new session; fails with `Conflict` if the id is taken.
    pub async fn insert(&self, session: InterviewSession) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.session_id) {
            return Err(duplicate(&session.session_id));
        }
        sessions.insert(session.session_id.clone(), Arc::new(SessionEntry::new(session)));
        Ok(())
    }

    pub async fn get(&self, session_id: &str) -> Result<Arc<SessionEntry>, AppError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| not_found(session_id))
    }

    pub async fn remove(&self, session_id: &str) -> Result<InterviewSession, AppError> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| not_found(session_id))?;
        Ok(entry.snapshot().await)
    }

    /// Committed state of every session, ordered by creation time.
    pub async fn list(&self) -> Vec<InterviewSession> {
        let entries: Vec<_> = self.sessions.read().await.values().cloned().collect();
        let mut sessions = Vec::with_capacity(entries.len());
        for entry in entries {
            sessions.push(entry.snapshot().await);
        }
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        sessions
    }
}

pub(crate) fn duplicate(session_id: &str) -> AppError {
    AppError::Conflict(format!("Session '{session_id}' already exists"))
}

fn not_found(session_id: &str) -> AppError {
    AppError::NotFound(format!("Interview session '{session_id}' not found"))
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::fixtures::{question, snapshot};
    use super::*;

    #[test]
    fn test_record_turns_and_last_question() {
        let mut session = InterviewSession::new("s1".to_string(), snapshot());
        assert_eq!(session.last_question(), "");

        session.record_question(&question("Introduce yourself", "Opening"), false);
        session.record_answer("I build robots");
        session.record_question(&question("Which robots?", ""), true);

        assert_eq!(session.last_question(), "Which robots?");
        assert_eq!(session.answer_count(), 1);
        assert!(session.current_is_follow_up);
        assert_eq!(session.turns[0].category.as_deref(), Some("Opening"));
        assert!(session.turns[2].category.is_none());
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let value = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(value["name"], "Candidate");
        assert_eq!(value["job_title"], "AI Algorithm Engineer");
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_ids() {
        let store = SessionStore::default();
        store
            .insert(InterviewSession::new("s1".to_string(), snapshot()))
            .await
            .unwrap();
        let err = store
            .insert(InterviewSession::new("s1".to_string(), snapshot()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_store_remove_and_missing() {
        let store = SessionStore::default();
        store
            .insert(InterviewSession::new("s1".to_string(), snapshot()))
            .await
            .unwrap();

        assert_eq!(store.list().await.len(), 1);
        assert_eq!(store.remove("s1").await.unwrap().session_id, "s1");
        assert!(!store.contains("s1").await);
        assert!(matches!(
            store.get("s1").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_reads_do_not_wait_for_a_turn_in_progress() {
        let store = SessionStore::default();
        store
            .insert(InterviewSession::new("s1".to_string(), snapshot()))
            .await
            .unwrap();
        let entry = store.get("s1").await.unwrap();

        let _turn = entry.begin_turn().await;
        let listed = tokio::time::timeout(Duration::from_secs(1), store.list())
            .await
            .expect("list blocked behind the turn");
        assert_eq!(listed.len(), 1);
        let read = tokio::time::timeout(Duration::from_secs(1), entry.snapshot())
            .await
            .expect("snapshot blocked behind the turn");
        assert_eq!(read.session_id, "s1");
        assert!(entry.turn.try_lock().is_err());
    }

    #[tokio::test]
    async fn test_commit_is_visible_to_readers() {
        let store = SessionStore::default();
        store
            .insert(InterviewSession::new("s1".to_string(), snapshot()))
            .await
            .unwrap();
        let entry = store.get("s1").await.unwrap();

        let _turn = entry.begin_turn().await;
        let mut updated = entry.snapshot().await;
        updated.record_question(&question("Introduce yourself", "Opening"), false);
        assert!(store.list().await[0].turns.is_empty());

        entry.commit(updated).await;
        assert_eq!(store.list().await[0].turns.len(), 1);
    }
}
