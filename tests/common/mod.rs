//! Shared test infrastructure.
//!
//! In-memory versions of every persistence seam, so services, the intake
//! controller and the HTTP layer can be exercised without Postgres:
//! - `MemoryQuestionStore` - the questions table
//! - `MemoryBlobStore` / `FailingBlobStore` - attachment storage
//! - `MemorySessionStore` - the browser's session cookie
//! - `ScriptedClient` - a submission backend with canned answers
//!
//! `setup_test_db()` connects to a real database when `TEST_DATABASE_URL` is set.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use careerdesk::db::{self, DbPool};
use careerdesk::errors::AppError;
use careerdesk::intake::{SessionState, SessionStore};
use careerdesk::models::question::{Attachment, NewQuestion, Question, QuestionStatus};
use careerdesk::services::{SubmissionClient, SubmissionReceipt, SubmissionRequest, SubmitFailure};
use careerdesk::storage::{BlobStore, QuestionStore};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_PASS: &str = "admin123";
pub const TEST_EMAIL: &str = "jane@example.com";
pub const TEST_QUESTION: &str = "How do I move into product management?";

// ============================================================================
// QUESTION STORE
// ============================================================================

#[derive(Default)]
pub struct MemoryQuestionStore {
    rows: Mutex<Vec<Question>>,
    fail_writes: AtomicBool,
}

impl MemoryQuestionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every insert fail with a database-style error.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<Question> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, id: i64) -> Option<Question> {
        self.rows.lock().unwrap().iter().find(|q| q.id == id).cloned()
    }

    /// Move a row's creation time, e.g. to put it outside the 24h window.
    pub fn backdate(&self, id: i64, created_at: DateTime<Utc>) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(q) = rows.iter_mut().find(|q| q.id == id) {
            q.created_at = created_at;
        }
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn insert(&self, new: &NewQuestion) -> Result<i64, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("insert refused".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(Question {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            current_role_field: new.current_role_field.clone(),
            target_role: new.target_role.clone(),
            years_experience: new.years_experience.clone(),
            skills: new.skills.clone(),
            question: new.question.clone(),
            session_id: new.session_id.clone(),
            status: QuestionStatus::Pending,
            admin_response: None,
            attachment: None,
            created_at: Utc::now(),
            answered_at: None,
        });
        Ok(id)
    }

    async fn attach_file(&self, id: i64, attachment: &Attachment) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let q = rows.iter_mut().find(|q| q.id == id).ok_or(AppError::NotFound)?;
        q.attachment = Some(attachment.clone());
        Ok(())
    }

    async fn list_recent_first(&self) -> Result<Vec<Question>, AppError> {
        let mut rows = self.all();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn respond(&self, id: i64, response: &str) -> Result<Option<Question>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|q| q.id == id).map(|q| {
            q.admin_response = Some(response.to_string());
            q.status = QuestionStatus::Answered;
            q.answered_at = Some(Utc::now());
            q.clone()
        }))
    }

    async fn count_for_session_since(
        &self,
        session_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|q| q.session_id.as_deref() == Some(session_id) && q.created_at >= since)
            .count() as i64)
    }
}

// ============================================================================
// BLOB STORES
// ============================================================================

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<Vec<(String, Vec<u8>, String)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stored `(key, bytes, content_type)` triples in upload order.
    pub fn stored(&self) -> Vec<(String, Vec<u8>, String)> {
        self.blobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, AppError> {
        self.blobs
            .lock()
            .unwrap()
            .push((key.to_string(), bytes.to_vec(), content_type.to_string()));
        Ok(format!("http://files.test/files/{key}"))
    }
}

pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(&self, _key: &str, _bytes: &[u8], _content_type: &str) -> Result<String, AppError> {
        Err(AppError::Storage("bucket unavailable".to_string()))
    }
}

// ============================================================================
// SESSION STORE
// ============================================================================

#[derive(Default)]
pub struct MemorySessionStore {
    state: Mutex<Option<SessionState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<SessionState> {
        self.state.lock().unwrap().clone()
    }

    pub fn put(&self, state: SessionState) {
        *self.state.lock().unwrap() = Some(state);
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionState>, AppError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &SessionState) -> Result<(), AppError> {
        self.put(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.state.lock().unwrap() = None;
        Ok(())
    }
}

// ============================================================================
// SUBMISSION CLIENT
// ============================================================================

/// Records every request and answers from a queue of canned results.
/// With an empty queue each call succeeds with the next id.
#[derive(Default)]
pub struct ScriptedClient {
    answers: Mutex<VecDeque<Result<SubmissionReceipt, SubmitFailure>>>,
    calls: Mutex<Vec<SubmissionRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer_with(&self, result: Result<SubmissionReceipt, SubmitFailure>) {
        self.answers.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<SubmissionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionClient for ScriptedClient {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionReceipt, SubmitFailure> {
        let had_file = request.file.is_some();
        let mut calls = self.calls.lock().unwrap();
        calls.push(request);
        let next_id = calls.len() as i64;
        drop(calls);

        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SubmissionReceipt { id: next_id, had_file, attachment: None }))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// A fresh, empty directory that is removed when the guard drops.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

pub fn request(name: &str, email: &str, question: &str) -> SubmissionRequest {
    SubmissionRequest {
        name: name.to_string(),
        email: email.to_string(),
        current_role_field: "Software Engineer".to_string(),
        target_role: "Product Manager".to_string(),
        years_experience: "5 years".to_string(),
        question: question.to_string(),
        ..Default::default()
    }
}

// ============================================================================
// DATABASE SETUP
// ============================================================================

/// Connect to `TEST_DATABASE_URL` and run migrations. `None` when the
/// variable is not set, so database tests skip on machines without Postgres.
pub async fn setup_test_db() -> Option<DbPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = db::init_pool(&url).await.expect("Failed to connect to test database");
    db::run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}
