use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::question::{self, Attachment, NewQuestion, Question};

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn insert(&self, new: &NewQuestion) -> Result<i64, AppError>;

    async fn attach_file(&self, id: i64, attachment: &Attachment) -> Result<(), AppError>;

    /// Every question, newest first.
    async fn list_recent_first(&self) -> Result<Vec<Question>, AppError>;

    /// Set the operator response and flip the status to answered.
    /// `Ok(None)` means there is no question with that id.
    async fn respond(&self, id: i64, response: &str) -> Result<Option<Question>, AppError>;

    async fn count_for_session_since(
        &self,
        session_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError>;
}

/// `QuestionStore` over the Postgres `questions` table.
#[derive(Clone)]
pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn insert(&self, new: &NewQuestion) -> Result<i64, AppError> {
        question::create(&self.pool, new).await
    }

    async fn attach_file(&self, id: i64, attachment: &Attachment) -> Result<(), AppError> {
        question::attach_file(&self.pool, id, attachment).await
    }

    async fn list_recent_first(&self) -> Result<Vec<Question>, AppError> {
        question::find_all(&self.pool).await
    }

    async fn respond(&self, id: i64, response: &str) -> Result<Option<Question>, AppError> {
        question::respond(&self.pool, id, response).await
    }

    async fn count_for_session_since(
        &self,
        session_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        question::count_for_session_since(&self.pool, session_id, since).await
    }
}
