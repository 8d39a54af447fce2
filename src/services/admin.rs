use std::sync::Arc;

use crate::auth::admin::AdminSecret;
use crate::errors::AppError;
use crate::models::question::Question;
use crate::storage::QuestionStore;

/// Password-gated operator access to submitted questions.
pub struct AdminService {
    questions: Arc<dyn QuestionStore>,
    secret: AdminSecret,
}

impl AdminService {
    pub fn new(questions: Arc<dyn QuestionStore>, secret: AdminSecret) -> Self {
        Self { questions, secret }
    }

    pub fn verify(&self, password: &str) -> bool {
        self.secret.verify(password)
    }

    fn authorize(&self, password: &str) -> Result<(), AppError> {
        if self.secret.verify(password) {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// All questions, most recent first.
    pub async fn list(&self, password: &str) -> Result<Vec<Question>, AppError> {
        self.authorize(password)?;
        self.questions.list_recent_first().await
    }

    /// Save an operator response. Re-answering overwrites the earlier response
    /// and restamps the answer time.
    pub async fn respond(&self, id: i64, response: &str, password: &str) -> Result<Question, AppError> {
        self.authorize(password)?;

        if response.trim().is_empty() {
            return Err(AppError::Validation("Response is required".to_string()));
        }

        let updated = self
            .questions
            .respond(id, response.trim())
            .await?
            .ok_or(AppError::NotFound)?;
        log::info!("Question {id} answered");
        Ok(updated)
    }
}
