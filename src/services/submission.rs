use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::auth::validate;
use crate::intake::session::submission_window;
use crate::models::question::{Attachment, NewQuestion};
use crate::storage::{BlobStore, QuestionStore, blobs::attachment_key};
use super::topic::TopicFilter;

/// A file sent with a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Everything a requester sends in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub name: String,
    pub email: String,
    pub current_role_field: String,
    pub target_role: String,
    pub years_experience: String,
    pub skills: String,
    pub question: String,
    pub session_id: Option<String>,
    pub file: Option<Upload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub id: i64,
    /// Whether the request carried a file at all.
    pub had_file: bool,
    /// The stored attachment; `None` when there was no file or storing it failed.
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    Invalid(Vec<String>),
    NotCareerRelated,
    SessionLimitExceeded,
    Failed,
}

impl SubmitFailure {
    /// Error code carried in the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            SubmitFailure::Invalid(_) => "invalid_submission",
            SubmitFailure::NotCareerRelated => "not_career_related",
            SubmitFailure::SessionLimitExceeded => "session_limit_exceeded",
            SubmitFailure::Failed => "submission_failed",
        }
    }
}

impl fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitFailure::Invalid(errors) => write!(f, "invalid submission: {}", errors.join("; ")),
            other => f.write_str(other.code()),
        }
    }
}

/// The submission contract the intake conversation calls.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionReceipt, SubmitFailure>;
}

/// Validates and persists new questions and their attachments.
pub struct SubmissionService {
    questions: Arc<dyn QuestionStore>,
    blobs: Arc<dyn BlobStore>,
    topics: TopicFilter,
}

impl SubmissionService {
    pub fn new(questions: Arc<dyn QuestionStore>, blobs: Arc<dyn BlobStore>, topics: TopicFilter) -> Self {
        Self { questions, blobs, topics }
    }

    fn validate(request: &SubmissionRequest) -> Vec<String> {
        let mut errors = vec![];
        errors.extend(validate::validate_required(&request.name, "Name"));
        errors.extend(validate::validate_email(&request.email));
        errors.extend(validate::validate_required(&request.question, "Question"));
        errors
    }

    async fn within_session_limit(&self, session_id: &str) -> Result<bool, SubmitFailure> {
        let since = Utc::now() - submission_window();
        match self.questions.count_for_session_since(session_id, since).await {
            Ok(count) => Ok(count == 0),
            Err(e) => {
                log::error!("Session limit lookup for {session_id} failed: {e}");
                Err(SubmitFailure::Failed)
            }
        }
    }

    /// Store the file and link it to the question. Any failure here is logged
    /// and swallowed: the question itself is already saved.
    async fn store_attachment(&self, question_id: i64, upload: &Upload) -> Option<Attachment> {
        let key = attachment_key(question_id, &upload.file_name, Utc::now().timestamp_millis());
        log::info!(
            "Uploading attachment for question {question_id}: {} ({} bytes) as {key}",
            upload.file_name,
            upload.bytes.len()
        );

        let file_url = match self.blobs.put(&key, &upload.bytes, &upload.content_type).await {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Attachment upload for question {question_id} failed, continuing without file: {e}");
                return None;
            }
        };

        let attachment = Attachment {
            file_name: upload.file_name.clone(),
            file_type: upload.content_type.clone(),
            file_size: upload.bytes.len() as i64,
            file_url,
        };

        match self.questions.attach_file(question_id, &attachment).await {
            Ok(()) => Some(attachment),
            Err(e) => {
                log::warn!("Linking attachment to question {question_id} failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl SubmissionClient for SubmissionService {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionReceipt, SubmitFailure> {
        let errors = Self::validate(&request);
        if !errors.is_empty() {
            log::info!("Rejected submission: {}", errors.join("; "));
            return Err(SubmitFailure::Invalid(errors));
        }

        if !self.topics.is_career_related(&request.question) {
            log::info!("Rejected off-topic question ({} chars)", request.question.len());
            return Err(SubmitFailure::NotCareerRelated);
        }

        let session_id = request
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        if let Some(sid) = &session_id {
            if !self.within_session_limit(sid).await? {
                log::info!("Session {sid} already submitted within the window");
                return Err(SubmitFailure::SessionLimitExceeded);
            }
        }

        let skills = request.skills.trim();
        let new = NewQuestion {
            name: request.name.trim().to_string(),
            email: validate::normalize_email(&request.email),
            current_role_field: request.current_role_field.trim().to_string(),
            target_role: request.target_role.trim().to_string(),
            years_experience: request.years_experience.trim().to_string(),
            skills: (!skills.is_empty()).then(|| skills.to_string()),
            question: request.question.trim().to_string(),
            session_id,
        };

        let id = match self.questions.insert(&new).await {
            Ok(id) => id,
            Err(e) => {
                log::error!("Saving question failed: {e}");
                return Err(SubmitFailure::Failed);
            }
        };
        log::info!("Question {id} saved");

        let had_file = request.file.is_some();
        let attachment = match &request.file {
            Some(upload) if !upload.bytes.is_empty() => self.store_attachment(id, upload).await,
            _ => None,
        };

        Ok(SubmissionReceipt { id, had_file, attachment })
    }
}
