use std::sync::Arc;
use std::time::Duration;

use crate::auth::validate;
use crate::errors::AppError;
use crate::services::{SubmissionClient, SubmissionRequest, SubmitFailure, Upload};
use super::phase::Phase;
use super::session::{Profile, SessionGuard, SessionState, SessionStore};
use super::transcript::{self as text, FileLabel, MessageKind, PROCESSING_STEPS, Transcript};

/// Largest attachment that can be staged (10 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// File waiting to be sent with the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StagedAttachment {
    pub fn label(&self) -> FileLabel {
        FileLabel {
            name: self.file_name.clone(),
            size_bytes: self.bytes.len(),
        }
    }

    fn to_upload(&self) -> Upload {
        Upload {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

impl From<Upload> for StagedAttachment {
    fn from(u: Upload) -> Self {
        StagedAttachment {
            file_name: u.file_name,
            content_type: u.content_type,
            bytes: u.bytes,
        }
    }
}

/// Live state of one browser's chat: where it is, what it has collected,
/// what it has shown.
#[derive(Debug, Clone)]
pub struct Conversation {
    session_id: String,
    phase: Phase,
    draft: Profile,
    transcript: Transcript,
    staged: Option<StagedAttachment>,
}

impl Conversation {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile(&self) -> &Profile {
        &self.draft
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn staged(&self) -> Option<&StagedAttachment> {
        self.staged.as_ref()
    }

    /// Drop a staged file that has waited too long. Returns whether one was dropped.
    pub(crate) fn expire_staged(&mut self) -> bool {
        if self.staged.take().is_none() {
            return false;
        }
        self.transcript.error(text::ATTACHMENT_EXPIRED);
        true
    }

    fn advance(&mut self) -> Result<(), AppError> {
        self.phase = self.phase.advance()?;
        Ok(())
    }

    fn retry(&mut self) -> Result<(), AppError> {
        self.phase = self.phase.retry()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Input refused without leaving the current phase (validation error,
    /// closed conversation, session already submitted).
    Rejected,
    /// Value recorded; the conversation moved to this phase.
    Advanced(Phase),
    /// The question was stored under this id.
    Submitted(i64),
    /// The submission call failed with this error code.
    SubmitFailed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Staged,
    TooLarge,
    AlreadyStaged,
    Closed,
    /// The upload itself failed before the file reached the conversation.
    Unreadable,
}

/// Drives the intake conversation. Holds no per-session state itself: each
/// call gets the [`Conversation`] and the browser's [`SessionStore`].
pub struct IntakeController {
    client: Arc<dyn SubmissionClient>,
    step_interval: Duration,
}

impl IntakeController {
    pub fn new(client: Arc<dyn SubmissionClient>, step_interval: Duration) -> Self {
        Self { client, step_interval }
    }

    /// Persisted state for this browser with expiry already applied.
    pub fn resume(&self, store: &dyn SessionStore) -> Result<SessionState, AppError> {
        SessionGuard::new(store).current()
    }

    /// Build the conversation a returning (or new) browser lands in.
    pub fn open(&self, state: &SessionState) -> Conversation {
        let mut transcript = Transcript::new();
        let draft = state.profile.clone().unwrap_or_default();

        let phase = if state.submitted {
            transcript.error(text::LIMIT_EXCEEDED);
            if let Some(profile) = &state.profile {
                transcript.info(text::already_submitted_to(profile.email.as_deref()));
                transcript.info(
                    "Thank you for using LucidAI Career Assistant. \
                     You cannot submit another question from this session.",
                );
            }
            Phase::Submitted
        } else if state.profile.as_ref().is_some_and(Profile::is_complete) {
            transcript.info(text::WELCOME_BACK);
            Phase::AskQuestion
        } else {
            transcript.info(text::GREETING);
            Phase::CollectName
        };

        Conversation {
            session_id: state.session_id.clone(),
            phase,
            draft,
            transcript,
            staged: None,
        }
    }

    /// Wipe the browser's state and start a brand-new conversation.
    pub fn reset(&self, store: &dyn SessionStore) -> Result<Conversation, AppError> {
        let state = SessionGuard::new(store).reset()?;
        Ok(self.open(&state))
    }

    /// Process one line of user input against the current phase.
    pub async fn handle_input(
        &self,
        conv: &mut Conversation,
        store: &dyn SessionStore,
        input: &str,
    ) -> Result<InputOutcome, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(InputOutcome::Ignored);
        }

        if !conv.phase.accepts_input() {
            if conv.phase == Phase::Submitted {
                conv.transcript.error(text::LIMIT_EXCEEDED);
            } else {
                conv.transcript.error(text::INPUT_CLOSED);
            }
            return Ok(InputOutcome::Rejected);
        }

        let file = match conv.phase {
            Phase::AskQuestion => conv.staged.as_ref().map(StagedAttachment::label),
            _ => None,
        };
        conv.transcript.user(input, file);

        match conv.phase {
            Phase::CollectName => {
                if let Some(err) = validate::validate_name(input) {
                    conv.transcript.error(err);
                    return Ok(InputOutcome::Rejected);
                }
                conv.draft.name = Some(input.to_string());
                conv.transcript.info(text::ask_email(input));
            }
            Phase::CollectEmail => {
                if let Some(err) = validate::validate_email(input) {
                    conv.transcript.error(err);
                    return Ok(InputOutcome::Rejected);
                }
                conv.draft.email = Some(validate::normalize_email(input));
                conv.transcript.info(text::ask_current_role());
            }
            Phase::CollectCareerCurrent => {
                conv.draft.current_role = Some(input.to_string());
                conv.transcript.info(text::ask_target_role());
            }
            Phase::CollectCareerTarget => {
                conv.draft.target_role = Some(input.to_string());
                conv.transcript.info(text::ask_experience());
            }
            Phase::CollectCareerExperience => {
                conv.draft.experience = Some(input.to_string());
                conv.transcript.info(text::profile_complete(&conv.draft));
                SessionGuard::new(store).save_profile(&conv.draft)?;
            }
            Phase::AskQuestion => return self.submit_question(conv, store, input).await,
            Phase::Processing | Phase::Submitted => return Ok(InputOutcome::Rejected),
        }

        conv.advance()?;
        Ok(InputOutcome::Advanced(conv.phase))
    }

    async fn submit_question(
        &self,
        conv: &mut Conversation,
        store: &dyn SessionStore,
        question: &str,
    ) -> Result<InputOutcome, AppError> {
        let guard = SessionGuard::new(store);

        // The session may have submitted from another tab since this
        // conversation was opened.
        if guard.is_submitted()? {
            conv.transcript.error(text::LIMIT_EXCEEDED);
            conv.phase = Phase::Submitted;
            return Ok(InputOutcome::Rejected);
        }

        conv.advance()?;
        self.play_processing(conv).await;

        let staged = conv.staged.take();
        let request = SubmissionRequest {
            name: conv.draft.name.clone().unwrap_or_default(),
            email: conv.draft.email.clone().unwrap_or_default(),
            current_role_field: conv.draft.current_role.clone().unwrap_or_default(),
            target_role: conv.draft.target_role.clone().unwrap_or_default(),
            years_experience: conv.draft.experience.clone().unwrap_or_default(),
            skills: String::new(),
            question: question.to_string(),
            session_id: Some(conv.session_id.clone()),
            file: staged.as_ref().map(StagedAttachment::to_upload),
        };

        match self.client.submit(request).await {
            Ok(receipt) => {
                guard.mark_submitted()?;
                let email = conv.draft.email.clone().unwrap_or_default();
                conv.transcript.replace_last(
                    MessageKind::Success,
                    text::analysis_complete(question, &email, receipt.id),
                );
                conv.transcript.info(text::THANK_YOU);
                conv.advance()?;
                log::info!("Session {} submitted question {}", conv.session_id, receipt.id);
                Ok(InputOutcome::Submitted(receipt.id))
            }
            Err(SubmitFailure::SessionLimitExceeded) => {
                guard.mark_submitted()?;
                conv.transcript.error(text::LIMIT_EXCEEDED);
                conv.advance()?;
                Ok(InputOutcome::SubmitFailed(SubmitFailure::SessionLimitExceeded.code()))
            }
            Err(failure) => {
                log::warn!("Submission for session {} failed: {failure}", conv.session_id);
                let message = match failure {
                    SubmitFailure::NotCareerRelated => text::NOT_CAREER_RELATED,
                    _ => text::SUBMIT_FAILED,
                };
                conv.transcript.error(message);
                conv.staged = staged;
                conv.retry()?;
                Ok(InputOutcome::SubmitFailed(failure.code()))
            }
        }
    }

    /// Show each processing label in the same bubble, pausing after each one.
    async fn play_processing(&self, conv: &mut Conversation) {
        for (i, step) in PROCESSING_STEPS.iter().enumerate() {
            if i == 0 {
                conv.transcript.info(*step);
            } else {
                conv.transcript.replace_last(MessageKind::Info, *step);
            }
            if !self.step_interval.is_zero() {
                tokio::time::sleep(self.step_interval).await;
            }
        }
    }

    /// Stage a file to go out with the question.
    pub fn stage_attachment(&self, conv: &mut Conversation, file: StagedAttachment) -> StageOutcome {
        if !conv.phase.accepts_input() {
            conv.transcript.error(text::FILE_NOT_ALLOWED);
            return StageOutcome::Closed;
        }
        if file.bytes.len() > MAX_ATTACHMENT_BYTES {
            conv.transcript.error(text::FILE_TOO_LARGE);
            return StageOutcome::TooLarge;
        }
        if conv.staged.is_some() {
            conv.transcript.assistant(MessageKind::Warning, text::FILE_ALREADY_STAGED);
            return StageOutcome::AlreadyStaged;
        }

        conv.transcript.info(text::attached(&file.file_name));
        conv.staged = Some(file);
        StageOutcome::Staged
    }

    /// Note a file the upload layer refused before it could be staged.
    pub fn reject_upload(&self, conv: &mut Conversation, too_large: bool) -> StageOutcome {
        if !conv.phase.accepts_input() {
            conv.transcript.error(text::FILE_NOT_ALLOWED);
            StageOutcome::Closed
        } else if too_large {
            conv.transcript.error(text::FILE_TOO_LARGE);
            StageOutcome::TooLarge
        } else {
            conv.transcript.error(text::UPLOAD_FAILED);
            StageOutcome::Unreadable
        }
    }

    /// Drop the staged file, if any. Returns whether one was removed.
    pub fn remove_attachment(&self, conv: &mut Conversation) -> bool {
        match conv.staged.take() {
            Some(file) => {
                conv.transcript.info(text::removed(&file.file_name));
                true
            }
            None => false,
        }
    }
}
