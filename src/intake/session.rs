//! Per-browser intake state and the guard that enforces one submission per
//! session.
//!
//! The state lives in the browser's encrypted session cookie under a single
//! key, so it survives reloads and server restarts and is scoped to one
//! browser. Everything goes through [`SessionStore`], which lets the
//! controller run against an in-memory store in tests.

use actix_session::Session;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const STATE_KEY: &str = "intake";

/// A submitted session may not submit again until this much time has passed
/// since its first submission.
pub fn submission_window() -> Duration {
    Duration::hours(24)
}

/// Requester details, filled in one conversation step at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub current_role: Option<String>,
    pub target_role: Option<String>,
    pub experience: Option<String>,
}

impl Profile {
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.email.is_some()
            && self.current_role.is_some()
            && self.target_role.is_some()
            && self.experience.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    /// Set once the conversation first reaches the question step.
    pub profile: Option<Profile>,
    pub submitted: bool,
    pub first_submission_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn fresh() -> Self {
        Self {
            session_id: new_session_id(),
            profile: None,
            submitted: false,
            first_submission_at: None,
        }
    }

    /// More than 24 hours since the first submission. Never true without one.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.first_submission_at {
            Some(first) => now - first > submission_window(),
            None => false,
        }
    }
}

/// `session_<unix millis>_<9 base36 chars>`
pub fn new_session_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Where a browser's [`SessionState`] is persisted.
pub trait SessionStore {
    fn load(&self) -> Result<Option<SessionState>, AppError>;
    fn save(&self, state: &SessionState) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

impl SessionStore for Session {
    fn load(&self) -> Result<Option<SessionState>, AppError> {
        match self.get::<SessionState>(STATE_KEY) {
            Ok(state) => Ok(state),
            Err(e) => {
                // An unreadable value is treated like a missing one; the
                // browser simply starts over.
                log::warn!("Discarding unreadable intake session state: {e}");
                self.remove(STATE_KEY);
                Ok(None)
            }
        }
    }

    fn save(&self, state: &SessionState) -> Result<(), AppError> {
        self.insert(STATE_KEY, state)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.remove(STATE_KEY);
        Ok(())
    }
}

/// Read/write view over a [`SessionStore`] implementing the one-submission rule.
pub struct SessionGuard<'a> {
    store: &'a dyn SessionStore,
}

impl<'a> SessionGuard<'a> {
    pub fn new(store: &'a dyn SessionStore) -> Self {
        Self { store }
    }

    /// The persisted state, initialising a fresh one on first visit.
    pub fn state(&self) -> Result<SessionState, AppError> {
        if let Some(state) = self.store.load()? {
            return Ok(state);
        }
        let state = SessionState::fresh();
        self.store.save(&state)?;
        log::debug!("Started intake session {}", state.session_id);
        Ok(state)
    }

    pub fn is_submitted(&self) -> Result<bool, AppError> {
        Ok(self.state()?.submitted)
    }

    /// Set the submitted flag; the first-submission time is only set once.
    pub fn mark_submitted(&self) -> Result<SessionState, AppError> {
        let mut state = self.state()?;
        state.submitted = true;
        state.first_submission_at.get_or_insert_with(Utc::now);
        self.store.save(&state)?;
        Ok(state)
    }

    pub fn is_expired(&self) -> Result<bool, AppError> {
        Ok(self.state()?.is_expired_at(Utc::now()))
    }

    /// Drop everything and start over with a new session id.
    pub fn reset(&self) -> Result<SessionState, AppError> {
        self.store.clear()?;
        let state = SessionState::fresh();
        self.store.save(&state)?;
        log::info!("Intake session reset, new session {}", state.session_id);
        Ok(state)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let mut state = self.state()?;
        state.profile = Some(profile.clone());
        self.store.save(&state)
    }

    /// Current state after applying expiry: a submitted session whose window
    /// has passed is reset before anything else looks at it.
    pub fn current(&self) -> Result<SessionState, AppError> {
        let state = self.state()?;
        if state.submitted && state.is_expired_at(Utc::now()) {
            log::info!("Submission window for {} expired", state.session_id);
            return self.reset();
        }
        Ok(state)
    }
}
