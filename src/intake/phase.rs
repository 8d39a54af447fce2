use std::fmt;

use serde::{Deserialize, Serialize};

/// Phases of the intake conversation, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CollectName,
    CollectEmail,
    CollectCareerCurrent,
    CollectCareerTarget,
    CollectCareerExperience,
    AskQuestion,
    Processing,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    /// `advance` from the terminal phase.
    AlreadySubmitted,
    /// `retry` is only defined out of `Processing`.
    NotProcessing(Phase),
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseError::AlreadySubmitted => write!(f, "conversation already submitted"),
            PhaseError::NotProcessing(p) => write!(f, "cannot return to ask_question from {}", p.as_str()),
        }
    }
}

impl std::error::Error for PhaseError {}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::CollectName,
        Phase::CollectEmail,
        Phase::CollectCareerCurrent,
        Phase::CollectCareerTarget,
        Phase::CollectCareerExperience,
        Phase::AskQuestion,
        Phase::Processing,
        Phase::Submitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::CollectName => "collect_name",
            Phase::CollectEmail => "collect_email",
            Phase::CollectCareerCurrent => "collect_career_current",
            Phase::CollectCareerTarget => "collect_career_target",
            Phase::CollectCareerExperience => "collect_career_experience",
            Phase::AskQuestion => "ask_question",
            Phase::Processing => "processing",
            Phase::Submitted => "submitted",
        }
    }

    /// The single forward transition.
    pub fn advance(self) -> Result<Phase, PhaseError> {
        let idx = self as usize;
        Phase::ALL
            .get(idx + 1)
            .copied()
            .ok_or(PhaseError::AlreadySubmitted)
    }

    /// The single backward transition: a failed submission goes back to the question.
    pub fn retry(self) -> Result<Phase, PhaseError> {
        match self {
            Phase::Processing => Ok(Phase::AskQuestion),
            other => Err(PhaseError::NotProcessing(other)),
        }
    }

    /// Whether free-text input is processed in this phase.
    pub fn accepts_input(&self) -> bool {
        *self < Phase::Processing
    }

    /// Progress header shown above the chat.
    pub fn progress_label(&self) -> &'static str {
        match self {
            Phase::CollectName => "Step 1 of 4: Your Name",
            Phase::CollectEmail => "Step 2 of 4: Email",
            Phase::CollectCareerCurrent
            | Phase::CollectCareerTarget
            | Phase::CollectCareerExperience => "Step 3 of 4: Career Info",
            Phase::AskQuestion => "Step 4 of 4: Ask Question",
            Phase::Processing => "AI Processing...",
            Phase::Submitted => "LIMIT EXCEEDED",
        }
    }

    /// Number of the four visible steps already completed.
    pub fn completed_steps(&self) -> usize {
        match self {
            Phase::CollectName => 0,
            Phase::CollectEmail => 1,
            Phase::CollectCareerCurrent
            | Phase::CollectCareerTarget
            | Phase::CollectCareerExperience => 2,
            Phase::AskQuestion => 3,
            Phase::Processing | Phase::Submitted => 4,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Phase::CollectName => "Enter your name...",
            Phase::CollectEmail => "Enter your email address...",
            Phase::CollectCareerCurrent => "Current role (e.g., Software Engineer)...",
            Phase::CollectCareerTarget => "Target role (e.g., Product Manager)...",
            Phase::CollectCareerExperience => "Years of experience (e.g., 3 years)...",
            Phase::AskQuestion => "Ask your career question...",
            Phase::Processing => "AI is analyzing your question...",
            Phase::Submitted => "LIMIT EXCEEDED",
        }
    }
}
