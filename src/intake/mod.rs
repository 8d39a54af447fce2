//! The chat-style intake conversation.
//!
//! A fixed sequence of phases collects the requester profile and then one
//! question. [`session`] holds what the browser keeps between visits,
//! [`controller`] drives the phases, [`registry`] keeps live conversations
//! between requests, and [`transcript`] is what gets rendered.

pub mod controller;
pub mod phase;
pub mod registry;
pub mod session;
pub mod transcript;

pub use controller::{
    Conversation, InputOutcome, IntakeController, MAX_ATTACHMENT_BYTES, StageOutcome, StagedAttachment,
};
pub use phase::Phase;
pub use registry::ConversationRegistry;
pub use session::{Profile, SessionGuard, SessionState, SessionStore};
