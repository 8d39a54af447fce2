use askama::Template;

use crate::intake::transcript::{ChatMessage, DEMO_QUESTIONS, FileLabel};
use crate::intake::{Conversation, Phase};
use super::common::APP_NAME;

const VISIBLE_STEPS: [&str; 4] = ["Name", "Email", "Career Info", "Question"];

pub struct MessageView {
    pub is_user: bool,
    pub kind: &'static str,
    pub content: String,
    pub file: Option<FileLabel>,
}

impl From<&ChatMessage> for MessageView {
    fn from(m: &ChatMessage) -> Self {
        MessageView {
            is_user: m.is_user(),
            kind: m.kind.as_str(),
            content: m.content.clone(),
            file: m.file.clone(),
        }
    }
}

pub struct StepView {
    pub label: &'static str,
    /// "done", "active" or "todo"
    pub state: &'static str,
}

#[derive(Template)]
#[template(path = "ask.html")]
pub struct AskTemplate {
    pub app_name: &'static str,
    pub csrf_token: String,
    pub phase: &'static str,
    pub progress_label: &'static str,
    pub placeholder: &'static str,
    pub input_enabled: bool,
    pub limit_label: &'static str,
    pub user_name: Option<String>,
    pub messages: Vec<MessageView>,
    pub steps: Vec<StepView>,
    pub staged: Option<FileLabel>,
    pub demo_questions: Vec<&'static str>,
}

impl AskTemplate {
    pub fn new(conv: &Conversation, csrf_token: String) -> Self {
        let phase = conv.phase();
        let done = phase.completed_steps();
        let steps = VISIBLE_STEPS
            .iter()
            .enumerate()
            .map(|(i, label)| StepView {
                label: *label,
                state: if i < done {
                    "done"
                } else if i == done {
                    "active"
                } else {
                    "todo"
                },
            })
            .collect();

        AskTemplate {
            app_name: APP_NAME,
            csrf_token,
            phase: phase.as_str(),
            progress_label: phase.progress_label(),
            placeholder: phase.placeholder(),
            input_enabled: phase.accepts_input(),
            limit_label: if phase == Phase::Submitted { "LIMIT EXCEEDED" } else { "0/1" },
            user_name: conv.profile().name.clone(),
            messages: conv.transcript().messages().iter().map(MessageView::from).collect(),
            steps,
            staged: conv.staged().map(|s| s.label()),
            demo_questions: if phase == Phase::AskQuestion {
                DEMO_QUESTIONS.to_vec()
            } else {
                vec![]
            },
        }
    }
}
