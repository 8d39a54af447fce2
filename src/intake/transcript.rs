use serde::Serialize;

use super::session::Profile;

/// Labels shown, one at a time, while a question is "analyzed".
pub const PROCESSING_STEPS: [&str; 5] = [
    "Analyzing your career question...",
    "Filtering through career success patterns...",
    "Finding best suggestions for your specific situation...",
    "Polishing personalized insights...",
    "Finalizing recommendations...",
];

/// Example questions offered as one-click prompts on the question step.
pub const DEMO_QUESTIONS: [&str; 10] = [
    "How to transition from marketing to product?",
    "Skills for data scientist role?",
    "How to negotiate salary?",
    "MBA for tech career?",
    "Software to product management?",
    "Certifications for PM?",
    "Senior developer interview?",
    "Teacher to tech?",
    "Build portfolio?",
    "Ask for promotion?",
];

pub const GREETING: &str = "Hi! I'm LucidAI Career Assistant. Before we start, what's your name?";
pub const WELCOME_BACK: &str = "Welcome back! What career question would you like to ask?";
pub const LIMIT_EXCEEDED: &str = "LIMIT EXCEEDED. You have already submitted your career question.";
pub const NOT_CAREER_RELATED: &str =
    "This is not career-related. Please ask about jobs, skills, or career growth.";
pub const SUBMIT_FAILED: &str = "Error submitting question. Please try again.";
pub const FILE_TOO_LARGE: &str = "Maximum file size is 10MB.";
pub const FILE_ALREADY_STAGED: &str = "Please remove the current attachment before adding another one.";
pub const FILE_NOT_ALLOWED: &str = "Attachments can only be added before your question is sent.";
pub const UPLOAD_FAILED: &str = "The file could not be uploaded. Please try again.";
pub const ATTACHMENT_EXPIRED: &str = "Your attachment was removed after a period of inactivity. Please attach it again.";
pub const INPUT_CLOSED: &str = "Your question is already being processed.";
pub const THANK_YOU: &str = "Thank you for your question! Our experts will review it and provide \
                             personalized career guidance directly to your email.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Success => "success",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
        }
    }
}

/// File shown alongside a chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLabel {
    pub name: String,
    pub size_bytes: usize,
}

impl FileLabel {
    pub fn size_kb(&self) -> String {
        format!("{:.1} KB", self.size_bytes as f64 / 1024.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub kind: MessageKind,
    pub content: String,
    pub file: Option<FileLabel>,
}

impl ChatMessage {
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn user(&mut self, content: &str, file: Option<FileLabel>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            kind: MessageKind::Info,
            content: content.to_string(),
            file,
        });
    }

    pub fn assistant(&mut self, kind: MessageKind, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            kind,
            content: content.into(),
            file: None,
        });
    }

    pub fn info(&mut self, content: impl Into<String>) {
        self.assistant(MessageKind::Info, content);
    }

    pub fn error(&mut self, content: impl Into<String>) {
        self.assistant(MessageKind::Error, content);
    }

    /// Overwrite the newest assistant bubble in place (processing steps share a slot).
    pub fn replace_last(&mut self, kind: MessageKind, content: impl Into<String>) {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                last.kind = kind;
                last.content = content.into();
            }
            _ => self.assistant(kind, content),
        }
    }
}

pub fn ask_email(name: &str) -> String {
    format!("Nice to meet you, {name}! What's your email address? We'll send career guidance there.")
}

pub fn ask_current_role() -> String {
    "Great! Now, let's understand your career situation.\n\n\
     Current Role: What's your current job title or field?\n\
     (e.g., \"Software Engineer\", \"Marketing Manager\", \"Student\")"
        .to_string()
}

pub fn ask_target_role() -> String {
    "Target Role: What role are you aiming for?\n\
     (e.g., \"Product Manager\", \"Data Scientist\", \"Senior Developer\")"
        .to_string()
}

pub fn ask_experience() -> String {
    "Experience: How many years of experience do you have?\n\
     (e.g., \"2 years\", \"Entry-level\", \"10+ years\")"
        .to_string()
}

pub fn profile_complete(profile: &Profile) -> String {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();
    format!(
        "Profile complete!\n\nYour Info:\n\
         • Name: {}\n• Email: {}\n• Current: {}\n• Target: {}\n• Experience: {}\n\n\
         Now, what career question would you like to ask?",
        field(&profile.name),
        field(&profile.email),
        field(&profile.current_role),
        field(&profile.target_role),
        field(&profile.experience),
    )
}

pub fn already_submitted_to(email: Option<&str>) -> String {
    format!(
        "Our experts have received your question and will send personalized guidance to: {}",
        email.unwrap_or("your email")
    )
}

pub fn analysis_complete(question: &str, email: &str, reference: i64) -> String {
    format!(
        "AI Analysis Complete!\n\n\
         Your career question has been submitted:\n\"{question}\"\n\n\
         What happens next:\n\
         1. Our career experts review your specific situation\n\
         2. We create a personalized action plan\n\
         3. Final report will be sent to: {email}\n\
         4. Delivery within 24 hours\n\n\
         Status: In expert review queue\n\
         Reference ID: #{reference}"
    )
}

pub fn attached(name: &str) -> String {
    format!("Attached file: {name}")
}

pub fn removed(name: &str) -> String {
    format!("Removed attachment: {name}")
}
