use askama::Template;

use crate::models::question::{Attachment, Question, QuestionStatus};
use super::common::APP_NAME;

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub app_name: &'static str,
    pub error: Option<String>,
    pub csrf_token: String,
}

/// A question as listed on the admin page.
pub struct QuestionView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub current_role_field: String,
    pub target_role: String,
    pub years_experience: String,
    pub skills: String,
    pub question: String,
    pub is_pending: bool,
    pub status: &'static str,
    pub admin_response: String,
    pub attachment: Option<Attachment>,
    pub created_at: String,
    pub answered_at: String,
}

impl QuestionView {
    pub fn attachment_size_kb(&self) -> String {
        self.attachment
            .as_ref()
            .map(|a| format!("{:.1} KB", a.file_size as f64 / 1024.0))
            .unwrap_or_default()
    }
}

impl From<Question> for QuestionView {
    fn from(q: Question) -> Self {
        QuestionView {
            id: q.id,
            name: q.name,
            email: q.email,
            current_role_field: q.current_role_field,
            target_role: q.target_role,
            years_experience: q.years_experience,
            skills: q.skills.unwrap_or_default(),
            question: q.question,
            is_pending: q.status == QuestionStatus::Pending,
            status: q.status.as_str(),
            admin_response: q.admin_response.unwrap_or_default(),
            attachment: q.attachment,
            created_at: q.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            answered_at: q
                .answered_at
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/questions.html")]
pub struct AdminQuestionsTemplate {
    pub app_name: &'static str,
    pub csrf_token: String,
    pub flash: Option<String>,
    pub pending_count: usize,
    pub answered_count: usize,
    pub questions: Vec<QuestionView>,
}

impl AdminQuestionsTemplate {
    pub fn new(questions: Vec<Question>, csrf_token: String, flash: Option<String>) -> Self {
        let questions: Vec<QuestionView> = questions.into_iter().map(QuestionView::from).collect();
        let pending_count = questions.iter().filter(|q| q.is_pending).count();
        AdminQuestionsTemplate {
            app_name: APP_NAME,
            csrf_token,
            flash,
            pending_count,
            answered_count: questions.len() - pending_count,
            questions,
        }
    }
}
