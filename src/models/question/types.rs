use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a submitted question. Only ever moves pending -> answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Pending,
    Answered,
}

impl QuestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::Answered => "answered",
        }
    }

    /// Column value to status. The table constrains the column, so anything
    /// unexpected is treated as not yet answered.
    pub fn from_db(value: &str) -> Self {
        match value {
            "answered" => QuestionStatus::Answered,
            _ => QuestionStatus::Pending,
        }
    }
}

/// Stored file linked to a question. The four columns are all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_url: String,
}

/// One submitted career question, as returned to operators.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub current_role_field: String,
    pub target_role: String,
    pub years_experience: String,
    pub skills: Option<String>,
    pub question: String,
    pub session_id: Option<String>,
    pub status: QuestionStatus,
    pub admin_response: Option<String>,
    #[serde(flatten)]
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

/// Data for inserting a new question row. Status always starts as pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub name: String,
    pub email: String,
    pub current_role_field: String,
    pub target_role: String,
    pub years_experience: String,
    pub skills: Option<String>,
    pub question: String,
    pub session_id: Option<String>,
}

/// Raw `questions` row.
#[derive(Debug, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub current_role_field: String,
    pub target_role: String,
    pub years_experience: String,
    pub skills: Option<String>,
    pub question: String,
    pub session_id: Option<String>,
    pub status: String,
    pub admin_response: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        let attachment = match (row.file_name, row.file_type, row.file_size, row.file_url) {
            (Some(file_name), Some(file_type), Some(file_size), Some(file_url)) => Some(Attachment {
                file_name,
                file_type,
                file_size,
                file_url,
            }),
            _ => None,
        };

        Question {
            id: row.id,
            name: row.name,
            email: row.email,
            current_role_field: row.current_role_field,
            target_role: row.target_role,
            years_experience: row.years_experience,
            skills: row.skills,
            question: row.question,
            session_id: row.session_id,
            status: QuestionStatus::from_db(&row.status),
            admin_response: row.admin_response,
            attachment,
            created_at: row.created_at,
            answered_at: row.answered_at,
        }
    }
}
