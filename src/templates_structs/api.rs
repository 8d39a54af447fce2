use serde::{Deserialize, Serialize};

use crate::services::SubmissionReceipt;

/// API error response.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorResponse {
    pub fn new(error: &str) -> Self {
        Self { error: error.to_string(), details: None }
    }

    pub fn with_details(error: &str, details: String) -> Self {
        Self { error: error.to_string(), details: Some(details) }
    }
}

/// Body returned by `POST /api/questions` on success.
#[derive(Serialize, Debug)]
pub struct SubmissionResponse {
    pub success: bool,
    pub id: i64,
    pub message: String,
    #[serde(rename = "hasFile")]
    pub has_file: bool,
    #[serde(rename = "fileUrl")]
    pub file_url: Option<String>,
}

impl From<SubmissionReceipt> for SubmissionResponse {
    fn from(r: SubmissionReceipt) -> Self {
        SubmissionResponse {
            success: true,
            id: r.id,
            message: "Question submitted successfully".to_string(),
            has_file: r.had_file,
            file_url: r.attachment.map(|a| a.file_url),
        }
    }
}

/// Query string of `GET /api/admin`.
#[derive(Deserialize, Debug)]
pub struct AdminListQuery {
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/admin/response`.
#[derive(Deserialize, Debug)]
pub struct RespondRequest {
    #[serde(rename = "questionId")]
    pub question_id: i64,
    pub response: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct RespondResponse {
    pub success: bool,
    pub message: String,
}
