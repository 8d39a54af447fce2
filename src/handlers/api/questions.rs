use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, web};

use crate::handlers::read_upload;
use crate::services::{SubmissionClient, SubmissionRequest, SubmissionService, SubmitFailure};
use crate::templates_structs::{ApiErrorResponse, SubmissionResponse};

#[derive(MultipartForm)]
pub struct QuestionForm {
    pub name: Text<String>,
    pub email: Text<String>,
    pub question: Text<String>,
    pub current_role_field: Option<Text<String>>,
    pub target_role: Option<Text<String>>,
    pub years_experience: Option<Text<String>>,
    pub skills: Option<Text<String>>,
    pub session_id: Option<Text<String>>,
    #[multipart(limit = "10MiB")]
    pub file: Option<TempFile>,
}

fn text(field: Option<Text<String>>) -> String {
    field.map(|t| t.into_inner()).unwrap_or_default()
}

/// POST /api/questions - Store a career question with an optional attachment
pub async fn create(
    service: web::Data<SubmissionService>,
    MultipartForm(form): MultipartForm<QuestionForm>,
) -> HttpResponse {
    let file = match &form.file {
        Some(f) => match read_upload(f).await {
            Ok(upload) => upload,
            Err(e) => {
                log::error!("Could not read uploaded file: {e}");
                return failure_response(&SubmitFailure::Failed);
            }
        },
        None => None,
    };

    let request = SubmissionRequest {
        name: form.name.into_inner(),
        email: form.email.into_inner(),
        question: form.question.into_inner(),
        current_role_field: text(form.current_role_field),
        target_role: text(form.target_role),
        years_experience: text(form.years_experience),
        skills: text(form.skills),
        session_id: form
            .session_id
            .map(|t| t.into_inner())
            .filter(|s| !s.trim().is_empty()),
        file,
    };

    match service.submit(request).await {
        Ok(receipt) => HttpResponse::Ok().json(SubmissionResponse::from(receipt)),
        Err(failure) => failure_response(&failure),
    }
}

fn failure_response(failure: &SubmitFailure) -> HttpResponse {
    match failure {
        SubmitFailure::Invalid(errors) => HttpResponse::BadRequest()
            .json(ApiErrorResponse::with_details(failure.code(), errors.join(" "))),
        SubmitFailure::NotCareerRelated => {
            HttpResponse::UnprocessableEntity().json(ApiErrorResponse::new(failure.code()))
        }
        SubmitFailure::SessionLimitExceeded => {
            HttpResponse::TooManyRequests().json(ApiErrorResponse::new(failure.code()))
        }
        SubmitFailure::Failed => {
            HttpResponse::InternalServerError().json(ApiErrorResponse::new(failure.code()))
        }
    }
}
