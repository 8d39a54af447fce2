use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::rate_limit::{RateLimiter, client_ip};
use crate::errors::AppError;
use crate::services::AdminService;
use crate::templates_structs::{AdminListQuery, ApiErrorResponse, RespondRequest, RespondResponse};

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiErrorResponse::new("Unauthorized"))
}

fn too_many_attempts() -> HttpResponse {
    HttpResponse::TooManyRequests().json(ApiErrorResponse::new("Too many failed attempts"))
}

/// GET /api/admin?password=... - All questions, most recent first
pub async fn list(
    req: HttpRequest,
    admin: web::Data<AdminService>,
    limiter: web::Data<RateLimiter>,
    query: web::Query<AdminListQuery>,
) -> HttpResponse {
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        return too_many_attempts();
    }

    match admin.list(&query.password).await {
        Ok(questions) => {
            limiter.clear(ip);
            HttpResponse::Ok().json(questions)
        }
        Err(AppError::Unauthorized) => {
            limiter.record_failure(ip);
            unauthorized()
        }
        Err(e) => {
            log::error!("Admin list failed: {e}");
            HttpResponse::InternalServerError().json(ApiErrorResponse::new("Failed to fetch questions"))
        }
    }
}

/// POST /api/admin/response - Save an operator response
pub async fn respond(
    req: HttpRequest,
    admin: web::Data<AdminService>,
    limiter: web::Data<RateLimiter>,
    body: web::Json<RespondRequest>,
) -> HttpResponse {
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        return too_many_attempts();
    }

    match admin.respond(body.question_id, &body.response, &body.password).await {
        Ok(_) => {
            limiter.clear(ip);
            HttpResponse::Ok().json(RespondResponse {
                success: true,
                message: "Response saved successfully".to_string(),
            })
        }
        Err(AppError::Unauthorized) => {
            limiter.record_failure(ip);
            unauthorized()
        }
        Err(AppError::Validation(msg)) => {
            HttpResponse::BadRequest().json(ApiErrorResponse::with_details("invalid_response", msg))
        }
        Err(AppError::NotFound) => {
            log::warn!("Response for unknown question {}", body.question_id);
            HttpResponse::InternalServerError().json(ApiErrorResponse::new("Failed to save response"))
        }
        Err(e) => {
            log::error!("Saving response for question {} failed: {e}", body.question_id);
            HttpResponse::InternalServerError().json(ApiErrorResponse::new("Failed to save response"))
        }
    }
}
