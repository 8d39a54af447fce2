pub mod admin;
pub mod questions;

use actix_web::{
    Error, HttpResponse, web,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    error::InternalError,
    middleware::{Next, from_fn},
};

use crate::templates_structs::ApiErrorResponse;

/// CSRF protection for the JSON admin mutation.
///
/// Rejects POST requests that are not `application/json`. Browsers cannot send
/// cross-origin JSON with cookies through a plain form post, so the header
/// check stands in for a token.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if req.method() == actix_web::http::Method::POST {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = ApiErrorResponse::new("Content-Type must be application/json");
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Malformed JSON bodies get the same error shape as everything else.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ApiErrorResponse::with_details("invalid_request", err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Configure `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/questions", web::post().to(questions::create));
    cfg.service(
        web::scope("/admin")
            .app_data(json_config())
            .wrap(from_fn(require_json_content_type))
            .route("", web::get().to(admin::list))
            .route("/response", web::post().to(admin::respond)),
    );
}
