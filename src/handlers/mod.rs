pub mod admin_handlers;
pub mod api;
pub mod intake_handlers;
pub mod pages;

use actix_multipart::form::{MultipartFormConfig, tempfile::TempFile};
use actix_web::{HttpResponse, error::InternalError, middleware::{Logger, from_fn}, web};

use crate::auth::middleware::require_admin;
use crate::errors::AppError;
use crate::services::Upload;
use crate::templates_structs::ApiErrorResponse;

/// Access log line. Logs the path only: the admin API takes its password in
/// the query string, which `%r` would write out.
pub const ACCESS_LOG_FORMAT: &str = r#"%a "%U" %s %b %T"#;

pub fn access_log() -> Logger {
    Logger::new(ACCESS_LOG_FORMAT)
}

/// Mount every application route. Static files and the uploads mount are
/// added by `main`, since they depend on configured directories.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(multipart_config());

    cfg.route("/", web::get().to(pages::landing))
        // Intake chat
        .route("/ask", web::get().to(intake_handlers::page))
        .route("/ask", web::post().to(intake_handlers::send))
        .service(
            web::resource("/ask/attachment")
                .app_data(intake_handlers::attachment_upload_config())
                .route(web::post().to(intake_handlers::attach)),
        )
        .route("/ask/attachment/remove", web::post().to(intake_handlers::remove_attachment))
        .route("/ask/reset", web::post().to(intake_handlers::reset))
        // JSON API
        .service(web::scope("/api").configure(api::configure))
        // Admin pages; login sits outside the guarded scope
        .route("/admin/login", web::get().to(admin_handlers::login_page))
        .route("/admin/login", web::post().to(admin_handlers::login_submit))
        .service(
            web::scope("/admin")
                .wrap(from_fn(require_admin))
                .route("", web::get().to(admin_handlers::index))
                .route("/questions/{id}/respond", web::post().to(admin_handlers::respond))
                .route("/logout", web::post().to(admin_handlers::logout)),
        );
}

/// Multipart parse failures (missing fields, oversized parts) answer with
/// the JSON error shape the API uses everywhere else.
fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected multipart body: {err}");
        let body = ApiErrorResponse::with_details("invalid_submission", err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Read a received part into memory. Returns `None` for a part without a
/// file name, which is how browsers send "no file chosen". A named empty
/// file still counts as sent.
pub(crate) async fn read_upload(file: &TempFile) -> Result<Option<Upload>, AppError> {
    let Some(file_name) = file.file_name.as_deref().map(base_name).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let bytes = tokio::fs::read(file.file.path()).await?;
    let content_type = file
        .content_type
        .as_ref()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(Some(Upload {
        file_name: file_name.to_string(),
        content_type,
        bytes,
    }))
}

/// Some browsers send the full client path as the file name.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}
