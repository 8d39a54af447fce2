use actix_web::HttpResponse;
use askama::Template;

use crate::errors::{AppError, render};
use crate::templates_structs::{APP_NAME, LandingTemplate, NotFoundTemplate};

pub async fn landing() -> Result<HttpResponse, AppError> {
    render(LandingTemplate::new())
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    let body = NotFoundTemplate { app_name: APP_NAME }.render()?;
    Ok(HttpResponse::NotFound().content_type("text/html; charset=utf-8").body(body))
}
