use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::rate_limit::{RateLimiter, client_ip};
use crate::auth::{csrf, session};
use crate::errors::{AppError, render, see_other};
use crate::services::AdminService;
use crate::templates_structs::{AdminLoginTemplate, AdminQuestionsTemplate, APP_NAME};

#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct RespondForm {
    #[serde(default)]
    pub response: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_form(session: &Session, error: Option<&str>) -> Result<HttpResponse, AppError> {
    let csrf_token = csrf::get_or_create_token(session);
    render(AdminLoginTemplate {
        app_name: APP_NAME,
        error: error.map(str::to_string),
        csrf_token,
    })
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    if session::is_admin(&session) {
        return Ok(see_other("/admin"));
    }
    login_form(&session, None)
}

pub async fn login_submit(
    req: HttpRequest,
    session: Session,
    admin: web::Data<AdminService>,
    limiter: web::Data<RateLimiter>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check before touching the password hash
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        return login_form(&session, Some("Too many failed attempts. Please try again later."));
    }

    if !admin.verify(&form.password) {
        limiter.record_failure(ip);
        log::warn!("Failed admin login from {ip}");
        return login_form(&session, Some("Invalid password"));
    }

    limiter.clear(ip);
    session::set_admin_password(&session, &form.password)?;
    Ok(see_other("/admin"))
}

pub async fn index(
    session: Session,
    admin: web::Data<AdminService>,
) -> Result<HttpResponse, AppError> {
    let password = session::admin_password(&session).unwrap_or_default();

    match admin.list(&password).await {
        Ok(questions) => {
            let csrf_token = csrf::get_or_create_token(&session);
            let flash = session::take_flash(&session);
            render(AdminQuestionsTemplate::new(questions, csrf_token, flash))
        }
        // The secret changed since this session signed in
        Err(AppError::Unauthorized) => {
            session::clear_admin(&session);
            Ok(see_other("/admin/login"))
        }
        Err(e) => Err(e),
    }
}

pub async fn respond(
    session: Session,
    admin: web::Data<AdminService>,
    path: web::Path<i64>,
    form: web::Form<RespondForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    let password = session::admin_password(&session).unwrap_or_default();

    match admin.respond(id, &form.response, &password).await {
        Ok(_) => session::set_flash(&session, &format!("Response saved for question #{id}")),
        Err(AppError::Validation(msg)) => session::set_flash(&session, &msg),
        Err(AppError::NotFound) => session::set_flash(&session, &format!("Question #{id} not found")),
        Err(AppError::Unauthorized) => {
            session::clear_admin(&session);
            return Ok(see_other("/admin/login"));
        }
        Err(e) => return Err(e),
    }

    Ok(see_other("/admin"))
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session::clear_admin(&session);
    Ok(see_other("/admin/login"))
}
