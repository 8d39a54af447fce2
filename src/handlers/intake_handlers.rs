use actix_multipart::form::{MultipartForm, MultipartFormConfig, tempfile::TempFile, text::Text};
use actix_session::{Session, SessionExt};
use actix_web::{HttpResponse, error::InternalError, http::header, web};
use serde::Deserialize;

use crate::auth::csrf;
use crate::errors::{AppError, render, see_other};
use crate::intake::registry::ConversationHandle;
use crate::intake::{ConversationRegistry, IntakeController, MAX_ATTACHMENT_BYTES, SessionGuard};
use crate::templates_structs::AskTemplate;
use super::read_upload;

#[derive(Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub message: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

/// Set by the attachment upload error handler, read back by the next page view.
const UPLOAD_REJECTED_KEY: &str = "intake_upload_rejected";

#[derive(MultipartForm)]
pub struct AttachmentForm {
    pub csrf_token: Text<String>,
    #[multipart(limit = "10MiB")]
    pub file: TempFile,
}

/// A refused chat upload goes back to the chat instead of a bare 400. The
/// handler cannot reach the conversation, so it leaves a note in the session
/// for `page` to turn into a chat message.
pub fn attachment_upload_config() -> MultipartFormConfig {
    MultipartFormConfig::default().error_handler(|err, req| {
        let too_large = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
            .is_some_and(|len| len > MAX_ATTACHMENT_BYTES);
        log::warn!("Rejected chat attachment (too large: {too_large}): {err}");
        if let Err(e) = req.get_session().insert(UPLOAD_REJECTED_KEY, too_large) {
            log::error!("Failed to note rejected upload: {e}");
        }
        InternalError::from_response(err, see_other("/ask")).into()
    })
}

fn take_upload_rejection(session: &Session) -> Option<bool> {
    session.remove_as::<bool>(UPLOAD_REJECTED_KEY).and_then(Result::ok)
}

/// Resume the browser's session and find (or open) its live conversation.
fn conversation_for(
    session: &Session,
    controller: &IntakeController,
    registry: &ConversationRegistry,
) -> Result<ConversationHandle, AppError> {
    let state = controller.resume(session)?;
    Ok(registry.checkout(&state.session_id, || controller.open(&state)))
}

/// Viewing the chat only keeps a live conversation if one already exists;
/// otherwise the opening state is rendered and thrown away.
pub async fn page(
    session: Session,
    controller: web::Data<IntakeController>,
    registry: web::Data<ConversationRegistry>,
) -> Result<HttpResponse, AppError> {
    let state = controller.resume(&session)?;
    let csrf_token = csrf::get_or_create_token(&session);

    let handle = match take_upload_rejection(&session) {
        Some(too_large) => {
            let handle = registry.checkout(&state.session_id, || controller.open(&state));
            controller.reject_upload(&mut *handle.lock().await, too_large);
            Some(handle)
        }
        None => registry.get(&state.session_id),
    };

    let Some(handle) = handle else {
        return render(AskTemplate::new(&controller.open(&state), csrf_token));
    };
    let conv = handle.lock().await;
    render(AskTemplate::new(&conv, csrf_token))
}

pub async fn send(
    session: Session,
    controller: web::Data<IntakeController>,
    registry: web::Data<ConversationRegistry>,
    form: web::Form<MessageForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let handle = conversation_for(&session, &controller, &registry)?;
    let mut conv = handle.lock().await;
    let outcome = controller.handle_input(&mut conv, &session, &form.message).await?;
    log::debug!("Intake input for {}: {:?}", conv.session_id(), outcome);

    Ok(see_other("/ask"))
}

pub async fn attach(
    session: Session,
    controller: web::Data<IntakeController>,
    registry: web::Data<ConversationRegistry>,
    MultipartForm(form): MultipartForm<AttachmentForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let Some(upload) = read_upload(&form.file).await?.filter(|u| !u.bytes.is_empty()) else {
        return Ok(see_other("/ask"));
    };

    let handle = conversation_for(&session, &controller, &registry)?;
    let mut conv = handle.lock().await;
    let outcome = controller.stage_attachment(&mut conv, upload.into());
    log::debug!("Attachment for {}: {:?}", conv.session_id(), outcome);

    Ok(see_other("/ask"))
}

pub async fn remove_attachment(
    session: Session,
    controller: web::Data<IntakeController>,
    registry: web::Data<ConversationRegistry>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let handle = conversation_for(&session, &controller, &registry)?;
    let mut conv = handle.lock().await;
    controller.remove_attachment(&mut conv);

    Ok(see_other("/ask"))
}

/// Forget everything this browser stored and start a new conversation.
pub async fn reset(
    session: Session,
    controller: web::Data<IntakeController>,
    registry: web::Data<ConversationRegistry>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let previous = SessionGuard::new(&session).state()?.session_id;
    registry.remove(&previous);
    let conversation = controller.reset(&session)?;
    log::info!("Intake session {} reset, now {}", previous, conversation.session_id());
    registry.insert(conversation);

    Ok(see_other("/ask"))
}
