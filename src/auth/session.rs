use actix_session::Session;

use crate::errors::AppError;

const FLASH_KEY: &str = "flash";
const ADMIN_KEY: &str = "admin_password";

pub fn set_flash(session: &Session, message: &str) {
    if let Err(e) = session.insert(FLASH_KEY, message) {
        log::warn!("Could not store flash message: {e}");
    }
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}

/// The operator password captured at admin login. The session cookie is
/// encrypted, and every admin call re-checks it against the shared secret.
pub fn admin_password(session: &Session) -> Option<String> {
    session.get::<String>(ADMIN_KEY).unwrap_or(None)
}

pub fn set_admin_password(session: &Session, password: &str) -> Result<(), AppError> {
    session.renew();
    session.insert(ADMIN_KEY, password)?;
    Ok(())
}

pub fn clear_admin(session: &Session) {
    session.remove(ADMIN_KEY);
}

pub fn is_admin(session: &Session) -> bool {
    admin_password(session).is_some()
}
