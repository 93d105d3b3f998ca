use actix_session::Session;

use crate::errors::AppError;
use crate::models::user::UserProfile;

pub fn get_user_id(session: &Session) -> Option<String> {
    session.get::<String>("user_id").unwrap_or(None)
}

/// Remember the signed-in principal. Renews the session id first.
pub fn start(session: &Session, profile: &UserProfile) -> Result<(), AppError> {
    session.renew();
    session
        .insert("user_id", &profile.uid)
        .map_err(|e| AppError::Session(format!("Failed to store user id: {e}")))
}

pub fn set_flash(session: &Session, message: &str) {
    if let Err(e) = session.insert("flash", message) {
        log::warn!("Could not store flash message: {e}");
    }
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}
