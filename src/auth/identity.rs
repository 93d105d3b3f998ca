//! Sign-in, sign-up and sign-out against the account and profile collections.

use std::fmt;
use std::net::IpAddr;

use actix_session::Session;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::rate_limit::RateLimiter;
use crate::auth::validate;
use crate::db::Db;
use crate::models::account::{self, AccountRecord};
use crate::models::user::{self, NewProfile, Role, UserProfile};
use crate::store::StoreError;

#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    UserNotFound,
    RateLimited,
    UserDisabled,
    /// Credentials were fine but no profile record exists.
    ProfileNotFound,
    EmailInUse,
    WeakPassword,
    InvalidEmail,
    Store(StoreError),
    Hash(String),
}

impl AuthError {
    /// Message shown on the login and create-user forms.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Incorrect password.",
            AuthError::UserNotFound => "No account found with this email.",
            AuthError::RateLimited => "Too many failed attempts. Please try again later.",
            AuthError::UserDisabled => "This account has been disabled.",
            AuthError::ProfileNotFound => "User data not found.",
            AuthError::EmailInUse => "An account with this email already exists.",
            AuthError::WeakPassword => "Password must be at least 8 characters.",
            AuthError::InvalidEmail => "Invalid email address.",
            AuthError::Store(_) | AuthError::Hash(_) => "Login failed. Please try again.",
        }
    }

    /// Counts against the caller's failed-attempt budget.
    fn is_credential_failure(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials | AuthError::UserNotFound)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Store(e) => write!(f, "Store error: {e}"),
            AuthError::Hash(e) => write!(f, "Hash error: {e}"),
            other => f.write_str(other.message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Store(e)
    }
}

impl From<crate::errors::AppError> for AuthError {
    fn from(e: crate::errors::AppError) -> Self {
        match e {
            crate::errors::AppError::Store(s) => AuthError::Store(s),
            crate::errors::AppError::Auth(a) => a,
            crate::errors::AppError::NotFound => AuthError::ProfileNotFound,
            other => AuthError::Store(StoreError::Unavailable(other.to_string())),
        }
    }
}

/// Verify credentials and load the profile.
///
/// Wrong passwords and unknown emails count towards the per-IP limit; a
/// successful sign-in clears it.
pub async fn sign_in(
    db: &Db,
    limiter: &RateLimiter,
    ip: IpAddr,
    email: &str,
    password: &str,
) -> Result<UserProfile, AuthError> {
    if limiter.is_blocked(ip) {
        log::warn!("Rate-limited login attempt from {ip}");
        return Err(AuthError::RateLimited);
    }

    let result = check_credentials(db, email, password).await;
    match &result {
        Err(e) if e.is_credential_failure() => {
            log::warn!("Failed login for '{}' from {ip}", email.trim());
            limiter.record_failure(ip);
        }
        Ok(_) => limiter.clear(ip),
        Err(_) => {}
    }
    let uid = result?;

    user::find_by_id(db, &uid)
        .await?
        .ok_or(AuthError::ProfileNotFound)
}

async fn check_credentials(db: &Db, email: &str, password: &str) -> Result<String, AuthError> {
    if validate::validate_email(email).is_some() {
        return Err(AuthError::InvalidEmail);
    }
    let found = account::find_by_email(db, email)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    if !verify_password(password, &found.record.password_hash).map_err(AuthError::Hash)? {
        return Err(AuthError::InvalidCredentials);
    }
    if found.record.disabled {
        return Err(AuthError::UserDisabled);
    }
    Ok(found.uid)
}

/// Input for creating a principal and its profile.
#[derive(Debug, Clone, Default)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub company: Option<String>,
    pub role: Role,
}

/// Create the account and its profile, returning the new uid.
pub async fn sign_up(db: &Db, input: &SignUp, created_by: Option<&str>) -> Result<String, AuthError> {
    let email = input.email.trim().to_lowercase();
    if validate::validate_email(&email).is_some() {
        return Err(AuthError::InvalidEmail);
    }
    if validate::validate_password(&input.password).is_some() {
        return Err(AuthError::WeakPassword);
    }
    if account::find_by_email(db, &email).await?.is_some() {
        return Err(AuthError::EmailInUse);
    }

    let record = AccountRecord {
        email: email.clone(),
        password_hash: hash_password(&input.password).map_err(AuthError::Hash)?,
        display_name: format!("{} {}", input.first_name.trim(), input.last_name.trim())
            .trim()
            .to_string(),
        disabled: false,
    };
    let uid = match account::create(db, &record).await {
        Ok(uid) => uid,
        Err(StoreError::Db(sqlx::Error::Database(e))) if e.is_unique_violation() => {
            return Err(AuthError::EmailInUse);
        }
        Err(e) => return Err(e.into()),
    };

    let profile = NewProfile {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email,
        phone: input.phone.trim().to_string(),
        company: input
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from),
        role: input.role,
        created_by: created_by.map(String::from),
    };
    if let Err(e) = user::create(db, &uid, &profile).await {
        log::error!("Profile write failed for new account {uid}: {e}");
        if let Err(cleanup) = account::delete(db, &uid).await {
            log::error!("Could not remove orphaned account {uid}: {cleanup}");
        }
        return Err(e.into());
    }

    log::info!("Created {} account {uid}", input.role.as_str());
    Ok(uid)
}

/// Drop everything the session holds.
pub fn sign_out(session: &Session) {
    session.purge();
}
