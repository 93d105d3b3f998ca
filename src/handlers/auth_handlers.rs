use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::identity::{self, AuthError};
use crate::auth::rate_limit::RateLimiter;
use crate::auth::{csrf, session as auth_session};
use crate::db::Db;
use crate::errors::{AppError, render};
use crate::models::user;
use crate::templates_structs::{LoginTemplate, PageContext};
use super::{CsrfOnly, redirect};

pub const INVALID_ROLE: &str = "Invalid user role. Please contact administrator.";

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

fn login_template(session: &Session, error: Option<String>, email: &str) -> LoginTemplate {
    LoginTemplate {
        ctx: PageContext::with_viewer(session, None, "/login"),
        error,
        email: email.to_string(),
    }
}

pub async fn login_page(db: web::Data<Db>, session: Session) -> Result<HttpResponse, AppError> {
    // Already signed in with a usable role: go straight to the dashboard
    if let Some(uid) = auth_session::get_user_id(&session) {
        let dashboard = user::find_by_id(&db, &uid)
            .await?
            .and_then(|p| p.role.dashboard_path());
        if let Some(path) = dashboard {
            return Ok(redirect(path));
        }
    }
    render(login_template(&session, None, ""))
}

pub async fn login_submit(
    req: HttpRequest,
    db: web::Data<Db>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    session.remove("user_id");
    let profile = match identity::sign_in(&db, &limiter, ip, &form.email, &form.password).await {
        Ok(profile) => profile,
        Err(e) => {
            if matches!(e, AuthError::Store(_) | AuthError::Hash(_)) {
                log::error!("Sign-in failed: {e}");
            }
            let tmpl = login_template(&session, Some(e.message().to_string()), &form.email);
            return render(tmpl);
        }
    };

    match profile.role.dashboard_path() {
        Some(path) => {
            auth_session::start(&session, &profile)?;
            log::info!("User {} signed in as {}", profile.uid, profile.role.as_str());
            Ok(redirect(path))
        }
        None => {
            log::warn!("User {} has no usable role", profile.uid);
            render(login_template(&session, Some(INVALID_ROLE.to_string()), &form.email))
        }
    }
}

pub async fn logout(session: Session, form: web::Form<CsrfOnly>) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    identity::sign_out(&session);
    Ok(redirect("/"))
}
