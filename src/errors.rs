use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

use crate::auth::identity::AuthError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    Template(askama::Error),
    Auth(AuthError),
    Session(String),
    Csrf,
    /// The project was written but the quote still points nowhere.
    PartialConversion {
        quote_id: String,
        project_id: String,
        cause: StoreError,
    },
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Storage error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Auth(e) => write!(f, "Authentication error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::PartialConversion {
                quote_id,
                project_id,
                cause,
            } => write!(
                f,
                "Project {project_id} was created but quote {quote_id} could not be marked converted: {cause}"
            ),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => not_found_page(),
            AppError::Csrf => {
                log::warn!("{self}");
                HttpResponse::Forbidden()
                    .content_type("text/plain; charset=utf-8")
                    .body(self.to_string())
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Internal Server Error")
            }
        }
    }
}

pub fn not_found_page() -> HttpResponse {
    let html = include_str!("../templates/errors/404.html");
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// Render a template into a 200 HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(tmpl.render()?))
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}
