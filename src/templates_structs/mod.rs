// Template context structures for Askama templates, organized by page group.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{get_user_id, take_flash};
use crate::db::Db;
use crate::errors::AppError;
use crate::models::user::{self, UserProfile};

pub const APP_NAME: &str = "Alliance Engineers & Contractors";

/// Common context shared by every page.
/// Templates access these as `ctx.app_name`, `ctx.flash_text()`, etc.
pub struct PageContext {
    pub app_name: String,
    pub current_path: String,
    pub flash: Option<String>,
    pub csrf_token: String,
    pub viewer: Option<UserProfile>,
}

impl PageContext {
    /// Context for public pages; loads the visitor's profile if signed in.
    pub async fn build(session: &Session, db: &Db, current_path: &str) -> Result<Self, AppError> {
        let viewer = match get_user_id(session) {
            Some(uid) => user::find_by_id(db, &uid).await?,
            None => None,
        };
        Ok(Self::with_viewer(session, viewer, current_path))
    }

    /// Context for guarded pages, where the guard already loaded the profile.
    pub fn with_viewer(session: &Session, viewer: Option<UserProfile>, current_path: &str) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            current_path: current_path.to_string(),
            flash: take_flash(session),
            csrf_token: csrf::get_or_create_token(session),
            viewer,
        }
    }

    pub fn has_flash(&self) -> bool {
        self.flash.is_some()
    }

    pub fn flash_text(&self) -> &str {
        self.flash.as_deref().unwrap_or("")
    }

    pub fn signed_in(&self) -> bool {
        self.viewer.is_some()
    }

    /// Dashboard link for the signed-in role, empty otherwise.
    pub fn dashboard_path(&self) -> &str {
        self.viewer
            .as_ref()
            .and_then(|v| v.role.dashboard_path())
            .unwrap_or("")
    }

    pub fn viewer_name(&self) -> &str {
        self.viewer.as_ref().map(|v| v.greeting_name()).unwrap_or("")
    }

    pub fn is_current(&self, path: &str) -> bool {
        if path == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(path)
        }
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list(choices: &[(&str, &str)], current: &str) -> Vec<SelectOption> {
        choices
            .iter()
            .map(|&(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
                selected: value == current,
            })
            .collect()
    }
}

/// One tab of a dashboard.
#[derive(Debug, Clone)]
pub struct Tab {
    pub key: &'static str,
    pub label: &'static str,
    pub active: bool,
}

impl Tab {
    pub fn list(tabs: &[(&'static str, &'static str)], current: &str) -> Vec<Tab> {
        tabs.iter()
            .map(|&(key, label)| Tab {
                key,
                label,
                active: key == current,
            })
            .collect()
    }
}

mod admin;
mod common;
mod customer;
mod public;

pub use admin::*;
pub use common::*;
pub use customer::*;
pub use public::*;
