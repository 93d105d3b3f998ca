use askama::Template;

use crate::models::dashboard::AdminOverview;
use crate::models::project::{Project, ProjectForm};
use crate::models::quote::Quote;
use crate::models::user::{UserForm, UserProfile};
use super::{PageContext, SelectOption, Tab};

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub ctx: PageContext,
    pub tabs: Vec<Tab>,
    pub tab: String,
    pub overview: AdminOverview,
    pub projects: Vec<Project>,
    pub quotes: Vec<Quote>,
    /// Quotes tab filter; the first entry is "All".
    pub status_filters: Vec<SelectOption>,
    /// Choices for each quote's status select.
    pub quote_statuses: Vec<SelectOption>,
    pub users: Vec<UserProfile>,
    pub user_form: UserForm,
    pub user_errors: Vec<String>,
    pub roles: Vec<SelectOption>,
}

impl AdminDashboardTemplate {
    pub fn is_tab(&self, key: &str) -> bool {
        self.tab == key
    }
}

/// Create, edit, and convert-from-quote all share this form.
#[derive(Template)]
#[template(path = "admin/project_form.html")]
pub struct ProjectFormTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub form: ProjectForm,
    pub errors: Vec<String>,
    pub categories: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
    pub customers: Vec<SelectOption>,
    /// Set when converting a quote.
    pub quote: Option<Quote>,
}

impl ProjectFormTemplate {
    /// A stored category that is not one of the offered choices.
    pub fn custom_category(&self) -> bool {
        !self.form.category.is_empty() && !self.categories.iter().any(|c| c.selected)
    }
}
