use askama::Template;

use crate::models::project::Project;
use crate::models::quote::{PROJECT_TYPES, QuoteRequest, TIMELINES};
use crate::models::user::UserProfile;
use super::{PageContext, SelectOption};

/// A quote form, pre-filled from the signed-in profile when there is one.
pub struct QuoteFormView {
    pub action: String,
    pub source: String,
    pub values: QuoteRequest,
    pub project_types: Vec<SelectOption>,
    pub timelines: Vec<SelectOption>,
    pub with_budget: bool,
}

impl QuoteFormView {
    pub fn new(source: impl Into<String>, viewer: Option<&UserProfile>) -> Self {
        let values = match viewer {
            Some(v) => QuoteRequest {
                first_name: v.first_name.clone(),
                last_name: v.last_name.clone(),
                email: v.email.clone(),
                phone: v.phone.clone(),
                ..Default::default()
            },
            None => QuoteRequest::default(),
        };
        Self {
            action: "/quotes".to_string(),
            source: source.into(),
            project_types: SelectOption::list(PROJECT_TYPES, &values.project_type),
            timelines: SelectOption::list(TIMELINES, &values.timeline),
            values,
            with_budget: false,
        }
    }

    /// Post somewhere other than the public endpoint and collect a budget.
    pub fn for_dashboard(mut self, action: &str) -> Self {
        self.action = action.to_string();
        self.with_budget = true;
        self
    }

    /// Re-show what was submitted.
    pub fn with_values(mut self, values: QuoteRequest) -> Self {
        self.project_types = SelectOption::list(PROJECT_TYPES, &values.project_type);
        self.timelines = SelectOption::list(TIMELINES, &values.timeline);
        self.values = values;
        self
    }

    pub fn budget_value(&self) -> &str {
        self.values.budget.as_deref().unwrap_or("")
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub projects: Vec<Project>,
    pub form: QuoteFormView,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
    pub form: QuoteFormView,
}

#[derive(Template)]
#[template(path = "projects.html")]
pub struct ProjectsTemplate {
    pub ctx: PageContext,
    pub projects: Vec<Project>,
    pub categories: Vec<SelectOption>,
    pub category: String,
}

#[derive(Template)]
#[template(path = "project_detail.html")]
pub struct ProjectDetailTemplate {
    pub ctx: PageContext,
    pub project: Project,
    pub form: QuoteFormView,
}
