pub mod projects;
pub mod quotes;
pub mod users;

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::db::Db;
use crate::errors::{AppError, render};
use crate::models::dashboard::{self, AdminOverview};
use crate::models::project;
use crate::models::quote::{self, QuoteStatus};
use crate::models::user::{self, UserForm, UserProfile};
use crate::templates_structs::{AdminDashboardTemplate, PageContext, SelectOption, Tab};

const TABS: &[(&str, &str)] = &[
    ("overview", "Overview"),
    ("projects", "Projects"),
    ("quotes", "Quotes"),
    ("users", "Users"),
    ("create-user", "Create User"),
];

const ROLES: &[(&str, &str)] = &[("customer", "Customer"), ("admin", "Administrator")];

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
    pub status: Option<String>,
}

/// What the dashboard should show besides the tab's own listing.
pub(crate) struct DashboardView<'a> {
    pub tab: &'a str,
    pub status: Option<QuoteStatus>,
    pub user_form: UserForm,
    pub user_errors: Vec<String>,
}

impl<'a> DashboardView<'a> {
    pub fn tab(tab: &'a str) -> Self {
        Self {
            tab,
            status: None,
            user_form: UserForm {
                role: "customer".to_string(),
                ..Default::default()
            },
            user_errors: vec![],
        }
    }
}

fn status_choices() -> Vec<(&'static str, &'static str)> {
    QuoteStatus::ALL.iter().map(|s| (s.as_str(), s.label())).collect()
}

/// Only the active tab's records are loaded.
pub(crate) async fn render_dashboard(
    db: &Db,
    session: &Session,
    profile: UserProfile,
    view: DashboardView<'_>,
) -> Result<HttpResponse, AppError> {
    let tab = if TABS.iter().any(|(key, _)| *key == view.tab) {
        view.tab
    } else {
        "overview"
    };

    let mut overview = AdminOverview::default();
    let mut projects = vec![];
    let mut quotes = vec![];
    let mut users = vec![];
    match tab {
        "projects" => projects = project::find_all(db).await?,
        "quotes" => quotes = quote::find_all(db, view.status).await?,
        "users" => users = user::find_all(db).await?,
        "create-user" => {}
        _ => {
            overview = dashboard::admin_overview(db).await?;
            // Recent activity
            quotes = quote::find_all(db, None).await?;
            quotes.truncate(5);
        }
    }

    let current_status = view.status.map(|s| s.as_str()).unwrap_or("");
    let mut filters = vec![("", "All")];
    filters.extend(status_choices());

    let ctx = PageContext::with_viewer(session, Some(profile), "/admin-dashboard");
    render(AdminDashboardTemplate {
        ctx,
        tabs: Tab::list(TABS, tab),
        tab: tab.to_string(),
        overview,
        projects,
        quotes,
        status_filters: SelectOption::list(&filters, current_status),
        quote_statuses: SelectOption::list(&status_choices(), ""),
        users,
        roles: SelectOption::list(ROLES, &view.user_form.role),
        user_form: view.user_form,
        user_errors: view.user_errors,
    })
}

pub async fn dashboard(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let mut view = DashboardView::tab(query.tab.as_deref().unwrap_or("overview"));
    view.status = query.status.as_deref().and_then(QuoteStatus::parse);
    render_dashboard(&db, &session, profile.into_inner(), view).await
}
