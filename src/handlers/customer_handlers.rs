use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::{csrf, session as auth_session};
use crate::db::Db;
use crate::errors::{AppError, render};
use crate::models::dashboard;
use crate::models::project;
use crate::models::quote::{self, QuoteRequest, source};
use crate::models::user::UserProfile;
use crate::templates_structs::{CustomerDashboardTemplate, PageContext, QuoteFormView, Tab};
use super::public_handlers::{QUOTE_SUBMITTED, QuoteSubmission};
use super::redirect;

const TABS: &[(&str, &str)] = &[
    ("overview", "Overview"),
    ("projects", "My Projects"),
    ("quotes", "My Quotes"),
    ("new-quote", "Request Quote"),
];

const QUOTE_ACTION: &str = "/customer-dashboard/quotes";

#[derive(Deserialize)]
pub struct TabQuery {
    pub tab: Option<String>,
}

async fn render_dashboard(
    db: &Db,
    session: &Session,
    profile: UserProfile,
    tab: &str,
    values: Option<QuoteRequest>,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let tab = if TABS.iter().any(|(key, _)| *key == tab) {
        tab
    } else {
        "overview"
    };

    let projects = project::find_for_customer(db, &profile.uid).await?;
    let quotes = quote::find_for_user(db, &profile.uid).await?;
    let overview = dashboard::customer_overview(&projects, &quotes);

    let mut form = QuoteFormView::new(source::CUSTOMER_DASHBOARD, Some(&profile)).for_dashboard(QUOTE_ACTION);
    if let Some(values) = values {
        form = form.with_values(values);
    }

    let ctx = PageContext::with_viewer(session, Some(profile), "/customer-dashboard");
    render(CustomerDashboardTemplate {
        ctx,
        tabs: Tab::list(TABS, tab),
        tab: tab.to_string(),
        overview,
        projects,
        quotes,
        form,
        errors,
    })
}

pub async fn dashboard(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    query: web::Query<TabQuery>,
) -> Result<HttpResponse, AppError> {
    let tab = query.tab.as_deref().unwrap_or("overview");
    render_dashboard(&db, &session, profile.into_inner(), tab, None, vec![]).await
}

/// The dashboard's own quote form. The quote always belongs to the
/// signed-in customer.
pub async fn submit_quote(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    form: web::Form<QuoteSubmission>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let profile = profile.into_inner();

    let request = form.request();
    let errors = request.validate();
    if !errors.is_empty() {
        return render_dashboard(&db, &session, profile, "new-quote", Some(request), errors).await;
    }

    quote::submit(&db, &request, Some(&profile.uid), source::CUSTOMER_DASHBOARD).await?;
    auth_session::set_flash(&session, QUOTE_SUBMITTED);
    Ok(redirect(&source::return_path(source::CUSTOMER_DASHBOARD)))
}
