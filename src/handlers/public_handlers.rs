use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::{csrf, session as auth_session};
use crate::db::Db;
use crate::errors::{AppError, render};
use crate::models::project::{self, CATEGORIES};
use crate::models::quote::{self, QuoteRequest, source};
use crate::templates_structs::{
    AboutTemplate, ContactTemplate, HomeTemplate, PageContext, ProjectDetailTemplate,
    ProjectsTemplate, QuoteFormView, SelectOption,
};
use super::redirect;

pub const QUOTE_SUBMITTED: &str = "Quote request submitted successfully! We will contact you soon.";

const HOME_PROJECT_LIMIT: usize = 6;

pub async fn home(db: web::Data<Db>, session: Session) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &db, "/").await?;
    let mut projects = project::find_portfolio(&db).await?;
    projects.truncate(HOME_PROJECT_LIMIT);
    let form = QuoteFormView::new(source::HOMEPAGE, ctx.viewer.as_ref());
    render(HomeTemplate { ctx, projects, form })
}

pub async fn about(db: web::Data<Db>, session: Session) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &db, "/about").await?;
    render(AboutTemplate { ctx })
}

pub async fn contact(db: web::Data<Db>, session: Session) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &db, "/contact").await?;
    let form = QuoteFormView::new(source::CONTACT, ctx.viewer.as_ref());
    render(ContactTemplate { ctx, form })
}

#[derive(Deserialize)]
pub struct ProjectsQuery {
    pub category: Option<String>,
}

pub async fn projects(
    db: web::Data<Db>,
    session: Session,
    query: web::Query<ProjectsQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &db, "/projects").await?;
    let category = query.category.clone().unwrap_or_default();

    let mut projects = project::find_portfolio(&db).await?;
    if !category.is_empty() {
        projects.retain(|p| p.category.eq_ignore_ascii_case(&category));
    }

    let choices: Vec<(&str, &str)> = std::iter::once(("", "All"))
        .chain(CATEGORIES.iter().map(|c| (*c, *c)))
        .collect();
    let categories = SelectOption::list(&choices, &category);
    render(ProjectsTemplate {
        ctx,
        projects,
        categories,
        category,
    })
}

/// Portfolio projects are public. A customer project is shown only to
/// admins and the customer who owns it; everyone else gets a 404.
pub async fn project_detail(
    db: web::Data<Db>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let ctx = PageContext::build(&session, &db, "/projects").await?;
    let project = project::find_by_id(&db, &id).await?.ok_or(AppError::NotFound)?;

    if !project.is_portfolio {
        let allowed = ctx
            .viewer
            .as_ref()
            .is_some_and(|v| v.is_admin() || project.is_owned_by(&v.uid));
        if !allowed {
            return Err(AppError::NotFound);
        }
    }

    let form = QuoteFormView::new(source::project(&project.id), ctx.viewer.as_ref());
    render(ProjectDetailTemplate { ctx, project, form })
}

/// Fields shared by every quote form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteSubmission {
    pub csrf_token: String,
    pub source: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub timeline: String,
    pub description: String,
    pub budget: Option<String>,
}

impl QuoteSubmission {
    pub fn request(&self) -> QuoteRequest {
        QuoteRequest {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            project_type: self.project_type.clone(),
            timeline: self.timeline.clone(),
            description: self.description.clone(),
            budget: self.budget.clone(),
        }
    }
}

/// Quote forms on the public pages. Anonymous visitors are allowed; a
/// signed-in visitor's quote is linked to them.
pub async fn submit_quote(
    db: web::Data<Db>,
    session: Session,
    form: web::Form<QuoteSubmission>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let origin = if source::is_public(&form.source) {
        form.source.as_str()
    } else {
        log::warn!("Quote posted with unexpected source '{}'", form.source);
        source::HOMEPAGE
    };
    let back = source::return_path(origin);

    let request = form.request();
    let errors = request.validate();
    if !errors.is_empty() {
        auth_session::set_flash(&session, &errors.join(". "));
        return Ok(redirect(&back));
    }

    let user_id = auth_session::get_user_id(&session);
    quote::submit(&db, &request, user_id.as_deref(), origin).await?;
    auth_session::set_flash(&session, QUOTE_SUBMITTED);
    Ok(redirect(&back))
}
