use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::{csrf, session as auth_session};
use crate::db::Db;
use crate::errors::{AppError, render};
use crate::handlers::{CsrfOnly, redirect};
use crate::models::project::{self, CATEGORIES, ProjectForm, ProjectPatch, ProjectStatus};
use crate::models::quote::Quote;
use crate::models::user::{self, UserProfile};
use crate::templates_structs::{PageContext, ProjectFormTemplate, SelectOption};

const PROJECTS_TAB: &str = "/admin-dashboard?tab=projects";

/// Everything the project form needs besides the values themselves.
pub(crate) struct FormPage {
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub quote: Option<Quote>,
}

pub(crate) async fn render_form(
    db: &Db,
    session: &Session,
    profile: UserProfile,
    page: FormPage,
    form: ProjectForm,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let customers = user::find_customers(db).await?;
    let customer_choices: Vec<(String, String)> = customers
        .iter()
        .map(|c| (c.uid.clone(), format!("{} ({})", c.full_name(), c.email)))
        .collect();
    let mut customer_options = vec![SelectOption {
        value: String::new(),
        label: "No customer".to_string(),
        selected: form.customer_id.is_empty(),
    }];
    customer_options.extend(customer_choices.into_iter().map(|(value, label)| SelectOption {
        selected: value == form.customer_id,
        value,
        label,
    }));

    let categories: Vec<(&str, &str)> = CATEGORIES.iter().map(|c| (*c, *c)).collect();
    let statuses: Vec<(&str, &str)> = ProjectStatus::ALL
        .iter()
        .map(|s| (s.as_str(), s.label()))
        .collect();

    let ctx = PageContext::with_viewer(session, Some(profile), "/admin-dashboard");
    render(ProjectFormTemplate {
        ctx,
        heading: page.heading,
        action: page.action,
        submit_label: page.submit_label,
        categories: SelectOption::list(&categories, &form.category),
        statuses: SelectOption::list(&statuses, &form.status),
        customers: customer_options,
        form,
        errors,
        quote: page.quote,
    })
}

fn create_page() -> FormPage {
    FormPage {
        heading: "Create Project".to_string(),
        action: "/admin-dashboard/projects".to_string(),
        submit_label: "Create Project".to_string(),
        quote: None,
    }
}

fn edit_page(id: &str) -> FormPage {
    FormPage {
        heading: "Edit Project".to_string(),
        action: format!("/admin-dashboard/projects/{id}"),
        submit_label: "Save Changes".to_string(),
        quote: None,
    }
}

pub async fn new_form(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
) -> Result<HttpResponse, AppError> {
    let form = ProjectForm::from_fields(&Default::default());
    render_form(&db, &session, profile.into_inner(), create_page(), form, vec![]).await
}

pub async fn create(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    form: web::Form<ProjectForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let profile = profile.into_inner();
    let form = form.into_inner();

    let customers = user::find_customers(&db).await?;
    let fields = match form.to_fields(&customers) {
        Ok(fields) => fields,
        Err(errors) => return render_form(&db, &session, profile, create_page(), form, errors).await,
    };

    let id = project::create(&db, &fields, &profile.uid).await?;
    log::info!("Project {id} created by {}", profile.uid);
    auth_session::set_flash(&session, "Project created successfully");
    Ok(redirect(PROJECTS_TAB))
}

pub async fn edit_form(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let existing = project::find_by_id(&db, &id).await?.ok_or(AppError::NotFound)?;
    let form = ProjectForm::from_fields(&existing.fields);
    render_form(&db, &session, profile.into_inner(), edit_page(&id), form, vec![]).await
}

pub async fn update(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    path: web::Path<String>,
    form: web::Form<ProjectForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let form = form.into_inner();

    let customers = user::find_customers(&db).await?;
    let fields = match form.to_fields(&customers) {
        Ok(fields) => fields,
        Err(errors) => {
            return render_form(&db, &session, profile.into_inner(), edit_page(&id), form, errors).await;
        }
    };

    project::update(&db, &id, ProjectPatch::from(fields)).await?;
    auth_session::set_flash(&session, "Project updated successfully");
    Ok(redirect(PROJECTS_TAB))
}

pub async fn delete(
    db: web::Data<Db>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    project::delete(&db, &id).await?;
    log::info!("Project {id} deleted");
    auth_session::set_flash(&session, "Project deleted");
    Ok(redirect(PROJECTS_TAB))
}
