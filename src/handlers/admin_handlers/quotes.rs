use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::{csrf, session as auth_session};
use crate::db::Db;
use crate::errors::AppError;
use crate::handlers::redirect;
use crate::models::project::{ProjectFields, ProjectForm};
use crate::models::quote::{self, QuoteStatus};
use crate::models::user::{self, UserProfile};
use super::projects::{FormPage, render_form};

const QUOTES_TAB: &str = "/admin-dashboard?tab=quotes";

#[derive(Deserialize)]
pub struct StatusForm {
    pub csrf_token: String,
    pub status: String,
    /// Absent keeps the stored notes; an empty field clears them.
    pub admin_notes: Option<String>,
}

/// Set a quote's status and, when given, the admin notes.
pub async fn update_status(
    db: web::Data<Db>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<StatusForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();

    let Some(status) = QuoteStatus::parse(&form.status) else {
        auth_session::set_flash(&session, "Unknown quote status");
        return Ok(redirect(QUOTES_TAB));
    };
    let notes = form.admin_notes.as_deref().map(str::trim);

    quote::update_status(&db, &id, status, notes).await?;
    auth_session::set_flash(&session, &format!("Quote marked {}", status.label()));
    Ok(redirect(QUOTES_TAB))
}

fn convert_page(quote: quote::Quote) -> FormPage {
    FormPage {
        heading: format!("Convert Quote from {}", quote.full_name()),
        action: format!("/admin-dashboard/quotes/{}/convert", quote.id),
        submit_label: "Create Project".to_string(),
        quote: Some(quote),
    }
}

/// Project form pre-filled from the quote.
pub async fn convert_form(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let quote = quote::find_by_id(&db, &id).await?.ok_or(AppError::NotFound)?;
    if quote.has_project() {
        auth_session::set_flash(&session, "This quote has already been converted");
        return Ok(redirect(QUOTES_TAB));
    }
    let form = ProjectForm::from_fields(&ProjectFields::from_quote(&quote));
    render_form(&db, &session, profile.into_inner(), convert_page(quote), form, vec![]).await
}

pub async fn convert(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    path: web::Path<String>,
    form: web::Form<ProjectForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let profile = profile.into_inner();
    let id = path.into_inner();
    let form = form.into_inner();

    let customers = user::find_customers(&db).await?;
    let fields = match form.to_fields(&customers) {
        Ok(fields) => fields,
        Err(errors) => {
            let quote = quote::find_by_id(&db, &id).await?.ok_or(AppError::NotFound)?;
            return render_form(&db, &session, profile, convert_page(quote), form, errors).await;
        }
    };

    match quote::convert_to_project(&db, &id, &fields, &profile.uid).await {
        Ok(project_id) => {
            log::info!("Quote {id} converted into project {project_id}");
            auth_session::set_flash(&session, "Quote converted to project successfully");
            Ok(redirect("/admin-dashboard?tab=projects"))
        }
        Err(AppError::PartialConversion { project_id, .. }) => {
            auth_session::set_flash(
                &session,
                &format!(
                    "Project {project_id} was created but the quote could not be updated. Convert the quote again to finish."
                ),
            );
            Ok(redirect(QUOTES_TAB))
        }
        Err(e) => Err(e),
    }
}
