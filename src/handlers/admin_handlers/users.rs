use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::identity::{self, AuthError, SignUp};
use crate::auth::{csrf, session as auth_session};
use crate::db::Db;
use crate::errors::AppError;
use crate::handlers::redirect;
use crate::models::user::{Role, UserForm, UserProfile};
use super::{DashboardView, render_dashboard};

/// "Create User" tab: creates the account and its profile.
pub async fn create(
    db: web::Data<Db>,
    session: Session,
    profile: web::ReqData<UserProfile>,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let admin = profile.into_inner();
    let form = form.into_inner();

    let errors = form.validate();
    let Some(role) = Role::parse(&form.role).filter(|_| errors.is_empty()) else {
        return show_errors(&db, &session, admin, form, errors).await;
    };

    let input = SignUp {
        email: form.email.clone(),
        password: form.password.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        phone: form.phone.clone(),
        company: Some(form.company.clone()),
        role,
    };

    match identity::sign_up(&db, &input, Some(&admin.uid)).await {
        Ok(uid) => {
            log::info!("User {uid} created by {}", admin.uid);
            auth_session::set_flash(&session, "User created successfully");
            Ok(redirect("/admin-dashboard?tab=users"))
        }
        Err(e @ (AuthError::EmailInUse | AuthError::WeakPassword | AuthError::InvalidEmail)) => {
            let errors = vec![e.message().to_string()];
            show_errors(&db, &session, admin, form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn show_errors(
    db: &Db,
    session: &Session,
    admin: UserProfile,
    mut form: UserForm,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    form.password.clear();
    let mut view = DashboardView::tab("create-user");
    view.user_form = form;
    view.user_errors = errors;
    render_dashboard(db, session, admin, view).await
}
