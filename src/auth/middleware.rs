//! Role guard for the dashboards.
//!
//! Each guarded scope re-reads the signed-in principal's profile once per
//! request. No session, no profile, or the wrong role sends the visitor to
//! `/login`. On success the profile is stored in the request extensions, so
//! handlers take it as `web::ReqData<UserProfile>`.

use actix_session::SessionExt;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};

use crate::auth::session::get_user_id;
use crate::db::Db;
use crate::models::user::{self, Role};

pub async fn require_admin(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    require_role(Role::Admin, req, next).await
}

pub async fn require_customer(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    require_role(Role::Customer, req, next).await
}

async fn require_role(
    role: Role,
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let uid = get_user_id(&req.get_session());
    let profile = match (uid, req.app_data::<web::Data<Db>>()) {
        (Some(uid), Some(db)) => user::find_by_id(db, &uid).await?,
        (Some(_), None) => {
            log::error!("Role guard mounted without a Db handle");
            None
        }
        (None, _) => None,
    };

    match profile {
        Some(profile) if profile.role == role => {
            req.extensions_mut().insert(profile);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        other => {
            if let Some(p) = other {
                log::warn!(
                    "User {} with role {} denied {} area",
                    p.uid,
                    p.role.as_str(),
                    role.as_str()
                );
            }
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
