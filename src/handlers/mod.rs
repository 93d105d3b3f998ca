pub mod admin_handlers;
pub mod auth_handlers;
pub mod customer_handlers;
pub mod public_handlers;

use actix_web::HttpResponse;
use serde::Deserialize;

/// 303 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}
