use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{cookie::Key, middleware::from_fn, web};

use crate::auth::middleware::{require_admin, require_customer};
use crate::errors::not_found_page;
use crate::handlers::{admin_handlers, auth_handlers, customer_handlers, public_handlers};

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(secure)
        .cookie_http_only(true)
        .build()
}

/// Every route of the site. Expects `web::Data<Db>` and
/// `web::Data<RateLimiter>` in app data and a session middleware around it.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Static files
        .service(actix_files::Files::new("/static", "./static"))
        // Public pages
        .route("/", web::get().to(public_handlers::home))
        .route("/about", web::get().to(public_handlers::about))
        .route("/contact", web::get().to(public_handlers::contact))
        .route("/projects", web::get().to(public_handlers::projects))
        .route("/projects/{id}", web::get().to(public_handlers::project_detail))
        .route("/quotes", web::post().to(public_handlers::submit_quote))
        // Auth
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/logout", web::post().to(auth_handlers::logout))
        // Admin dashboard; /projects/new BEFORE /projects/{id}
        .service(
            web::scope("/admin-dashboard")
                .wrap(from_fn(require_admin))
                .route("", web::get().to(admin_handlers::dashboard))
                .route("/projects/new", web::get().to(admin_handlers::projects::new_form))
                .route("/projects", web::post().to(admin_handlers::projects::create))
                .route("/projects/{id}/edit", web::get().to(admin_handlers::projects::edit_form))
                .route("/projects/{id}", web::post().to(admin_handlers::projects::update))
                .route("/projects/{id}/delete", web::post().to(admin_handlers::projects::delete))
                .route("/quotes/{id}/status", web::post().to(admin_handlers::quotes::update_status))
                .route("/quotes/{id}/convert", web::get().to(admin_handlers::quotes::convert_form))
                .route("/quotes/{id}/convert", web::post().to(admin_handlers::quotes::convert))
                .route("/users", web::post().to(admin_handlers::users::create)),
        )
        // Customer dashboard
        .service(
            web::scope("/customer-dashboard")
                .wrap(from_fn(require_customer))
                .route("", web::get().to(customer_handlers::dashboard))
                .route("/quotes", web::post().to(customer_handlers::submit_quote)),
        )
        .default_service(web::to(|| async { not_found_page() }));
}
