//! Shared test infrastructure.
//!
//! - `setup_test_db()` - in-memory store that serves every query
//! - `setup_strict_db()` - in-memory store that refuses unindexed filter + order queries
//! - `FlakyStore` - wraps the memory store and fails chosen updates
//! - account/project/quote fixtures and HTTP helpers for the actix tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use alliance::auth::identity::{self, SignUp};
use alliance::db::Db;
use alliance::models::project::{ProjectFields, ProjectStatus};
use alliance::models::quote::QuoteRequest;
use alliance::models::user::{self, Role, UserProfile};
use alliance::store::{
    Document, DocumentStore, Fields, MemoryStore, Query, StoreError, USERS, fields,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_EMAIL: &str = "admin@alliance.test";
pub const CUSTOMER_EMAIL: &str = "customer@alliance.test";
pub const TEST_PASSWORD: &str = "password123";

// ============================================================================
// STORE SETUP
// ============================================================================

pub fn setup_test_db() -> Db {
    Db::memory()
}

/// Refuses filtered + ordered queries, like a hosted store without
/// composite indexes.
pub fn setup_strict_db() -> Db {
    Db::new(Arc::new(MemoryStore::strict_indexes()))
}

/// Memory store whose updates can be made to fail.
///
/// `fail_updates_after(n)` lets `n` more updates through, then every update
/// fails until `heal()`.
pub struct FlakyStore {
    inner: MemoryStore,
    updates_left: AtomicI64,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            updates_left: AtomicI64::new(-1),
        }
    }

    pub fn fail_updates_after(&self, n: i64) {
        self.updates_left.store(n, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.updates_left.store(-1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    fn backend_tag(&self) -> &'static str {
        "flaky"
    }

    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError> {
        self.inner.insert(collection, data).await
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: &str,
        data: Fields,
    ) -> Result<bool, StoreError> {
        self.inner.insert_with_id(collection, id, data).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let left = self.updates_left.load(Ordering::SeqCst);
        if left == 0 {
            return Err(StoreError::Unavailable("injected update failure".to_string()));
        }
        if left > 0 {
            self.updates_left.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.query(collection, query).await
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub async fn create_user(db: &Db, email: &str, first_name: &str, role: Role) -> UserProfile {
    let input = SignUp {
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        phone: "0300 1234567".to_string(),
        company: None,
        role,
    };
    let uid = identity::sign_up(db, &input, None)
        .await
        .expect("Failed to sign up test user");
    user::find_by_id(db, &uid)
        .await
        .expect("Failed to load profile")
        .expect("Profile missing after sign-up")
}

pub async fn create_admin(db: &Db) -> UserProfile {
    create_user(db, ADMIN_EMAIL, "Ada", Role::Admin).await
}

pub async fn create_customer(db: &Db) -> UserProfile {
    create_user(db, CUSTOMER_EMAIL, "Cara", Role::Customer).await
}

/// Overwrite a profile's stored role with an arbitrary string.
pub async fn set_raw_role(db: &Db, uid: &str, role: &str) {
    db.store()
        .update(USERS, uid, fields([("role", json!(role))]))
        .await
        .expect("Failed to set role");
}

pub fn sample_project(title: &str, is_portfolio: bool) -> ProjectFields {
    ProjectFields {
        title: title.to_string(),
        description: format!("{title} description"),
        category: "Commercial".to_string(),
        location: "Lahore".to_string(),
        status: ProjectStatus::InProgress,
        progress: 25,
        is_portfolio,
        ..Default::default()
    }
}

pub fn sample_request() -> QuoteRequest {
    QuoteRequest {
        first_name: "Bilal".to_string(),
        last_name: "Ahmed".to_string(),
        email: "bilal@example.com".to_string(),
        phone: "0321 7654321".to_string(),
        project_type: "residential".to_string(),
        timeline: "3-6months".to_string(),
        description: "Two-storey family house".to_string(),
        budget: None,
    }
}

// ============================================================================
// HTTP HELPERS
// ============================================================================

/// Build the full app around `$db` with a fresh session key.
#[macro_export]
macro_rules! test_app {
    ($db:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(alliance::routes::session_middleware(
                    actix_web::cookie::Key::generate(),
                    false,
                ))
                .app_data(actix_web::web::Data::new($db.clone()))
                .app_data(actix_web::web::Data::new(
                    alliance::auth::rate_limit::RateLimiter::new(),
                ))
                .configure(alliance::routes::configure),
        )
        .await
    };
}

/// Fetch `/login`, then post the credentials with its CSRF token and
/// session cookie. Evaluates to the POST response.
#[macro_export]
macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            actix_web::test::TestRequest::get().uri("/login").to_request(),
        )
        .await;
        let cookie = session_cookie(&resp).expect("login page sets a session");
        let body = actix_web::test::read_body(resp).await;
        let token = extract_csrf_token(std::str::from_utf8(&body).expect("utf-8 body"));
        actix_web::test::call_service(
            &$app,
            actix_web::test::TestRequest::post()
                .uri("/login")
                .cookie(cookie)
                .set_form([
                    ("csrf_token", token.as_str()),
                    ("email", $email),
                    ("password", $password),
                ])
                .to_request(),
        )
        .await
    }};
}

pub fn extract_csrf_token(html: &str) -> String {
    let re = Regex::new(r#"name="csrf_token"\s+value="([^"]+)""#).expect("Failed to compile regex");
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .expect("CSRF token not found in HTML")
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
