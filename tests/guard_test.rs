//! End-to-end checks of sign-in routing and the dashboard role guard.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use alliance::handlers::auth_handlers::INVALID_ROLE;
use alliance::handlers::public_handlers::QUOTE_SUBMITTED;
use alliance::models::project;
use alliance::models::quote;
use common::*;

fn body_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

// ============================================================================
// SIGN-IN ROUTING
// ============================================================================

#[actix_rt::test]
async fn test_admin_login_lands_on_admin_dashboard() {
    let db = setup_test_db();
    create_admin(&db).await;
    let app = test_app!(db);

    let resp = login!(app, ADMIN_EMAIL, TEST_PASSWORD);
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin-dashboard");
    let cookie = session_cookie(&resp).expect("session renewed on sign-in");

    let req = test::TestRequest::get()
        .uri("/admin-dashboard")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_customer_login_lands_on_customer_dashboard() {
    let db = setup_test_db();
    create_customer(&db).await;
    let app = test_app!(db);

    let resp = login!(app, CUSTOMER_EMAIL, TEST_PASSWORD);
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/customer-dashboard");
}

#[actix_rt::test]
async fn test_wrong_password_shows_message() {
    let db = setup_test_db();
    create_customer(&db).await;
    let app = test_app!(db);

    let resp = login!(app, CUSTOMER_EMAIL, "not-the-password");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("Incorrect password."));
}

#[actix_rt::test]
async fn test_unknown_role_is_refused() {
    let db = setup_test_db();
    let user = create_customer(&db).await;
    set_raw_role(&db, &user.uid, "contractor").await;
    let app = test_app!(db);

    let resp = login!(app, CUSTOMER_EMAIL, TEST_PASSWORD);
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains(INVALID_ROLE));
}

// ============================================================================
// ROLE GUARD
// ============================================================================

#[actix_rt::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let db = setup_test_db();
    let app = test_app!(db);

    for uri in ["/admin-dashboard", "/customer-dashboard", "/admin-dashboard/projects/new"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), "/login", "{uri}");
    }
}

#[actix_rt::test]
async fn test_admin_cannot_open_customer_dashboard() {
    let db = setup_test_db();
    create_admin(&db).await;
    let app = test_app!(db);

    let resp = login!(app, ADMIN_EMAIL, TEST_PASSWORD);
    let cookie = session_cookie(&resp).expect("session cookie");

    let req = test::TestRequest::get()
        .uri("/customer-dashboard")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[actix_rt::test]
async fn test_customer_cannot_open_admin_dashboard() {
    let db = setup_test_db();
    create_customer(&db).await;
    let app = test_app!(db);

    let resp = login!(app, CUSTOMER_EMAIL, TEST_PASSWORD);
    let cookie = session_cookie(&resp).expect("session cookie");

    let req = test::TestRequest::get()
        .uri("/admin-dashboard?tab=users")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

// ============================================================================
// ADMIN QUOTES
// ============================================================================

#[actix_rt::test]
async fn test_quote_marked_converted_by_hand_can_still_be_converted() {
    let db = setup_test_db();
    create_admin(&db).await;
    let id = quote::submit(&db, &sample_request(), None, quote::source::HOMEPAGE).await.unwrap();
    quote::update_status(&db, &id, quote::QuoteStatus::Converted, None).await.unwrap();
    let app = test_app!(db);

    let resp = login!(app, ADMIN_EMAIL, TEST_PASSWORD);
    let cookie = session_cookie(&resp).expect("session cookie");

    let req = test::TestRequest::get()
        .uri("/admin-dashboard?tab=quotes")
        .cookie(cookie.clone())
        .to_request();
    let body = body_text(&test::read_body(test::call_service(&app, req).await).await);
    assert!(body.contains(&format!("/admin-dashboard/quotes/{id}/convert")));
    assert!(!body.contains(r#"href="">View project"#));

    let req = test::TestRequest::get()
        .uri(&format!("/admin-dashboard/quotes/{id}/convert"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_empty_notes_field_clears_admin_notes() {
    let db = setup_test_db();
    create_admin(&db).await;
    let id = quote::submit(&db, &sample_request(), None, quote::source::CONTACT).await.unwrap();
    quote::update_status(&db, &id, quote::QuoteStatus::Approved, Some("Call back Monday"))
        .await
        .unwrap();
    let app = test_app!(db);

    let resp = login!(app, ADMIN_EMAIL, TEST_PASSWORD);
    let cookie = session_cookie(&resp).expect("session cookie");
    let req = test::TestRequest::get()
        .uri("/admin-dashboard?tab=quotes")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp).unwrap_or(cookie);
    let token = extract_csrf_token(&body_text(&test::read_body(resp).await));

    let req = test::TestRequest::post()
        .uri(&format!("/admin-dashboard/quotes/{id}/status"))
        .cookie(cookie)
        .set_form([
            ("csrf_token", token.as_str()),
            ("status", "rejected"),
            ("admin_notes", "  "),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let stored = quote::find_by_id(&db, &id).await.unwrap().unwrap();
    assert_eq!(stored.status, quote::QuoteStatus::Rejected);
    assert_eq!(stored.notes_text(), "");
}

// ============================================================================
// PUBLIC PAGES
// ============================================================================

#[actix_rt::test]
async fn test_anonymous_quote_from_homepage() {
    let db = setup_test_db();
    let app = test_app!(db);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp).expect("home page sets a session");
    let token = extract_csrf_token(&body_text(&test::read_body(resp).await));

    let req = test::TestRequest::post()
        .uri("/quotes")
        .cookie(cookie)
        .set_form([
            ("csrf_token", token.as_str()),
            ("source", "homepage"),
            ("first_name", "Sana"),
            ("last_name", "Mir"),
            ("email", "sana@example.com"),
            ("phone", "0300 1111111"),
            ("project_type", "commercial"),
            ("timeline", "asap"),
            ("description", "Office fit-out"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/#quote");
    let cookie = session_cookie(&resp).expect("flash stored in session");

    let quotes = quote::find_all(&db, None).await.unwrap();
    assert_eq!(quotes.len(), 1);
    assert!(quotes[0].is_anonymous());
    assert_eq!(quotes[0].source, "homepage");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").cookie(cookie).to_request()).await;
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains(QUOTE_SUBMITTED));
}

#[actix_rt::test]
async fn test_quote_without_csrf_token_is_rejected() {
    let db = setup_test_db();
    let app = test_app!(db);

    let req = test::TestRequest::post()
        .uri("/quotes")
        .set_form([("source", "homepage"), ("first_name", "Eve")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(quote::count(&db).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_customer_project_is_hidden_from_public() {
    let db = setup_test_db();
    let mut fields = sample_project("Private Villa", false);
    fields.customer_id = Some("someone".to_string());
    let private = project::create(&db, &fields, "admin").await.unwrap();
    let public = project::create(&db, &sample_project("Landmark Tower", true), "admin").await.unwrap();
    let app = test_app!(db);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/projects/{public}")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/projects/{private}")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/projects").to_request()).await;
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("Landmark Tower"));
    assert!(!body.contains("Private Villa"));
}

#[actix_rt::test]
async fn test_unknown_path_is_not_found() {
    let db = setup_test_db();
    let app = test_app!(db);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/no-such-page").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
