//! Quote submission, listing and status updates.

mod common;

use alliance::errors::AppError;
use alliance::models::quote::{self, QuoteStatus, source};
use common::*;

#[tokio::test]
async fn test_anonymous_homepage_quote_is_pending() {
    let db = setup_test_db();
    let mut request = sample_request();
    request.email = "  Bilal@Example.COM ".to_string();
    request.budget = Some("   ".to_string());

    let id = quote::submit(&db, &request, None, source::HOMEPAGE).await.unwrap();
    let stored = quote::find_by_id(&db, &id).await.unwrap().unwrap();

    assert_eq!(stored.status, QuoteStatus::Pending);
    assert!(stored.is_anonymous());
    assert_eq!(stored.source, "homepage");
    assert_eq!(stored.email, "bilal@example.com");
    assert_eq!(stored.budget, None);
    assert_eq!(stored.project_id, None);
}

#[tokio::test]
async fn test_signed_in_quote_is_listed_for_its_user() {
    let db = setup_test_db();
    let customer = create_customer(&db).await;
    let mine = quote::submit(&db, &sample_request(), Some(&customer.uid), source::CUSTOMER_DASHBOARD)
        .await
        .unwrap();
    quote::submit(&db, &sample_request(), None, source::CONTACT).await.unwrap();

    let listed = quote::find_for_user(&db, &customer.uid).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine);
    assert_eq!(quote::count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_update_status_sets_notes() {
    let db = setup_test_db();
    let id = quote::submit(&db, &sample_request(), None, source::HOMEPAGE).await.unwrap();

    quote::update_status(&db, &id, QuoteStatus::Approved, Some("Site visit booked"))
        .await
        .unwrap();
    let stored = quote::find_by_id(&db, &id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuoteStatus::Approved);
    assert_eq!(stored.notes_text(), "Site visit booked");

    // Without notes the previous ones stay.
    quote::update_status(&db, &id, QuoteStatus::Rejected, None).await.unwrap();
    let stored = quote::find_by_id(&db, &id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuoteStatus::Rejected);
    assert_eq!(stored.notes_text(), "Site visit booked");

    // Marking converted by hand records the notes but no project.
    quote::update_status(&db, &id, QuoteStatus::Converted, Some("Handled offline"))
        .await
        .unwrap();
    let stored = quote::find_by_id(&db, &id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuoteStatus::Converted);
    assert_eq!(stored.notes_text(), "Handled offline");
    assert!(!stored.has_project());

    // Empty notes clear the previous ones.
    quote::update_status(&db, &id, QuoteStatus::Converted, Some("")).await.unwrap();
    let stored = quote::find_by_id(&db, &id).await.unwrap().unwrap();
    assert_eq!(stored.admin_notes.as_deref(), Some(""));
    assert_eq!(stored.notes_text(), "");
}

#[tokio::test]
async fn test_update_status_unknown_quote_is_not_found() {
    let db = setup_test_db();
    let result = quote::update_status(&db, "nope", QuoteStatus::Approved, None).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_status_filter_works_without_index() {
    let db = setup_strict_db();
    let a = quote::submit(&db, &sample_request(), None, source::HOMEPAGE).await.unwrap();
    let b = quote::submit(&db, &sample_request(), None, source::CONTACT).await.unwrap();
    let c = quote::submit(&db, &sample_request(), None, source::HOMEPAGE).await.unwrap();
    quote::update_status(&db, &b, QuoteStatus::Approved, None).await.unwrap();

    let pending = quote::find_all(&db, Some(QuoteStatus::Pending)).await.unwrap();
    let pending_ids: Vec<&str> = pending.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(pending_ids, [c.as_str(), a.as_str()]);

    let all = quote::find_all(&db, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(quote::count_by_status(&db, QuoteStatus::Approved).await.unwrap(), 1);
}

#[test]
fn test_request_validation_reports_each_missing_field() {
    let mut request = sample_request();
    request.first_name.clear();
    request.email = "not-an-email".to_string();
    request.description = "   ".to_string();

    let errors = request.validate();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| e.contains("First name")));
    assert!(errors.iter().any(|e| e.contains("valid email")));
    assert!(errors.iter().any(|e| e.contains("Project description")));
    assert!(sample_request().validate().is_empty());
}
