use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::Db;
use crate::errors::AppError;
use crate::store::{Document, QUOTES, Query, fields, to_fields};
use super::types::{Quote, QuoteRequest, QuoteStatus};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredQuote {
    #[serde(flatten)]
    request: QuoteRequest,
    #[serde(default)]
    status: QuoteStatus,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    admin_notes: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    pending_project_id: Option<String>,
}

fn from_document(doc: Document) -> Option<Quote> {
    match doc.decode::<StoredQuote>() {
        Ok(s) => Some(Quote {
            id: doc.id,
            request: s.request,
            status: s.status,
            user_id: s.user_id,
            source: s.source,
            admin_notes: s.admin_notes,
            project_id: s.project_id,
            pending_project_id: s.pending_project_id,
            created_at: doc.created_at,
        }),
        Err(e) => {
            log::warn!("Skipping malformed quote {}: {e}", doc.id);
            None
        }
    }
}

async fn fetch(db: &Db, query: Query) -> Result<Vec<Quote>, AppError> {
    let docs = db.fetch(QUOTES, &query).await?;
    Ok(docs.into_iter().filter_map(from_document).collect())
}

/// Record a quote request as `pending`. `user_id` is `None` for anonymous
/// visitors. Returns the new quote id.
pub async fn submit(
    db: &Db,
    request: &QuoteRequest,
    user_id: Option<&str>,
    source: &str,
) -> Result<String, AppError> {
    let mut data = to_fields(&request.trimmed())?;
    data.insert("userId".to_string(), json!(user_id));
    data.insert("status".to_string(), json!(QuoteStatus::Pending));
    data.insert("source".to_string(), json!(source));
    let id = db.store().insert(QUOTES, data).await.inspect_err(|e| {
        log::error!("Error submitting quote from {source}: {e}");
    })?;
    Ok(id)
}

/// All quotes, optionally restricted to one status, newest first.
pub async fn find_all(db: &Db, status: Option<QuoteStatus>) -> Result<Vec<Quote>, AppError> {
    let query = match status {
        Some(status) => Query::where_eq("status", status.as_str()),
        None => Query::all(),
    };
    fetch(db, query.newest_first()).await
}

/// Quotes submitted by one signed-in user, newest first.
pub async fn find_for_user(db: &Db, user_id: &str) -> Result<Vec<Quote>, AppError> {
    fetch(db, Query::where_eq("userId", user_id).newest_first()).await
}

pub async fn find_by_id(db: &Db, id: &str) -> Result<Option<Quote>, AppError> {
    let doc = db.store().get(QUOTES, id).await?;
    Ok(doc.and_then(from_document))
}

/// Set the status, and the admin notes when given. Any status may follow any
/// other.
pub async fn update_status(
    db: &Db,
    id: &str,
    status: QuoteStatus,
    admin_notes: Option<&str>,
) -> Result<(), AppError> {
    let mut patch = fields([("status", json!(status))]);
    if let Some(notes) = admin_notes {
        patch.insert("adminNotes".to_string(), json!(notes));
    }
    db.store().update(QUOTES, id, patch).await.inspect_err(|e| {
        log::error!("Error updating quote status {id}: {e}");
    })?;
    Ok(())
}

pub async fn count_by_status(db: &Db, status: QuoteStatus) -> Result<usize, AppError> {
    let query = Query::where_eq("status", Value::from(status.as_str()));
    Ok(db.store().query(QUOTES, &query).await?.len())
}

pub async fn count(db: &Db) -> Result<usize, AppError> {
    Ok(db.store().query(QUOTES, &Query::all()).await?.len())
}
