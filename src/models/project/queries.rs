use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::Db;
use crate::errors::AppError;
use crate::store::{Document, PROJECTS, Query, to_fields};
use super::types::{Project, ProjectFields, ProjectPatch};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProject {
    #[serde(flatten)]
    fields: ProjectFields,
    #[serde(default)]
    created_by: String,
}

fn from_document(doc: Document) -> Option<Project> {
    match doc.decode::<StoredProject>() {
        Ok(stored) => Some(Project {
            id: doc.id,
            fields: stored.fields,
            created_by: stored.created_by,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }),
        Err(e) => {
            log::warn!("Skipping malformed project {}: {e}", doc.id);
            None
        }
    }
}

async fn fetch(db: &Db, query: Query) -> Result<Vec<Project>, AppError> {
    let docs = db.fetch(PROJECTS, &query).await?;
    Ok(docs.into_iter().filter_map(from_document).collect())
}

fn record(fields: &ProjectFields, created_by: &str) -> Result<crate::store::Fields, AppError> {
    let mut fields = fields.clone();
    fields.normalize();
    let mut data = to_fields(&fields)?;
    data.insert("createdBy".to_string(), json!(created_by));
    Ok(data)
}

/// Every project, newest first.
pub async fn find_all(db: &Db) -> Result<Vec<Project>, AppError> {
    fetch(db, Query::all().newest_first()).await
}

/// Public portfolio projects, newest first.
pub async fn find_portfolio(db: &Db) -> Result<Vec<Project>, AppError> {
    fetch(db, Query::where_eq("isPortfolio", true).newest_first()).await
}

/// Projects owned by one customer, newest first.
pub async fn find_for_customer(db: &Db, customer_id: &str) -> Result<Vec<Project>, AppError> {
    fetch(db, Query::where_eq("customerId", customer_id).newest_first()).await
}

/// `None` for an unknown id.
pub async fn find_by_id(db: &Db, id: &str) -> Result<Option<Project>, AppError> {
    let doc = db.store().get(PROJECTS, id).await?;
    Ok(doc.and_then(from_document))
}

/// Store a new project and return its id. A portfolio project is stored
/// without a customer.
pub async fn create(db: &Db, fields: &ProjectFields, created_by: &str) -> Result<String, AppError> {
    let data = record(fields, created_by)?;
    let id = db.store().insert(PROJECTS, data).await.inspect_err(|e| {
        log::error!("Error creating project: {e}");
    })?;
    Ok(id)
}

/// Create under a caller-chosen id; `false` when that id is already taken.
pub async fn create_with_id(
    db: &Db,
    id: &str,
    fields: &ProjectFields,
    created_by: &str,
) -> Result<bool, AppError> {
    let data = record(fields, created_by)?;
    Ok(db.store().insert_with_id(PROJECTS, id, data).await?)
}

/// Merge `patch` into the project. `AppError::NotFound` for an unknown id.
///
/// A customer patched onto a stored portfolio project is dropped.
pub async fn update(db: &Db, id: &str, patch: ProjectPatch) -> Result<(), AppError> {
    let stored_portfolio = if patch.assigns_customer() {
        find_by_id(db, id).await?.ok_or(AppError::NotFound)?.is_portfolio
    } else {
        false
    };
    let mut fields = patch.into_fields();
    if stored_portfolio {
        fields.insert("customerId".to_string(), Value::Null);
    }
    db.store().update(PROJECTS, id, fields).await.inspect_err(|e| {
        log::error!("Error updating project {id}: {e}");
    })?;
    Ok(())
}

/// Permanent removal. Quotes that reference the project keep their `projectId`.
pub async fn delete(db: &Db, id: &str) -> Result<(), AppError> {
    db.store().delete(PROJECTS, id).await?;
    Ok(())
}

pub async fn count(db: &Db) -> Result<usize, AppError> {
    Ok(db.store().query(PROJECTS, &Query::all()).await?.len())
}

/// Count projects whose status matches.
pub async fn count_by_status(db: &Db, status: super::ProjectStatus) -> Result<usize, AppError> {
    let query = Query::where_eq("status", Value::from(status.as_str()));
    Ok(db.store().query(PROJECTS, &query).await?.len())
}
