//! Quote → project conversion.
//!
//! The store has no multi-document transaction, so conversion runs in three
//! steps around a persisted marker:
//!
//! 1. reserve a project id on the quote as `pendingProjectId`;
//! 2. create the project under that id (create-if-absent);
//! 3. mark the quote `converted`, set `projectId`, clear the marker.
//!
//! Running the conversion again after a failure picks up the reserved id, so
//! it finishes the job instead of creating a second project.

use serde_json::{Value, json};

use crate::db::Db;
use crate::errors::AppError;
use crate::models::project::{self, ProjectFields};
use crate::store::{QUOTES, fields, new_document_id};
use super::queries::find_by_id;
use super::types::QuoteStatus;

/// Convert a quote into a customer project and return the project id.
///
/// A quote that is already converted returns its existing project id.
/// A failure after the project was written surfaces as
/// [`AppError::PartialConversion`]; calling again completes it.
pub async fn convert_to_project(
    db: &Db,
    quote_id: &str,
    project_fields: &ProjectFields,
    created_by: &str,
) -> Result<String, AppError> {
    let quote = find_by_id(db, quote_id).await?.ok_or(AppError::NotFound)?;

    if quote.status == QuoteStatus::Converted {
        if let Some(project_id) = quote.project_id {
            return Ok(project_id);
        }
    }

    let project_id = match quote.pending_project_id {
        Some(reserved) => {
            log::info!("Resuming conversion of quote {quote_id} into project {reserved}");
            reserved
        }
        None => {
            let reserved = new_document_id();
            db.store()
                .update(QUOTES, quote_id, fields([("pendingProjectId", json!(reserved))]))
                .await?;
            reserved
        }
    };

    let created = project::create_with_id(db, &project_id, project_fields, created_by).await?;
    if !created {
        log::info!("Project {project_id} already exists; finishing quote {quote_id}");
    }

    let finish = fields([
        ("status", json!(QuoteStatus::Converted)),
        ("projectId", json!(project_id)),
        ("pendingProjectId", Value::Null),
    ]);
    if let Err(cause) = db.store().update(QUOTES, quote_id, finish).await {
        log::error!(
            "Quote {quote_id} converted into project {project_id} but the quote was not updated: {cause}"
        );
        return Err(AppError::PartialConversion {
            quote_id: quote_id.to_string(),
            project_id,
            cause,
        });
    }

    Ok(project_id)
}
