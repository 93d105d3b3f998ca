use crate::db::Db;
use crate::errors::AppError;
use crate::store::{Document, Query, USERS, to_fields};
use super::types::{NewProfile, Role, UserProfile};

fn from_document(doc: Document) -> Option<UserProfile> {
    match doc.decode::<NewProfile>() {
        Ok(p) => Some(UserProfile {
            uid: doc.id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            phone: p.phone,
            company: p.company,
            role: p.role,
            created_by: p.created_by,
            created_at: doc.created_at,
        }),
        Err(e) => {
            log::warn!("Skipping malformed profile {}: {e}", doc.id);
            None
        }
    }
}

/// Profile for `uid`, or `None` when the principal has no profile record.
pub async fn find_by_id(db: &Db, uid: &str) -> Result<Option<UserProfile>, AppError> {
    let doc = db.store().get(USERS, uid).await?;
    Ok(doc.and_then(from_document))
}

/// Create the profile keyed by `uid`. Returns `false` if one already exists.
pub async fn create(db: &Db, uid: &str, profile: &NewProfile) -> Result<bool, AppError> {
    let data = to_fields(profile)?;
    Ok(db.store().insert_with_id(USERS, uid, data).await?)
}

/// All profiles, newest first.
pub async fn find_all(db: &Db) -> Result<Vec<UserProfile>, AppError> {
    let docs = db.fetch(USERS, &Query::all().newest_first()).await?;
    Ok(docs.into_iter().filter_map(from_document).collect())
}

/// Customers, by name, for the project form's owner selector.
pub async fn find_customers(db: &Db) -> Result<Vec<UserProfile>, AppError> {
    let docs = db
        .fetch(USERS, &Query::where_eq("role", Role::Customer.as_str()))
        .await?;
    let mut customers: Vec<UserProfile> = docs.into_iter().filter_map(from_document).collect();
    customers.sort_by(|a, b| {
        a.full_name()
            .to_lowercase()
            .cmp(&b.full_name().to_lowercase())
    });
    Ok(customers)
}

pub async fn count(db: &Db) -> Result<usize, AppError> {
    Ok(db.store().query(USERS, &Query::all()).await?.len())
}
