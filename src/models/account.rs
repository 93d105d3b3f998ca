//! Credential records in the `accounts` collection, keyed by uid.

use serde::{Deserialize, Serialize};

use crate::db::Db;
use crate::store::{ACCOUNTS, Query, StoreError, to_fields};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountRecord {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub disabled: bool,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub uid: String,
    pub record: AccountRecord,
}

/// Email is stored lower-cased; lookups normalise the same way.
pub async fn find_by_email(db: &Db, email: &str) -> Result<Option<Account>, StoreError> {
    let email = email.trim().to_lowercase();
    let docs = db
        .store()
        .query(ACCOUNTS, &Query::where_eq("email", email))
        .await?;
    match docs.into_iter().next() {
        Some(doc) => Ok(Some(Account {
            record: doc.decode()?,
            uid: doc.id,
        })),
        None => Ok(None),
    }
}

/// Store a new account and return its uid.
pub async fn create(db: &Db, record: &AccountRecord) -> Result<String, StoreError> {
    let mut record = record.clone();
    record.email = record.email.trim().to_lowercase();
    db.store().insert(ACCOUNTS, to_fields(&record)?).await
}

/// Remove an account; used to roll back a sign-up whose profile write failed.
pub async fn delete(db: &Db, uid: &str) -> Result<(), StoreError> {
    db.store().delete(ACCOUNTS, uid).await
}
