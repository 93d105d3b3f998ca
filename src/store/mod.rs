//! Document store abstraction.
//!
//! Records live as JSON objects inside named collections. Every document
//! carries store-assigned `created_at` / `updated_at` server timestamps next
//! to its data. Queries support equality filters and "newest first"
//! ordering on creation time; a backend may refuse a filtered + ordered
//! query when it lacks the matching composite index, which callers handle
//! through [`strategy::QueryPlanner`].

pub mod memory;
pub mod postgres;
pub mod strategy;

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Collection names.
pub const PROJECTS: &str = "projects";
pub const QUOTES: &str = "quotes";
pub const USERS: &str = "users";
pub const ACCOUNTS: &str = "accounts";

/// The JSON object held by a document.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creation time descending, ties broken by id descending. Every backend
    /// and the in-memory fallback sort with this comparator.
    pub fn newest_first(a: &Document, b: &Document) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }

    /// A missing key compares equal to `null`.
    pub fn matches(&self, filters: &[Filter]) -> bool {
        filters
            .iter()
            .all(|f| self.data.get(&f.field).unwrap_or(&Value::Null) == &f.value)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }
}

/// Serialize a record into document fields.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Unavailable(format!(
            "record did not serialize to an object: {other}"
        ))),
    }
}

/// Build a `Fields` map from literal pairs.
pub fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Random 20-character document id.
pub fn new_document_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 10] = rng.random();
    hex::encode(bytes)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by_created: bool,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn where_eq(field: &str, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order_by_created = true;
        self
    }

    /// Same filters, no ordering.
    pub fn unordered(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order_by_created: false,
        }
    }

    /// Filter + order queries need a composite index on document stores.
    pub fn needs_composite_index(&self) -> bool {
        self.order_by_created && !self.filters.is_empty()
    }

    /// Key identifying the index a query needs, e.g. `projects(isPortfolio,createdAt)`.
    pub fn shape(&self, collection: &str) -> String {
        let mut fields: Vec<&str> = self.filters.iter().map(|f| f.field.as_str()).collect();
        fields.sort_unstable();
        fields.dedup();
        if self.order_by_created {
            fields.push("createdAt");
        }
        format!("{collection}({})", fields.join(","))
    }
}

#[derive(Debug)]
pub enum StoreError {
    NotFound { collection: String, id: String },
    /// The backend refused the query as posed (missing composite index).
    FailedPrecondition(String),
    Serialization(serde_json::Error),
    Db(sqlx::Error),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { collection, id } => {
                write!(f, "No document {collection}/{id}")
            }
            StoreError::FailedPrecondition(e) => write!(f, "Failed precondition: {e}"),
            StoreError::Serialization(e) => write!(f, "Serialization error: {e}"),
            StoreError::Db(e) => write!(f, "Database error: {e}"),
            StoreError::Unavailable(e) => write!(f, "Store unavailable: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Db(e)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Store a new document under a fresh id; stamps both timestamps.
    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError>;

    /// Create-if-absent. Returns `false` without writing when `id` exists.
    async fn insert_with_id(
        &self,
        collection: &str,
        id: &str,
        data: Fields,
    ) -> Result<bool, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Shallow-merge `patch` into the document and refresh `updated_at`.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;
}
