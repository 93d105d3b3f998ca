use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::{Document, DocumentStore, Fields, Query, StoreError, new_document_id};

/// In-process document store used for development and tests.
///
/// By default every query is served. In strict mode a filtered + ordered
/// query is refused with [`StoreError::FailedPrecondition`] unless each of
/// its filter fields was declared with [`MemoryStore::with_index`], the way
/// a hosted document database rejects queries without a composite index.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, Document>>>,
    last_stamp: Mutex<DateTime<Utc>>,
    indexes: Option<HashSet<(String, String)>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            last_stamp: Mutex::new(DateTime::<Utc>::MIN_UTC),
            indexes: None,
        }
    }

    /// Refuse filtered + ordered queries that have no declared index.
    pub fn strict_indexes() -> Self {
        Self {
            indexes: Some(HashSet::new()),
            ..Self::new()
        }
    }

    pub fn with_index(mut self, collection: &str, field: &str) -> Self {
        self.indexes
            .get_or_insert_with(HashSet::new)
            .insert((collection.to_string(), field.to_string()));
        self
    }

    /// Strictly increasing server time, so rapid inserts never share a stamp.
    fn server_time(&self) -> DateTime<Utc> {
        let mut last = self.last_stamp.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();
        let next = if now > *last {
            now
        } else {
            *last + Duration::microseconds(1)
        };
        *last = next;
        next
    }

    /// Store a document with an explicit creation time (fixtures and imports).
    pub async fn insert_at(
        &self,
        collection: &str,
        id: &str,
        data: Fields,
        created_at: DateTime<Utc>,
    ) {
        let doc = Document {
            id: id.to_string(),
            data,
            created_at,
            updated_at: created_at,
        };
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }

    fn check_index(&self, collection: &str, query: &Query) -> Result<(), StoreError> {
        let Some(indexes) = &self.indexes else {
            return Ok(());
        };
        if !query.needs_composite_index() {
            return Ok(());
        }
        let covered = query
            .filters
            .iter()
            .all(|f| indexes.contains(&(collection.to_string(), f.field.clone())));
        if covered {
            Ok(())
        } else {
            Err(StoreError::FailedPrecondition(format!(
                "The query requires an index: {}",
                query.shape(collection)
            )))
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError> {
        let id = new_document_id();
        let now = self.server_time();
        self.insert_at(collection, &id, data, now).await;
        Ok(id)
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: &str,
        data: Fields,
    ) -> Result<bool, StoreError> {
        let now = self.server_time();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Ok(false);
        }
        docs.insert(
            id.to_string(),
            Document {
                id: id.to_string(),
                data,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(true)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let now = self.server_time();
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        doc.data.extend(patch);
        doc.updated_at = now;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.check_index(collection, query)?;

        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|d| d.matches(&query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if query.order_by_created {
            docs.sort_by(Document::newest_first);
        }
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fields;
    use serde_json::json;

    #[tokio::test]
    async fn strict_mode_refuses_unindexed_ordered_filter() {
        let store = MemoryStore::strict_indexes().with_index("quotes", "status");
        store
            .insert("projects", fields([("isPortfolio", json!(true))]))
            .await
            .unwrap();

        let q = Query::where_eq("isPortfolio", true).newest_first();
        let err = store.query("projects", &q).await.unwrap_err();
        assert!(matches!(err, StoreError::FailedPrecondition(_)));

        // Filter-only and order-only queries are always served.
        assert_eq!(store.query("projects", &q.unordered()).await.unwrap().len(), 1);
        let ordered = Query::all().newest_first();
        assert_eq!(store.query("projects", &ordered).await.unwrap().len(), 1);

        // Declared index covers the query.
        let q = Query::where_eq("status", "pending").newest_first();
        assert!(store.query("quotes", &q).await.is_ok());
    }

    #[tokio::test]
    async fn update_merges_and_refreshes_updated_at() {
        let store = MemoryStore::new();
        let id = store
            .insert("quotes", fields([("status", json!("pending")), ("email", json!("a@b.c"))]))
            .await
            .unwrap();
        let before = store.get("quotes", &id).await.unwrap().unwrap();

        store
            .update("quotes", &id, fields([("status", json!("approved"))]))
            .await
            .unwrap();

        let after = store.get("quotes", &id).await.unwrap().unwrap();
        assert_eq!(after.data["status"], json!("approved"));
        assert_eq!(after.data["email"], json!("a@b.c"));
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update("projects", "nope", Fields::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn insert_with_id_does_not_overwrite() {
        let store = MemoryStore::new();
        assert!(store.insert_with_id("projects", "p1", fields([("title", json!("A"))])).await.unwrap());
        assert!(!store.insert_with_id("projects", "p1", fields([("title", json!("B"))])).await.unwrap());
        let doc = store.get("projects", "p1").await.unwrap().unwrap();
        assert_eq!(doc.data["title"], json!("A"));
    }
}
