//! Query strategies for "filter + newest first" reads.
//!
//! [`IndexedQuery`] hands the query to the store as posed. [`InMemorySortedQuery`]
//! asks only for the filtered set and sorts it locally with
//! [`Document::newest_first`], so both return the same order. The
//! [`QueryPlanner`] starts with the indexed strategy and switches a query
//! shape to the in-memory one the first time the store reports a missing
//! index.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Document, DocumentStore, Query, StoreError};

#[async_trait]
pub trait QueryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        store: &dyn DocumentStore,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError>;
}

pub struct IndexedQuery;

#[async_trait]
impl QueryStrategy for IndexedQuery {
    fn name(&self) -> &'static str {
        "indexed"
    }

    async fn run(
        &self,
        store: &dyn DocumentStore,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        store.query(collection, query).await
    }
}

pub struct InMemorySortedQuery;

#[async_trait]
impl QueryStrategy for InMemorySortedQuery {
    fn name(&self) -> &'static str {
        "in-memory-sorted"
    }

    async fn run(
        &self,
        store: &dyn DocumentStore,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let mut docs = store.query(collection, &query.unordered()).await?;
        if query.order_by_created {
            docs.sort_by(Document::newest_first);
        }
        Ok(docs)
    }
}

/// Picks a strategy per query shape and remembers shapes the store refused.
#[derive(Default)]
pub struct QueryPlanner {
    missing_indexes: Mutex<HashSet<String>>,
}

impl QueryPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_known_missing(&self, shape: &str) -> bool {
        self.missing_indexes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(shape)
    }

    fn remember_missing(&self, shape: String) -> bool {
        self.missing_indexes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(shape)
    }

    /// The strategy that will serve `query` on the next call.
    pub fn strategy_for(&self, collection: &str, query: &Query) -> &'static dyn QueryStrategy {
        if query.needs_composite_index() && self.is_known_missing(&query.shape(collection)) {
            &InMemorySortedQuery
        } else {
            &IndexedQuery
        }
    }

    pub async fn fetch(
        &self,
        store: &dyn DocumentStore,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let strategy = self.strategy_for(collection, query);
        match strategy.run(store, collection, query).await {
            Err(StoreError::FailedPrecondition(reason)) if query.needs_composite_index() => {
                if self.remember_missing(query.shape(collection)) {
                    log::warn!(
                        "{} store refused {} ({reason}); sorting in memory from now on",
                        store.backend_tag(),
                        query.shape(collection)
                    );
                }
                InMemorySortedQuery.run(store, collection, query).await
            }
            other => other,
        }
    }
}
