use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::{Document, DocumentStore, Fields, Query, StoreError, new_document_id};

/// Documents kept as JSONB rows of a single `documents` table.
///
/// Postgres serves every filter + order combination, so this backend never
/// reports a missing index.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct DocRow {
    id: String,
    data: Json<Fields>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocRow> for Document {
    fn from(row: DocRow) -> Self {
        Document {
            id: row.id,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQL for a query: `$1` is the collection, then one field/value pair per filter.
fn query_sql(query: &Query) -> String {
    let mut sql = String::from(
        "SELECT id, data, created_at, updated_at FROM documents WHERE collection = $1",
    );
    for (i, f) in query.filters.iter().enumerate() {
        let key = 2 + i * 2;
        let val = key + 1;
        if f.value.is_null() {
            // An absent key counts as null, matching the memory backend.
            sql.push_str(&format!(
                " AND (data -> ${key} IS NULL OR data -> ${key} = ${val})"
            ));
        } else {
            sql.push_str(&format!(" AND data -> ${key} = ${val}"));
        }
    }
    if query.order_by_created {
        sql.push_str(" ORDER BY created_at DESC, id DESC");
    }
    sql
}

#[async_trait]
impl DocumentStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError> {
        let id = new_document_id();
        sqlx::query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW())",
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: &str,
        data: Fields,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) \
             ON CONFLICT (collection, id) DO NOTHING",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocRow>(
            "SELECT id, data, created_at, updated_at FROM documents \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = NOW() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(patch))
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let sql = query_sql(query);
        let mut q = sqlx::query_as::<_, DocRow>(&sql).bind(collection);
        for f in &query.filters {
            q = q.bind(f.field.as_str()).bind(Json(f.value.clone()));
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn ordered_filter_sql_binds_field_and_value() {
        let sql = query_sql(&Query::where_eq("isPortfolio", true).newest_first());
        assert!(sql.contains("data -> $2 = $3"));
        assert!(sql.ends_with("ORDER BY created_at DESC, id DESC"));
    }

    #[test]
    fn null_filter_matches_absent_key() {
        let sql = query_sql(&Query::where_eq("customerId", Value::Null));
        assert!(sql.contains("data -> $2 IS NULL OR data -> $2 = $3"));
        assert!(!sql.contains("ORDER BY"));
    }
}
