//! # SQLite Repository
//!
//! One logical collection inside the shared `documents` table.
//!
//! ## Storage Layout
//! ```text
//! ┌──────────────┬────────────────────────────┬──────────────────────────┐
//! │ collection   │ id                         │ body (JSON)              │
//! ├──────────────┼────────────────────────────┼──────────────────────────┤
//! │ dev_orders   │ order_0190b8c1e2a47c3d...  │ {"id":..,"status":..}    │
//! │ dev_seats    │ seat_0190b8c1f0c21a7e...   │ {"id":..,"name":..}      │
//! │ dev_managers │ boss@cafe.test             │ {"email":..,"admin":..}  │
//! └──────────────┴────────────────────────────┴──────────────────────────┘
//! ```
//!
//! Field lookups use `json_extract(body, '$.<field>')`. Rows come back in
//! rowid order, which is insertion order.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::{validate_field, Repository};
use crate::document::Document;
use crate::environment::Environment;
use crate::error::{DbError, DbResult};

/// Repository over one environment-prefixed collection.
#[derive(Debug)]
pub struct SqliteRepository<T> {
    pool: SqlitePool,
    collection: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteRepository<T> {
    fn clone(&self) -> Self {
        SqliteRepository {
            pool: self.pool.clone(),
            collection: self.collection.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> SqliteRepository<T> {
    /// Creates a repository for `T::COLLECTION` under `environment`'s prefix.
    pub fn new(pool: SqlitePool, environment: Environment) -> Self {
        SqliteRepository {
            pool,
            collection: environment.collection_name(T::COLLECTION),
            _marker: PhantomData,
        }
    }

    /// Physical collection name, prefix included.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn decode_all(bodies: Vec<String>) -> DbResult<Vec<T>> {
        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(DbError::from))
            .collect()
    }
}

#[async_trait]
impl<T: Document> Repository<T> for SqliteRepository<T> {
    async fn create(&self, doc: &T) -> DbResult<()> {
        let id = doc.document_id();
        let body = serde_json::to_string(doc)?;
        let now = Utc::now();

        debug!(collection = %self.collection, id = %id, "Creating document");

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(self.collection.as_str())
        .bind(id.as_str())
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate(T::COLLECTION, id.as_str()),
            other => other,
        })?;

        Ok(())
    }

    async fn read_all(&self) -> DbResult<Vec<T>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid",
        )
        .bind(self.collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        Self::decode_all(bodies)
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>> {
        let body: Option<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
        )
        .bind(self.collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        body.map(|b| serde_json::from_str(&b).map_err(DbError::from))
            .transpose()
    }

    async fn find_by_field(&self, field: &str, value: &Value) -> DbResult<Vec<T>> {
        validate_field(field)?;
        let path = format!("$.{}", field);

        const MATCH_SQL: &str = r#"
            SELECT body FROM documents
            WHERE collection = ?1 AND json_extract(body, ?2) = ?3
            ORDER BY rowid
        "#;

        let query = sqlx::query_scalar::<_, String>(MATCH_SQL)
            .bind(self.collection.as_str())
            .bind(path.as_str());

        // json_extract yields SQL values: booleans become 0/1, nested
        // arrays and objects come back as JSON text.
        let bodies = match value {
            Value::Null => {
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT body FROM documents
                    WHERE collection = ?1 AND json_extract(body, ?2) IS NULL
                    ORDER BY rowid
                    "#,
                )
                .bind(self.collection.as_str())
                .bind(path.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            Value::Bool(b) => query.bind(i64::from(*b)).fetch_all(&self.pool).await?,
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => query.bind(i).fetch_all(&self.pool).await?,
                (None, Some(f)) => query.bind(f).fetch_all(&self.pool).await?,
                (None, None) => query.bind(n.to_string()).fetch_all(&self.pool).await?,
            },
            Value::String(s) => query.bind(s.as_str()).fetch_all(&self.pool).await?,
            other => query.bind(other.to_string()).fetch_all(&self.pool).await?,
        };

        Self::decode_all(bodies)
    }

    async fn update_by_id(&self, id: &str, doc: &T) -> DbResult<()> {
        let body = serde_json::to_string(doc)?;

        debug!(collection = %self.collection, id = %id, "Updating document");

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = ?3, updated_at = ?4
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(self.collection.as_str())
        .bind(id)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(T::COLLECTION, id));
        }
        Ok(())
    }

    async fn replace_if_unchanged(&self, id: &str, current: &T, doc: &T) -> DbResult<()> {
        let expected = serde_json::to_string(current)?;
        let body = serde_json::to_string(doc)?;

        debug!(collection = %self.collection, id = %id, "Replacing document");

        // Bodies are written by serde_json from the same types, so equal
        // documents serialize to equal text.
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = ?3, updated_at = ?4
            WHERE collection = ?1 AND id = ?2 AND body = ?5
            "#,
        )
        .bind(self.collection.as_str())
        .bind(id)
        .bind(body)
        .bind(Utc::now())
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let present: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2)",
            )
            .bind(self.collection.as_str())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

            return Err(if present != 0 {
                warn!(collection = %self.collection, id = %id, "stale write rejected");
                DbError::stale(T::COLLECTION, id)
            } else {
                DbError::not_found(T::COLLECTION, id)
            });
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> DbResult<()> {
        debug!(collection = %self.collection, id = %id, "Deleting document");

        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(self.collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(T::COLLECTION, id));
        }
        Ok(())
    }

    async fn count(&self) -> DbResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
                .bind(self.collection.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }

    async fn exists(&self, id: &str) -> bool {
        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2)",
        )
        .bind(self.collection.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(found) => found != 0,
            Err(e) => {
                warn!(collection = %self.collection, id = %id, error = %e, "exists check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::contract;
    use tableside_core::{LineItem, Manager, Money, OrderSession, Seat};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory(), Environment::Test)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = test_db().await;
        contract::create_and_find(&db.orders()).await;
    }

    #[tokio::test]
    async fn test_read_all_and_count() {
        let db = test_db().await;
        contract::read_all_and_count(&db.orders()).await;
    }

    #[tokio::test]
    async fn test_find_by_field() {
        let db = test_db().await;
        contract::find_by_field(&db.orders()).await;
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        contract::update_and_delete(&db.orders()).await;
    }

    #[tokio::test]
    async fn test_stale_write_rejected() {
        let db = test_db().await;
        contract::stale_write_rejected(&db.orders()).await;
    }

    #[tokio::test]
    async fn test_seat_by_name() {
        let db = test_db().await;
        contract::seat_by_name(&db.seats()).await;
    }

    #[tokio::test]
    async fn test_bool_field() {
        let db = test_db().await;
        contract::bool_field(&db.managers()).await;
    }

    #[tokio::test]
    async fn test_environments_are_isolated() {
        let db = test_db().await;
        let test_orders = db.orders();
        let dev_orders: SqliteRepository<OrderSession> =
            SqliteRepository::new(db.pool().clone(), Environment::Development);

        assert_eq!(test_orders.collection(), "test_orders");
        assert_eq!(dev_orders.collection(), "dev_orders");

        let order = OrderSession::new(
            "store_a",
            "seat_1",
            vec![LineItem::new("p1", 1, Money::from_minor(100))],
        )
        .unwrap();
        test_orders.create(&order).await.unwrap();

        assert!(test_orders.exists(order.id()).await);
        assert!(!dev_orders.exists(order.id()).await);
        assert_eq!(dev_orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exists_is_false_after_close() {
        let db = test_db().await;
        let seats: SqliteRepository<Seat> = db.seats();
        let seat = Seat::new("store_a", "Table 1").unwrap();
        seats.create(&seat).await.unwrap();

        db.close().await;
        assert!(!seats.exists(&seat.id).await);
    }

    #[tokio::test]
    async fn test_manager_keyed_by_email() {
        let db = test_db().await;
        let managers = db.managers();
        let manager = Manager::new("boss@cafe.test", "hash".into(), false).unwrap();
        managers.create(&manager).await.unwrap();

        let err = managers.create(&manager).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "boss@cafe.test"));
    }
}
