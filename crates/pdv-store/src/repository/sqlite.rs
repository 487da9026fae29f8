//! # SQLite Repository
//!
//! [`Repository`] over the `records` table. Bodies are JSON text.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use crate::repository::{Record, Repository};

/// Repository for one record kind in SQLite.
#[derive(Debug)]
pub struct SqliteRepository<T> {
    pool: SqlitePool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteRepository<T> {
    fn clone(&self) -> Self {
        SqliteRepository {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> SqliteRepository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteRepository {
            pool,
            _record: PhantomData,
        }
    }

    /// Number of records of this kind.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE kind = ?1")
            .bind(T::KIND)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl<T: Record> Repository<T> for SqliteRepository<T> {
    async fn get(&self, key: &str) -> StoreResult<Option<T>> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM records WHERE kind = ?1 AND key = ?2")
                .bind(T::KIND)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, record: &T) -> StoreResult<()> {
        let key = record.key();
        let body = serde_json::to_string(record)?;
        debug!(kind = T::KIND, key = %key, "Writing record");

        sqlx::query(
            r#"
            INSERT INTO records (kind, key, body, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (kind, key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(T::KIND)
        .bind(&key)
        .bind(&body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        debug!(kind = T::KIND, key = %key, "Deleting record");

        let result = sqlx::query("DELETE FROM records WHERE kind = ?1 AND key = ?2")
            .bind(T::KIND)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        let bodies: Vec<String> =
            sqlx::query_scalar("SELECT body FROM records WHERE kind = ?1 ORDER BY key")
                .bind(T::KIND)
                .fetch_all(&self.pool)
                .await?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, StoreError};
    use pdv_core::{CatalogEntry, Money};

    async fn repo() -> SqliteRepository<CatalogEntry> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.records()
    }

    fn entry(id: &str, name: &str) -> CatalogEntry {
        CatalogEntry::new(id, format!("789{}", id), name, Money::from_cents(990), 4).unwrap()
    }

    #[tokio::test]
    async fn test_put_get_replace() {
        let repo = repo().await;
        assert!(repo.get("1").await.unwrap().is_none());

        repo.put(&entry("1", "Arroz")).await.unwrap();
        let mut stored = repo.get("1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Arroz");

        stored.stock_on_hand = 1;
        repo.put(&stored).await.unwrap();
        assert_eq!(repo.get("1").await.unwrap().unwrap().stock_on_hand, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_delete() {
        let repo = repo().await;
        repo.put(&entry("b", "Feijao")).await.unwrap();
        repo.put(&entry("a", "Arroz")).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(repo.delete("a").await.unwrap());
        assert!(!repo.delete("a").await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_body_is_a_serialization_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO records (kind, key, body, updated_at) VALUES ('catalog', 'x', 'not json', '')")
            .execute(db.pool())
            .await
            .unwrap();

        let repo: SqliteRepository<CatalogEntry> = db.records();
        assert!(matches!(repo.get("x").await, Err(StoreError::Serialization(_))));
    }
}
