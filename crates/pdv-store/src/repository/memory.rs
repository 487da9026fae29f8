//! # Memory Repository
//!
//! [`Repository`] held in process memory. Used by tests and by terminals
//! running without a database file. Clones share the same map.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::repository::{Record, Repository};

#[derive(Debug)]
pub struct MemoryRepository<T> {
    records: Arc<RwLock<BTreeMap<String, T>>>,
}

impl<T> Clone for MemoryRepository<T> {
    fn clone(&self) -> Self {
        MemoryRepository {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        MemoryRepository {
            records: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-filled with `records`.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records.into_iter().map(|r| (r.key(), r)).collect();
        MemoryRepository {
            records: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn get(&self, key: &str) -> StoreResult<Option<T>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, record: &T) -> StoreResult<()> {
        self.records
            .write()
            .await
            .insert(record.key(), record.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.records.write().await.remove(key).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdv_core::{CatalogEntry, Money};

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry::new(id, "", format!("Item {}", id), Money::from_cents(100), 1).unwrap()
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let repo = MemoryRepository::with_records(vec![entry("2"), entry("1")]);
        let other = repo.clone();

        other.put(&entry("3")).await.unwrap();
        assert_eq!(repo.len().await, 3);

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = MemoryRepository::with_records(vec![entry("1")]);
        assert!(repo.delete("1").await.unwrap());
        assert!(repo.get("1").await.unwrap().is_none());
        assert!(repo.is_empty().await);
    }
}
