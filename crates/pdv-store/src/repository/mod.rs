//! # Repository Module
//!
//! Persistence behind a trait, so nothing above this crate depends on a
//! concrete storage mechanism.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LocalBackend / seed                                                   │
//! │       │                                                                 │
//! │       │  Arc<dyn Repository<CatalogEntry>>                             │
//! │       ▼                                                                 │
//! │  Repository<T: Record>                                                 │
//! │  ├── get(&self, key)                                                   │
//! │  ├── put(&self, record)      (insert or replace)                       │
//! │  ├── delete(&self, key)                                                │
//! │  └── list(&self)             (ordered by key)                          │
//! │       │                                                                 │
//! │       ├──────────────────────────┐                                      │
//! │       ▼                          ▼                                      │
//! │  SqliteRepository           MemoryRepository                           │
//! │  records(kind, key, body)   BTreeMap<key, T>                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreResult;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// A value that can be stored by a [`Repository`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Namespace for this record type (the `kind` column).
    const KIND: &'static str;

    /// Unique key within [`Record::KIND`].
    fn key(&self) -> String;
}

/// Keyed storage for one record type.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Fetches a record, `None` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<T>>;

    /// Inserts or replaces a record.
    async fn put(&self, record: &T) -> StoreResult<()>;

    /// Deletes a record. Returns whether it existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// All records of this type, ordered by key.
    async fn list(&self) -> StoreResult<Vec<T>>;
}
