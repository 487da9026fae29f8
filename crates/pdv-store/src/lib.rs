//! # pdv-store: Record Persistence for PDV Checkout
//!
//! Typed records behind the [`Repository`] trait, with a SQLite
//! implementation and an in-memory one.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PDV Checkout Data Flow                           │
//! │                                                                         │
//! │  LocalBackend (pdv-client)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pdv-store (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  Sqlite/Mem   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogEntry  │    │ 001_records  │  │   │
//! │  │   │               │    │ SaleRecord    │    │              │  │   │
//! │  │   │               │    │ HeldSale      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file from [store] database_path                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pdv_store::{Database, DbConfig, Repository};
//! use pdv_core::CatalogEntry;
//!
//! let db = Database::new(DbConfig::new("pdv.db")).await?;
//! let catalog = db.records::<CatalogEntry>();
//! let entries = catalog.list().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod records;
pub mod repository;

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use records::{HeldSale, SaleRecord};
pub use repository::{MemoryRepository, Record, Repository, SqliteRepository};
