//! # Backends
//!
//! The two external collaborators of the checkout screen.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CheckoutSession                                                       │
//! │       │                                                                 │
//! │       ├── CatalogLookup::search(term)   → Vec<CatalogEntry>            │
//! │       └── SaleSubmission::submit(sale)  → Receipt                      │
//! │           SaleSubmission::hold(sale)    → Receipt                      │
//! │                    │                                                    │
//! │          ┌─────────┴──────────┐                                         │
//! │          ▼                    ▼                                         │
//! │    HttpBackend           LocalBackend                                  │
//! │    (reqwest)             (pdv-store Repository)                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use pdv_core::{CatalogEntry, Receipt, SalePayload};

use crate::error::BackendResult;

pub mod http;
pub mod local;

pub use http::HttpBackend;
pub use local::LocalBackend;

/// Search-by-code-or-name against the product catalog.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn search(&self, term: &str) -> BackendResult<Vec<CatalogEntry>>;
}

/// Persists finished or suspended sales.
#[async_trait]
pub trait SaleSubmission: Send + Sync {
    /// Records a finalized sale. Not retried on failure.
    async fn submit(&self, sale: &SalePayload) -> BackendResult<Receipt>;

    /// Parks a sale for later.
    async fn hold(&self, sale: &SalePayload) -> BackendResult<Receipt>;
}
