//! # Local Backend
//!
//! Catalog lookup and sale submission against the injected repositories,
//! for terminals running without a remote server.
//!
//! ## Submit Flow
//! ```text
//! submit(sale)
//!   │
//!   ├── 1. next daily sequence  → receipt number YYYYMMDD-TT-NNNN
//!   ├── 2. for each item: stockOnHand -= quantity (may go negative)
//!   ├── 3. put SaleRecord
//!   └── 4. return SaleRecord as the receipt
//! ```
//!
//! The sale is written last. If any write fails, stock already taken is put
//! back and no sale is stored, so pressing finalize again cannot record the
//! same sale twice.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use pdv_core::{CatalogEntry, Receipt, SalePayload};
use pdv_store::records::{next_receipt_sequence, receipt_number};
use pdv_store::{Database, HeldSale, MemoryRepository, Repository, SaleRecord};

use crate::backend::{CatalogLookup, SaleSubmission};
use crate::error::BackendResult;

/// Backend over [`Repository`] trait objects.
#[derive(Clone)]
pub struct LocalBackend {
    catalog: Arc<dyn Repository<CatalogEntry>>,
    sales: Arc<dyn Repository<SaleRecord>>,
    held: Arc<dyn Repository<HeldSale>>,
    terminal_code: String,
    search_limit: usize,
    // Receipt sequencing reads then writes the sales list.
    submit_lock: Arc<Mutex<()>>,
}

impl LocalBackend {
    pub fn new(
        catalog: Arc<dyn Repository<CatalogEntry>>,
        sales: Arc<dyn Repository<SaleRecord>>,
        held: Arc<dyn Repository<HeldSale>>,
    ) -> Self {
        LocalBackend {
            catalog,
            sales,
            held,
            terminal_code: "01".to_string(),
            search_limit: 20,
            submit_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Backend over a SQLite database.
    pub fn from_database(db: &Database) -> Self {
        Self::new(
            Arc::new(db.records::<CatalogEntry>()),
            Arc::new(db.records::<SaleRecord>()),
            Arc::new(db.records::<HeldSale>()),
        )
    }

    /// Backend over in-memory repositories holding `catalog`.
    pub fn in_memory(catalog: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Self::new(
            Arc::new(MemoryRepository::with_records(catalog)),
            Arc::new(MemoryRepository::<SaleRecord>::new()),
            Arc::new(MemoryRepository::<HeldSale>::new()),
        )
    }

    pub fn with_terminal_code(mut self, code: impl Into<String>) -> Self {
        self.terminal_code = code.into();
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Applies sold quantities to the catalog.
    ///
    /// Returns the entries as they were before, in the order they were
    /// changed. On error everything already changed has been restored.
    async fn decrement_stock(&self, sale: &SalePayload) -> BackendResult<Vec<CatalogEntry>> {
        let mut previous = Vec::with_capacity(sale.items.len());

        for item in &sale.items {
            let entry = match self.catalog.get(&item.catalog_id).await {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    warn!(catalog_id = %item.catalog_id, "Sold item not in catalog");
                    continue;
                }
                Err(e) => {
                    self.restore_stock(&previous).await;
                    return Err(e.into());
                }
            };

            let mut updated = entry.clone();
            updated.stock_on_hand = updated.stock_on_hand.saturating_sub(item.quantity);
            if let Err(e) = self.catalog.put(&updated).await {
                self.restore_stock(&previous).await;
                return Err(e.into());
            }

            debug!(
                catalog_id = %updated.id,
                stock_on_hand = updated.stock_on_hand,
                "Stock decremented"
            );
            previous.push(entry);
        }

        Ok(previous)
    }

    /// Puts back entries captured by [`Self::decrement_stock`], newest first.
    async fn restore_stock(&self, previous: &[CatalogEntry]) {
        for entry in previous.iter().rev() {
            match self.catalog.put(entry).await {
                Ok(()) => debug!(catalog_id = %entry.id, "Stock restored"),
                Err(e) => error!(catalog_id = %entry.id, error = %e, "Failed to restore stock"),
            }
        }
    }
}

#[async_trait]
impl CatalogLookup for LocalBackend {
    /// Exact code matches first, then case-insensitive name/code substring
    /// matches, up to `search_limit`.
    async fn search(&self, term: &str) -> BackendResult<Vec<CatalogEntry>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let needle = term.to_lowercase();

        let (exact, rest): (Vec<CatalogEntry>, Vec<CatalogEntry>) = self
            .catalog
            .list()
            .await?
            .into_iter()
            .partition(|e| e.matches_code(term));

        let mut results = exact;
        results.extend(rest.into_iter().filter(|e| {
            e.name.to_lowercase().contains(&needle) || e.code.to_lowercase().contains(&needle)
        }));
        results.truncate(self.search_limit);

        debug!(term = %term, results = results.len(), "Local catalog search");
        Ok(results)
    }
}

#[async_trait]
impl SaleSubmission for LocalBackend {
    async fn submit(&self, sale: &SalePayload) -> BackendResult<Receipt> {
        let _guard = self.submit_lock.lock().await;

        let today = Utc::now().date_naive();
        let existing = self.sales.list().await?;
        let sequence = next_receipt_sequence(&existing, today, &self.terminal_code);
        let record = SaleRecord::new(
            sale.clone(),
            receipt_number(today, &self.terminal_code, sequence),
        );

        let previous = self.decrement_stock(sale).await?;
        if let Err(e) = self.sales.put(&record).await {
            warn!(receipt_number = %record.receipt_number, error = %e, "Sale write failed");
            self.restore_stock(&previous).await;
            return Err(e.into());
        }

        info!(
            sale_id = %record.id,
            receipt_number = %record.receipt_number,
            total = %record.total,
            "Sale recorded"
        );
        Ok(record.receipt()?)
    }

    async fn hold(&self, sale: &SalePayload) -> BackendResult<Receipt> {
        let held = HeldSale::new(sale.clone());
        self.held.put(&held).await?;

        info!(hold_id = %held.id, items = sale.items.len(), "Sale held");
        Ok(held.receipt()?)
    }
}
