//! # Stored Records
//!
//! The record kinds the checkout persists.
//!
//! ```text
//! kind        key              body
//! ─────────   ──────────────   ─────────────────────────────────────────
//! catalog     catalog id       CatalogEntry
//! sale        sale uuid        SaleRecord  { receiptNumber, createdAt, sale }
//! held_sale   hold uuid        HeldSale    { heldAt, sale }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pdv_core::money::{self, Money};
use pdv_core::{CatalogEntry, Receipt, SalePayload};

use crate::error::StoreResult;
use crate::repository::Record;

impl Record for CatalogEntry {
    const KIND: &'static str = "catalog";

    fn key(&self) -> String {
        self.id.clone()
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A finalized sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: String,
    pub receipt_number: String,
    pub created_at: DateTime<Utc>,
    #[serde(with = "money::decimal")]
    pub total: Money,
    #[serde(with = "money::decimal")]
    pub change_due: Money,
    pub sale: SalePayload,
}

impl SaleRecord {
    /// Snapshots a submitted payload under a new id.
    pub fn new(sale: SalePayload, receipt_number: String) -> Self {
        let total = (sale.subtotal() - sale.discount_total).non_negative();
        let change_due = (sale.total_paid() - total).non_negative();

        SaleRecord {
            id: Uuid::new_v4().to_string(),
            receipt_number,
            created_at: Utc::now(),
            total,
            change_due,
            sale,
        }
    }

    /// The receipt handed back to the checkout screen.
    pub fn receipt(&self) -> StoreResult<Receipt> {
        Ok(Receipt(serde_json::to_value(self)?))
    }
}

impl Record for SaleRecord {
    const KIND: &'static str = "sale";

    fn key(&self) -> String {
        self.id.clone()
    }
}

// =============================================================================
// Held Sale
// =============================================================================

/// A suspended sale, parked for later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldSale {
    pub id: String,
    pub held_at: DateTime<Utc>,
    pub sale: SalePayload,
}

impl HeldSale {
    pub fn new(sale: SalePayload) -> Self {
        HeldSale {
            id: Uuid::new_v4().to_string(),
            held_at: Utc::now(),
            sale,
        }
    }

    /// Acknowledgement returned for a hold.
    pub fn receipt(&self) -> StoreResult<Receipt> {
        Ok(Receipt(serde_json::to_value(self)?))
    }
}

impl Record for HeldSale {
    const KIND: &'static str = "held_sale";

    fn key(&self) -> String {
        self.id.clone()
    }
}

// =============================================================================
// Receipt Numbers
// =============================================================================

/// Formats a receipt number: `YYYYMMDD-TT-NNNN`.
///
/// ## Format
/// - YYYYMMDD: Date of the sale
/// - TT: Terminal code (last 2 chars, `00` if shorter)
/// - NNNN: Daily sequence, from 1
///
/// ## Example
/// `20260131-01-0001`
pub fn receipt_number(date: NaiveDate, terminal_code: &str, sequence: u32) -> String {
    format!("{}{:04}", receipt_prefix(date, terminal_code), sequence)
}

/// Next daily sequence for this terminal: one past the highest already used.
///
/// Gaps left by deleted sales are not reused, and other terminals sharing the
/// store keep their own sequences.
pub fn next_receipt_sequence<'a>(
    existing: impl IntoIterator<Item = &'a SaleRecord>,
    date: NaiveDate,
    terminal_code: &str,
) -> u32 {
    let prefix = receipt_prefix(date, terminal_code);
    existing
        .into_iter()
        .filter_map(|s| s.receipt_number.strip_prefix(&prefix))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// `YYYYMMDD-TT-`
fn receipt_prefix(date: NaiveDate, terminal_code: &str) -> String {
    let chars: Vec<char> = terminal_code.chars().collect();
    let terminal: String = if chars.len() < 2 {
        "00".to_string()
    } else {
        chars[chars.len() - 2..].iter().collect()
    };

    format!("{}-{}-", date.format("%Y%m%d"), terminal)
}
