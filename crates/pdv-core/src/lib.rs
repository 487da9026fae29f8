//! # pdv-core: Pure Checkout Logic
//!
//! The cart, the payment state machine and the lookup session of a PDV
//! (ponto de venda) checkout screen. Nothing here touches the network or disk.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PDV Checkout Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              pdv-client (CheckoutSession, backends)             │   │
//! │  │    keystrokes ──► debounce ──► CatalogLookup                    │   │
//! │  │    F9 / F8 / Esc ──► SaleSubmission                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ pdv-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   money   │  │ transaction │  │  lookup  │  │   │
//! │  │   │ LineItem  │  │   Money   │  │ cart + pay  │  │ tickets  │  │   │
//! │  │   │  Payment  │  │  R$ text  │  │   guards    │  │  stale   │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pdv-store (Repository, SQLite)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (CatalogEntry, LineItem, Payment, SalePayload)
//! - [`money`] - Integer centavo amounts, Brazilian parsing and display
//! - [`transaction`] - Cart mutation, derived totals, payment state
//! - [`lookup`] - Sequence-tagged catalog lookups
//! - [`error`] - Domain error types
//! - [`validation`] - Input normalization
//!
//! ## Example Usage
//!
//! ```rust
//! use pdv_core::{CatalogEntry, Money, PaymentMethod, PaymentState, Transaction};
//!
//! let arroz = CatalogEntry::new("1", "789100", "Arroz 5kg", Money::parse("27,90").unwrap(), 12).unwrap();
//!
//! let mut tx = Transaction::new();
//! tx.add_item(&arroz).unwrap();
//! tx.add_payment(PaymentMethod::Cash, Money::parse("50").unwrap());
//!
//! assert_eq!(tx.payment_state(), PaymentState::Satisfied);
//! assert_eq!(tx.change_due().to_string(), "R$ 22,10");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lookup;
pub mod money;
pub mod transaction;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use lookup::{LookupOutcome, LookupTicket, SearchSession};
pub use money::Money;
pub use transaction::Transaction;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Customer name sent when the operator leaves the field blank.
pub const DEFAULT_CUSTOMER_NAME: &str = "Consumidor Final";

/// Remaining balance still treated as paid (one centavo).
pub const BALANCE_TOLERANCE: Money = Money::from_cents(1);

/// Largest quantity a single line may carry.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Banknotes offered as cash shortcuts, in centavos.
pub const CASH_DENOMINATIONS_CENTS: [i64; 7] = [200, 500, 1_000, 2_000, 5_000, 10_000, 20_000];
