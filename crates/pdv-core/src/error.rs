//! # Error Types
//!
//! Domain-specific error types for pdv-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pdv-core errors (this file)                                           │
//! │  ├── CoreError        - Checkout rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pdv-store errors (separate crate)                                     │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  pdv-client errors                                                     │
//! │  ├── BackendError     - Lookup / submission failures                   │
//! │  └── CheckoutError    - What the checkout screen sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → UI                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that several conditions are deliberately *not* errors: a payment of
//! zero is ignored, and a discount larger than the subtotal simply floors the
//! total at zero.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Checkout rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The operation needs at least one line item.
    ///
    /// ## When This Occurs
    /// - Finalize, suspend or cancel pressed on an empty cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Finalize attempted while money is still owed.
    ///
    /// ## User Workflow
    /// ```text
    /// Total R$ 70,00, paid R$ 50,00
    ///      │
    ///      ▼
    /// finalize (F9)
    ///      │
    ///      ▼
    /// BalanceOutstanding { balance_due: R$ 20,00 }
    ///      │
    ///      ▼
    /// UI keeps the finalize button disabled
    /// ```
    #[error("Balance of {balance_due} still outstanding")]
    BalanceOutstanding { balance_due: Money },

    /// No line item for the given catalog id.
    #[error("Line item not found: {0}")]
    LineItemNotFound(String),

    /// No payment at the given position.
    #[error("Payment not found at position {0}")]
    PaymentNotFound(usize),

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by constructors and parsers before anything reaches a transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a non-numeric amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
