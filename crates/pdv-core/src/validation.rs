//! # Validation Module
//!
//! Input validation utilities for the checkout screen.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Input masks (UI)                                             │
//! │  ├── Currency mask, CPF/CNPJ mask                                      │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + Money::parse                                   │
//! │  ├── Strings normalized to typed values                                │
//! │  └── Nothing non-numeric reaches a Transaction                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Record constructors (LineItem::new, Payment::new)            │
//! │  └── Invariants hold from the moment a value exists                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest search term sent to the catalog.
pub const MAX_SEARCH_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog search term.
///
/// ## Rules
/// - Can be empty (the caller shows no results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed term.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(query.to_string())
}

/// Reduces a customer document (CPF/CNPJ) to its digits.
///
/// Masks like `123.456.789-09` or `12.345.678/0001-95` are stripped.
/// Returns `None` when no digits remain, which the sale payload sends as `null`.
///
/// ## Example
/// ```rust
/// use pdv_core::validation::normalize_document;
///
/// assert_eq!(normalize_document("123.456.789-09").as_deref(), Some("12345678909"));
/// assert_eq!(normalize_document("   "), None);
/// ```
pub fn normalize_document(document: &str) -> Option<String> {
    let digits: String = document.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Trims a customer name, returning `None` when blank.
pub fn normalize_customer_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, brindes)
///
/// ## Example
/// ```rust
/// use pdv_core::money::Money;
/// use pdv_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "unit price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  7891000100103 ").unwrap(), "7891000100103");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_normalize_document() {
        assert_eq!(
            normalize_document("12.345.678/0001-95").as_deref(),
            Some("12345678000195")
        );
        assert_eq!(normalize_document("").as_deref(), None);
        assert_eq!(normalize_document("---").as_deref(), None);
    }

    #[test]
    fn test_normalize_customer_name() {
        assert_eq!(normalize_customer_name("  Maria ").as_deref(), Some("Maria"));
        assert_eq!(normalize_customer_name("   "), None);
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(Money::from_cents(1)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
        assert!(validate_payment_amount(Money::from_cents(-500)).is_err());
    }
}
