//! # Domain Types
//!
//! Typed records used throughout the checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogEntry   │   │    LineItem     │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  catalog_id     │   │  method         │       │
//! │  │  code (barcode) │   │  name           │   │  amount (> 0)   │       │
//! │  │  name           │   │  unit_price     │   └─────────────────┘       │
//! │  │  unit_price     │   │  quantity (≥ 1) │                              │
//! │  │  stock_on_hand  │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SalePayload    │   │  PaymentState   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  what finalize  │   │  Collecting     │   │  Cash   Pix     │       │
//! │  │  and suspend    │   │  Satisfied      │   │  Credit Debit   │       │
//! │  │  send           │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every record serializes with camelCase keys and money as exact decimal
//! strings (see [`crate::money::decimal`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{self, Money};
use crate::validation::{validate_payment_amount, validate_price, validate_quantity, ValidationResult};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Catalog Entry
// =============================================================================

/// A product as returned by the catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogEntry {
    /// Catalog identifier.
    pub id: String,

    /// Barcode or internal code. An exact match on this triggers auto-add.
    #[serde(default)]
    pub code: String,

    /// Display name shown to the cashier.
    pub name: String,

    #[serde(with = "money::decimal")]
    #[ts(as = "String")]
    pub unit_price: Money,

    /// Units on hand. May be zero or negative; selling is still allowed.
    #[serde(default)]
    pub stock_on_hand: i64,
}

impl CatalogEntry {
    /// Creates a catalog entry, rejecting negative prices.
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        stock_on_hand: i64,
    ) -> ValidationResult<Self> {
        validate_price(unit_price)?;

        Ok(CatalogEntry {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            unit_price,
            stock_on_hand,
        })
    }

    /// Whether any stock is on hand. Informational only.
    #[inline]
    pub fn is_in_stock(&self) -> bool {
        self.stock_on_hand > 0
    }

    /// True when `term` is exactly this entry's code (a barcode scan).
    pub fn matches_code(&self, term: &str) -> bool {
        !self.code.is_empty() && self.code == term.trim()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the active transaction.
///
/// Fields are private so that `1 <= quantity <= MAX_ITEM_QUANTITY` and
/// `unit_price >= 0` hold for the whole life of the value. Deserializing goes
/// through [`LineItem::new`] as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "LineItemFields")]
#[ts(export)]
pub struct LineItem {
    catalog_id: String,
    name: String,
    #[serde(with = "money::decimal")]
    #[ts(as = "String")]
    unit_price: Money,
    quantity: i64,
}

impl LineItem {
    /// Creates a line item, validating price and quantity.
    pub fn new(
        catalog_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> ValidationResult<Self> {
        validate_price(unit_price)?;
        validate_quantity(quantity)?;

        Ok(LineItem {
            catalog_id: catalog_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        })
    }

    /// Creates a quantity-1 line item from a catalog entry.
    ///
    /// ## Price Freezing
    /// The price is captured now. A later catalog change does not alter a
    /// line already in the cart.
    pub fn from_entry(entry: &CatalogEntry) -> ValidationResult<Self> {
        LineItem::new(entry.id.clone(), entry.name.clone(), entry.unit_price, 1)
    }

    #[inline]
    pub fn catalog_id(&self) -> &str {
        &self.catalog_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Applies `delta`, clamping the result to `1..=MAX_ITEM_QUANTITY`.
    /// Returns the new quantity.
    pub(crate) fn adjust_quantity(&mut self, delta: i64) -> i64 {
        self.quantity = self
            .quantity
            .saturating_add(delta)
            .clamp(1, MAX_ITEM_QUANTITY);
        self.quantity
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemFields {
    catalog_id: String,
    name: String,
    #[serde(with = "money::decimal")]
    unit_price: Money,
    quantity: i64,
}

impl TryFrom<LineItemFields> for LineItem {
    type Error = ValidationError;

    fn try_from(raw: LineItemFields) -> Result<Self, Self::Error> {
        LineItem::new(raw.catalog_id, raw.name, raw.unit_price, raw.quantity)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Tender types accepted at the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash (dinheiro).
    Cash,
    /// Instant transfer.
    Pix,
    /// Credit card on the external terminal.
    Credit,
    /// Debit card on the external terminal.
    Debit,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Pix,
        PaymentMethod::Credit,
        PaymentMethod::Debit,
    ];

    /// Wire code (`"cash"`, `"pix"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Debit => "debit",
        }
    }

    /// Label printed on receipts and the terminal.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Credit => "Crédito",
            PaymentMethod::Debit => "Débito",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            "credit" | "credito" | "crédito" => Ok(PaymentMethod::Credit),
            "debit" | "debito" | "débito" => Ok(PaymentMethod::Debit),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A tender applied to the transaction.
///
/// Payments are never edited; they are appended or removed by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(try_from = "PaymentFields")]
#[ts(export)]
pub struct Payment {
    method: PaymentMethod,
    #[serde(with = "money::decimal")]
    #[ts(as = "String")]
    amount: Money,
}

impl Payment {
    /// Creates a payment. The amount must be strictly positive.
    pub fn new(method: PaymentMethod, amount: Money) -> CoreResult<Self> {
        validate_payment_amount(amount).map_err(|e| CoreError::InvalidPaymentAmount {
            reason: e.to_string(),
        })?;

        Ok(Payment { method, amount })
    }

    #[inline]
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    #[inline]
    pub fn amount(&self) -> Money {
        self.amount
    }
}

#[derive(Deserialize)]
struct PaymentFields {
    method: PaymentMethod,
    #[serde(with = "money::decimal")]
    amount: Money,
}

impl TryFrom<PaymentFields> for Payment {
    type Error = CoreError;

    fn try_from(raw: PaymentFields) -> Result<Self, Self::Error> {
        Payment::new(raw.method, raw.amount)
    }
}

// =============================================================================
// Payment State
// =============================================================================

/// Where the transaction stands in payment collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentState {
    /// More than one centavo still owed.
    Collecting,
    /// Paid in full (within one centavo). Finalize may be enabled.
    Satisfied,
}

// =============================================================================
// Actions
// =============================================================================

/// Checkout actions reachable from buttons and keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Action {
    /// Move focus to the search field. Always enabled.
    FocusSearch,
    /// Discard the transaction.
    Cancel,
    /// Park the transaction on the hold endpoint.
    Suspend,
    /// Submit the sale.
    Finalize,
}

// =============================================================================
// Sale Payload
// =============================================================================

/// A line as sent to the sale submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItemPayload {
    pub catalog_id: String,
    pub quantity: i64,
    #[serde(with = "money::decimal")]
    #[ts(as = "String")]
    pub unit_price: Money,
}

impl From<&LineItem> for SaleItemPayload {
    fn from(item: &LineItem) -> Self {
        SaleItemPayload {
            catalog_id: item.catalog_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// The finalized (or held) sale as submitted to the backend.
///
/// ```json
/// {
///   "customerName": "Consumidor Final",
///   "customerDocument": null,
///   "payments": [{ "method": "cash", "amount": "70.00" }],
///   "discountTotal": "30.00",
///   "items": [{ "catalogId": "p-1", "quantity": 2, "unitPrice": "50.00" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalePayload {
    pub customer_name: String,
    /// Digits only; `null` when no document was given.
    pub customer_document: Option<String>,
    pub payments: Vec<Payment>,
    #[serde(with = "money::decimal")]
    #[ts(as = "String")]
    pub discount_total: Money,
    pub items: Vec<SaleItemPayload>,
}

impl SalePayload {
    /// Sum of unit price × quantity over the payload items.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .map(|i| i.unit_price.multiply_quantity(i.quantity))
            .sum()
    }

    /// Sum of the payload payments.
    pub fn total_paid(&self) -> Money {
        self.payments.iter().map(Payment::amount).sum()
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Opaque receipt returned by the backend, passed through to display/print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(pub serde_json::Value);

impl Receipt {
    /// Reads a top-level string field, if present (e.g. `"receiptNumber"`).
    pub fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, cents: i64) -> CatalogEntry {
        CatalogEntry::new(id, format!("789{}", id), format!("Product {}", id), Money::from_cents(cents), 5)
            .unwrap()
    }

    #[test]
    fn test_catalog_entry_rejects_negative_price() {
        assert!(CatalogEntry::new("1", "", "x", Money::from_cents(-1), 0).is_err());
    }

    #[test]
    fn test_catalog_entry_code_match() {
        let e = entry("1", 100);
        assert!(e.matches_code("7891"));
        assert!(e.matches_code(" 7891 "));
        assert!(!e.matches_code("789"));

        let mut no_code = e.clone();
        no_code.code.clear();
        assert!(!no_code.matches_code(""));
    }

    #[test]
    fn test_line_item_invariants() {
        assert!(LineItem::new("1", "x", Money::from_cents(100), 0).is_err());
        assert!(LineItem::new("1", "x", Money::from_cents(-100), 1).is_err());

        let mut item = LineItem::from_entry(&entry("1", 250)).unwrap();
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.adjust_quantity(2), 3);
        assert_eq!(item.line_total().cents(), 750);
        assert_eq!(item.adjust_quantity(-10), 1);
        assert_eq!(item.adjust_quantity(i64::MIN), 1);
    }

    #[test]
    fn test_line_item_quantity_is_capped() {
        assert!(LineItem::new("1", "x", Money::from_cents(100), MAX_ITEM_QUANTITY + 1).is_err());

        let mut item = LineItem::from_entry(&entry("1", 1000)).unwrap();
        assert_eq!(item.adjust_quantity(i64::MAX), MAX_ITEM_QUANTITY);
        assert_eq!(item.line_total().cents(), 1000 * MAX_ITEM_QUANTITY);
        assert_eq!(item.adjust_quantity(-1), MAX_ITEM_QUANTITY - 1);
    }

    #[test]
    fn test_line_item_deserialize_is_validated() {
        let item: LineItem = serde_json::from_value(serde_json::json!({
            "catalogId": "1", "name": "Cafe", "unitPrice": "18.49", "quantity": 2
        }))
        .unwrap();
        assert_eq!(item.line_total().cents(), 3698);

        for quantity in [0, -3, MAX_ITEM_QUANTITY + 1] {
            let loaded = serde_json::from_value::<LineItem>(serde_json::json!({
                "catalogId": "1", "name": "Cafe", "unitPrice": "18.49", "quantity": quantity
            }));
            assert!(loaded.is_err(), "quantity {} should be rejected", quantity);
        }

        assert!(serde_json::from_value::<LineItem>(serde_json::json!({
            "catalogId": "1", "name": "Cafe", "unitPrice": "-1.00", "quantity": 1
        }))
        .is_err());
    }

    #[test]
    fn test_payment_rejects_non_positive() {
        assert!(Payment::new(PaymentMethod::Cash, Money::zero()).is_err());
        assert!(Payment::new(PaymentMethod::Pix, Money::from_cents(-1)).is_err());
        assert!(Payment::new(PaymentMethod::Debit, Money::from_cents(1)).is_ok());
    }

    #[test]
    fn test_payment_deserialize_is_validated() {
        let payment: Payment =
            serde_json::from_value(serde_json::json!({ "method": "pix", "amount": "12.50" })).unwrap();
        assert_eq!(payment.amount().cents(), 1250);
        assert_eq!(payment.method(), PaymentMethod::Pix);

        let zero = serde_json::from_value::<Payment>(serde_json::json!({ "method": "cash", "amount": "0" }));
        let err = zero.unwrap_err().to_string();
        assert!(err.contains("payment amount"), "{}", err);

        assert!(serde_json::from_value::<Payment>(serde_json::json!({ "method": "cash", "amount": -5 })).is_err());
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("Dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!("crédito".parse::<PaymentMethod>().unwrap(), PaymentMethod::Credit);
        assert_eq!("debito".parse::<PaymentMethod>().unwrap(), PaymentMethod::Debit);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = SalePayload {
            customer_name: "Consumidor Final".to_string(),
            customer_document: None,
            payments: vec![Payment::new(PaymentMethod::Cash, Money::from_cents(7000)).unwrap()],
            discount_total: Money::from_cents(3000),
            items: vec![SaleItemPayload {
                catalog_id: "p-1".to_string(),
                quantity: 2,
                unit_price: Money::from_cents(5000),
            }],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "customerName": "Consumidor Final",
                "customerDocument": null,
                "payments": [{ "method": "cash", "amount": "70.00" }],
                "discountTotal": "30.00",
                "items": [{ "catalogId": "p-1", "quantity": 2, "unitPrice": "50.00" }]
            })
        );
        assert_eq!(payload.subtotal().cents(), 10000);
        assert_eq!(payload.total_paid().cents(), 7000);
    }

    #[test]
    fn test_catalog_entry_from_backend_json() {
        let entry: CatalogEntry = serde_json::from_value(serde_json::json!({
            "id": "42",
            "name": "Arroz 5kg",
            "unitPrice": 27.9,
            "stockOnHand": 0,
            "code": "7896006716112"
        }))
        .unwrap();

        assert_eq!(entry.unit_price.cents(), 2790);
        assert!(!entry.is_in_stock());
    }

    #[test]
    fn test_receipt_field() {
        let receipt = Receipt(serde_json::json!({ "receiptNumber": "20260101-0001" }));
        assert_eq!(receipt.field("receiptNumber"), Some("20260101-0001"));
        assert_eq!(receipt.field("missing"), None);
    }
}
