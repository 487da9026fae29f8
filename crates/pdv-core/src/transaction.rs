//! # Transaction
//!
//! The in-progress sale: line items, discount, payments, customer.
//!
//! ## Payment State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            add_item / set_discount / add_payment / remove_payment       │
//! │                         (re-evaluate balance_due)                       │
//! │                                                                         │
//! │   ┌──────────────────┐   balance_due ≤ 0,01   ┌──────────────────┐     │
//! │   │    COLLECTING    │ ─────────────────────► │    SATISFIED     │     │
//! │   │ balance_due > ε  │ ◄───────────────────── │ finalize enabled │     │
//! │   └──────────────────┘   balance_due > 0,01   │ (if cart ≠ ∅)    │     │
//! │                                               └──────────────────┘     │
//! │                                                                         │
//! │   clear() ─► empty transaction (after finalize, suspend, cancel)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Values
//! Nothing below is stored; each is recomputed on demand.
//! ```text
//! subtotal    = Σ unit_price × quantity
//! total       = max(0, subtotal − discount)
//! total_paid  = Σ payment.amount
//! balance_due = max(0, total − total_paid)
//! change_due  = max(0, total_paid − total)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Action, CatalogEntry, LineItem, Payment, PaymentMethod, PaymentState, SaleItemPayload, SalePayload};
use crate::validation::{normalize_customer_name, normalize_document};
use crate::{BALANCE_TOLERANCE, CASH_DENOMINATIONS_CENTS};

/// The active checkout transaction.
///
/// A deserialized transaction is held to the same rules as a built one:
/// valid lines and payments, one line per catalog id, no negative discount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "TransactionFields")]
pub struct Transaction {
    line_items: Vec<LineItem>,
    discount: Money,
    payments: Vec<Payment>,
    customer_name: Option<String>,
    customer_document: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionFields {
    line_items: Vec<LineItem>,
    discount: Money,
    payments: Vec<Payment>,
    customer_name: Option<String>,
    customer_document: Option<String>,
}

impl TryFrom<TransactionFields> for Transaction {
    type Error = CoreError;

    fn try_from(raw: TransactionFields) -> Result<Self, Self::Error> {
        if raw.discount.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "discount".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        if let Some(dup) = raw.line_items.iter().find(|i| !seen.insert(i.catalog_id())) {
            return Err(ValidationError::InvalidFormat {
                field: "lineItems".to_string(),
                reason: format!("catalog id {} appears twice", dup.catalog_id()),
            }
            .into());
        }

        Ok(Transaction {
            line_items: raw.line_items,
            discount: raw.discount,
            payments: raw.payments,
            customer_name: raw.customer_name,
            customer_document: raw.customer_document,
        })
    }
}

impl Transaction {
    /// Creates an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn customer_document(&self) -> Option<&str> {
        self.customer_document.as_deref()
    }

    pub fn line_item(&self, catalog_id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|i| i.catalog_id() == catalog_id)
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.line_items.iter().map(LineItem::quantity).sum()
    }

    // =========================================================================
    // Cart Mutation
    // =========================================================================

    /// Adds one unit of a catalog entry.
    ///
    /// ## Behavior
    /// - Entry already in the cart: quantity + 1
    /// - Otherwise: new line with quantity 1, price frozen from the entry
    /// - Stock is not checked; out-of-stock entries are still added
    ///
    /// Fails only if the entry carries a negative price.
    pub fn add_item(&mut self, entry: &CatalogEntry) -> CoreResult<&LineItem> {
        let position = match self
            .line_items
            .iter()
            .position(|i| i.catalog_id() == entry.id)
        {
            Some(index) => {
                self.line_items[index].adjust_quantity(1);
                index
            }
            None => {
                self.line_items.push(LineItem::from_entry(entry)?);
                self.line_items.len() - 1
            }
        };

        let item = &self.line_items[position];
        debug!(
            catalog_id = %item.catalog_id(),
            quantity = item.quantity(),
            in_stock = entry.is_in_stock(),
            "Item added"
        );
        Ok(item)
    }

    /// Changes a line's quantity by `delta`, keeping it within
    /// `1..=MAX_ITEM_QUANTITY`.
    ///
    /// Returns the new quantity.
    pub fn change_quantity(&mut self, catalog_id: &str, delta: i64) -> CoreResult<i64> {
        let item = self
            .line_items
            .iter_mut()
            .find(|i| i.catalog_id() == catalog_id)
            .ok_or_else(|| CoreError::LineItemNotFound(catalog_id.to_string()))?;

        let quantity = item.adjust_quantity(delta);
        debug!(catalog_id = %catalog_id, delta, quantity, "Quantity changed");
        Ok(quantity)
    }

    /// Removes a line regardless of its quantity.
    pub fn remove_item(&mut self, catalog_id: &str) -> CoreResult<LineItem> {
        let index = self
            .line_items
            .iter()
            .position(|i| i.catalog_id() == catalog_id)
            .ok_or_else(|| CoreError::LineItemNotFound(catalog_id.to_string()))?;

        debug!(catalog_id = %catalog_id, "Item removed");
        Ok(self.line_items.remove(index))
    }

    /// Replaces the discount. Negative values are clamped to zero.
    ///
    /// No upper bound: a discount above the subtotal makes `total()` floor
    /// at zero.
    pub fn set_discount(&mut self, amount: Money) {
        self.discount = amount.non_negative();
        debug!(discount = %self.discount, "Discount set");
    }

    /// Sets the optional customer fields. Blank values are stored as absent;
    /// the document is reduced to digits.
    pub fn set_customer(&mut self, name: &str, document: &str) {
        self.customer_name = normalize_customer_name(name);
        self.customer_document = normalize_document(document);
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Appends a payment if `amount > 0`; otherwise does nothing.
    ///
    /// Returns whether a payment was appended.
    pub fn add_payment(&mut self, method: PaymentMethod, amount: Money) -> bool {
        match Payment::new(method, amount) {
            Ok(payment) => {
                self.payments.push(payment);
                debug!(
                    method = method.as_str(),
                    amount = %amount,
                    balance_due = %self.balance_due(),
                    state = ?self.payment_state(),
                    "Payment added"
                );
                true
            }
            Err(_) => {
                debug!(method = method.as_str(), amount = %amount, "Ignoring non-positive payment");
                false
            }
        }
    }

    /// Removes the payment at `index`.
    pub fn remove_payment(&mut self, index: usize) -> CoreResult<Payment> {
        if index >= self.payments.len() {
            return Err(CoreError::PaymentNotFound(index));
        }

        let payment = self.payments.remove(index);
        debug!(
            index,
            balance_due = %self.balance_due(),
            state = ?self.payment_state(),
            "Payment removed"
        );
        Ok(payment)
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    pub fn subtotal(&self) -> Money {
        self.line_items.iter().map(LineItem::line_total).sum()
    }

    pub fn total(&self) -> Money {
        (self.subtotal() - self.discount).non_negative()
    }

    pub fn total_paid(&self) -> Money {
        self.payments.iter().map(Payment::amount).sum()
    }

    pub fn balance_due(&self) -> Money {
        (self.total() - self.total_paid()).non_negative()
    }

    pub fn change_due(&self) -> Money {
        (self.total_paid() - self.total()).non_negative()
    }

    pub fn payment_state(&self) -> PaymentState {
        if self.balance_due() <= BALANCE_TOLERANCE {
            PaymentState::Satisfied
        } else {
            PaymentState::Collecting
        }
    }

    /// Amount to pre-fill in the next payment input.
    ///
    /// `Some(balance_due)` while anything is owed, `None` once paid.
    /// Purely a suggestion: nothing is ever paid automatically.
    pub fn suggested_payment_amount(&self) -> Option<Money> {
        let due = self.balance_due();
        if due.is_positive() {
            Some(due)
        } else {
            None
        }
    }

    /// Cash shortcuts: the exact balance followed by round banknotes that are
    /// below the balance, largest first.
    ///
    /// ```text
    /// balance R$ 37,50  →  [37,50, 20,00, 10,00, 5,00, 2,00]
    /// balance R$ 0,00   →  []
    /// ```
    pub fn cash_quick_amounts(&self) -> Vec<Money> {
        let due = self.balance_due();
        if !due.is_positive() {
            return Vec::new();
        }

        let mut amounts = vec![due];
        amounts.extend(
            CASH_DENOMINATIONS_CENTS
                .iter()
                .rev()
                .map(|&cents| Money::from_cents(cents))
                .filter(|note| *note < due),
        );
        amounts
    }

    // =========================================================================
    // Guards
    // =========================================================================

    /// Whether an action is currently allowed.
    ///
    /// ```text
    /// FocusSearch → always
    /// Cancel      → cart not empty
    /// Suspend     → cart not empty
    /// Finalize    → cart not empty AND state SATISFIED
    /// ```
    pub fn is_enabled(&self, action: Action) -> bool {
        match action {
            Action::FocusSearch => true,
            Action::Cancel | Action::Suspend => !self.is_empty(),
            Action::Finalize => self.ensure_finalizable().is_ok(),
        }
    }

    /// Errors with the reason finalize is not allowed yet.
    pub fn ensure_finalizable(&self) -> CoreResult<()> {
        self.ensure_not_empty()?;

        if self.payment_state() != PaymentState::Satisfied {
            return Err(CoreError::BalanceOutstanding {
                balance_due: self.balance_due(),
            });
        }

        Ok(())
    }

    /// Errors with `EmptyCart` when there are no line items.
    pub fn ensure_not_empty(&self) -> CoreResult<()> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        Ok(())
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Builds the submission payload.
    ///
    /// A blank customer name becomes `default_customer_name`
    /// (normally [`crate::DEFAULT_CUSTOMER_NAME`]).
    pub fn build_payload(&self, default_customer_name: &str) -> SalePayload {
        SalePayload {
            customer_name: self
                .customer_name
                .clone()
                .unwrap_or_else(|| default_customer_name.to_string()),
            customer_document: self.customer_document.clone(),
            payments: self.payments.clone(),
            discount_total: self.discount,
            items: self.line_items.iter().map(SaleItemPayload::from).collect(),
        }
    }

    /// Resets to an empty transaction.
    pub fn clear(&mut self) {
        *self = Transaction::default();
        debug!("Transaction cleared");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_CUSTOMER_NAME, MAX_ITEM_QUANTITY};

    fn entry(id: &str, cents: i64) -> CatalogEntry {
        CatalogEntry::new(id, format!("code-{}", id), format!("Item {}", id), Money::from_cents(cents), 10)
            .unwrap()
    }

    fn reais(value: i64) -> Money {
        Money::from_reais(value, 0)
    }

    #[test]
    fn test_add_same_item_twice_increments_quantity() {
        let mut tx = Transaction::new();
        let a = entry("A", 1000);

        tx.add_item(&a).unwrap();
        tx.add_item(&a).unwrap();

        assert_eq!(tx.line_items().len(), 1);
        assert_eq!(tx.line_items()[0].quantity(), 2);
        assert_eq!(tx.subtotal(), reais(20));
    }

    #[test]
    fn test_out_of_stock_items_are_added() {
        let mut tx = Transaction::new();
        let mut empty_shelf = entry("X", 500);
        empty_shelf.stock_on_hand = -3;

        tx.add_item(&empty_shelf).unwrap();
        assert_eq!(tx.line_items().len(), 1);
    }

    #[test]
    fn test_change_quantity_floors_at_one() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 1000)).unwrap();

        assert_eq!(tx.change_quantity("A", 4).unwrap(), 5);
        assert_eq!(tx.change_quantity("A", -10).unwrap(), 1);
        assert_eq!(tx.line_items().len(), 1);
        assert!(matches!(
            tx.change_quantity("missing", 1),
            Err(CoreError::LineItemNotFound(_))
        ));
    }

    #[test]
    fn test_huge_quantity_delta_is_capped() {
        let mut tx = Transaction::new();
        let a = entry("A", 1000);
        tx.add_item(&a).unwrap();

        assert_eq!(tx.change_quantity("A", i64::MAX).unwrap(), MAX_ITEM_QUANTITY);
        assert_eq!(tx.subtotal().cents(), 1000 * MAX_ITEM_QUANTITY);

        tx.add_item(&a).unwrap();
        assert_eq!(tx.line_items()[0].quantity(), MAX_ITEM_QUANTITY);

        tx.add_payment(PaymentMethod::Cash, Money::from_cents(i64::MAX));
        tx.add_payment(PaymentMethod::Cash, Money::from_cents(i64::MAX));
        assert_eq!(tx.total_paid().cents(), i64::MAX);
        assert_eq!(tx.change_due().cents(), i64::MAX - 1000 * MAX_ITEM_QUANTITY);
        assert_eq!(tx.payment_state(), PaymentState::Satisfied);
    }

    #[test]
    fn test_remove_item() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 1000)).unwrap();
        tx.add_item(&entry("B", 500)).unwrap();
        tx.change_quantity("A", 3).unwrap();

        let removed = tx.remove_item("A").unwrap();
        assert_eq!(removed.quantity(), 4);
        assert_eq!(tx.subtotal(), reais(5));
        assert!(tx.remove_item("A").is_err());
    }

    #[test]
    fn test_discount_is_clamped_and_total_floors() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 5000)).unwrap();

        tx.set_discount(Money::from_cents(-100));
        assert_eq!(tx.discount(), Money::zero());

        tx.set_discount(reais(80));
        assert_eq!(tx.discount(), reais(80));
        assert_eq!(tx.total(), Money::zero());
        assert_eq!(tx.payment_state(), PaymentState::Satisfied);
    }

    #[test]
    fn test_discount_then_exact_cash_payment() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 10000)).unwrap();
        tx.set_discount(reais(30));
        assert_eq!(tx.total(), reais(70));
        assert_eq!(tx.payment_state(), PaymentState::Collecting);

        assert!(tx.add_payment(PaymentMethod::Cash, reais(70)));
        assert_eq!(tx.balance_due(), Money::zero());
        assert_eq!(tx.change_due(), Money::zero());
        assert_eq!(tx.payment_state(), PaymentState::Satisfied);
        assert!(tx.is_enabled(Action::Finalize));
    }

    #[test]
    fn test_overpayment_gives_change() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 5000)).unwrap();

        tx.add_payment(PaymentMethod::Cash, reais(100));
        assert_eq!(tx.balance_due(), Money::zero());
        assert_eq!(tx.change_due(), reais(50));
    }

    #[test]
    fn test_split_payments() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 12000)).unwrap();

        tx.add_payment(PaymentMethod::Pix, reais(50));
        assert_eq!(tx.balance_due(), reais(70));
        tx.add_payment(PaymentMethod::Credit, reais(40));
        tx.add_payment(PaymentMethod::Debit, reais(30));
        assert_eq!(tx.payment_state(), PaymentState::Satisfied);
        assert_eq!(tx.payments().len(), 3);
    }

    #[test]
    fn test_one_centavo_tolerance() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 1001)).unwrap();

        tx.add_payment(PaymentMethod::Cash, reais(10));
        assert_eq!(tx.balance_due(), Money::from_cents(1));
        assert_eq!(tx.payment_state(), PaymentState::Satisfied);

        tx.change_quantity("A", 1).unwrap();
        assert_eq!(tx.payment_state(), PaymentState::Collecting);
    }

    #[test]
    fn test_non_positive_payment_is_ignored() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 1000)).unwrap();

        assert!(!tx.add_payment(PaymentMethod::Cash, Money::zero()));
        assert!(!tx.add_payment(PaymentMethod::Cash, Money::from_cents(-500)));
        assert!(tx.payments().is_empty());
    }

    #[test]
    fn test_removing_only_payment_reverts_to_collecting() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 1000)).unwrap();
        tx.add_payment(PaymentMethod::Cash, reais(10));
        assert!(tx.is_enabled(Action::Finalize));

        let removed = tx.remove_payment(0).unwrap();
        assert_eq!(removed.amount(), reais(10));
        assert_eq!(tx.payment_state(), PaymentState::Collecting);
        assert!(!tx.is_enabled(Action::Finalize));
        assert!(matches!(tx.remove_payment(0), Err(CoreError::PaymentNotFound(0))));
    }

    #[test]
    fn test_finalize_guard() {
        let mut tx = Transaction::new();
        // Empty cart is "satisfied" (nothing owed) but still cannot finalize.
        assert_eq!(tx.payment_state(), PaymentState::Satisfied);
        assert!(matches!(tx.ensure_finalizable(), Err(CoreError::EmptyCart)));

        tx.add_item(&entry("A", 1000)).unwrap();
        match tx.ensure_finalizable() {
            Err(CoreError::BalanceOutstanding { balance_due }) => assert_eq!(balance_due, reais(10)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_action_guards() {
        let mut tx = Transaction::new();
        assert!(tx.is_enabled(Action::FocusSearch));
        assert!(!tx.is_enabled(Action::Cancel));
        assert!(!tx.is_enabled(Action::Suspend));
        assert!(!tx.is_enabled(Action::Finalize));

        tx.add_item(&entry("A", 1000)).unwrap();
        assert!(tx.is_enabled(Action::Cancel));
        assert!(tx.is_enabled(Action::Suspend));
        assert!(!tx.is_enabled(Action::Finalize));
    }

    #[test]
    fn test_suggested_amount_tracks_balance() {
        let mut tx = Transaction::new();
        assert_eq!(tx.suggested_payment_amount(), None);

        tx.add_item(&entry("A", 4550)).unwrap();
        assert_eq!(tx.suggested_payment_amount(), Some(Money::from_cents(4550)));

        tx.add_payment(PaymentMethod::Pix, reais(20));
        assert_eq!(tx.suggested_payment_amount(), Some(Money::from_cents(2550)));
        // Suggesting never pays.
        assert_eq!(tx.payments().len(), 1);

        tx.set_discount(Money::from_cents(2550));
        assert_eq!(tx.suggested_payment_amount(), None);
    }

    #[test]
    fn test_cash_quick_amounts() {
        let mut tx = Transaction::new();
        assert!(tx.cash_quick_amounts().is_empty());

        tx.add_item(&entry("A", 3750)).unwrap();
        let cents: Vec<i64> = tx.cash_quick_amounts().iter().map(Money::cents).collect();
        assert_eq!(cents, vec![3750, 2000, 1000, 500, 200]);

        tx.add_payment(PaymentMethod::Cash, Money::from_cents(3650));
        let cents: Vec<i64> = tx.cash_quick_amounts().iter().map(Money::cents).collect();
        assert_eq!(cents, vec![100]);
    }

    #[test]
    fn test_build_payload_defaults_customer() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 5000)).unwrap();
        tx.add_item(&entry("A", 5000)).unwrap();
        tx.set_discount(reais(30));
        tx.add_payment(PaymentMethod::Cash, reais(70));

        let payload = tx.build_payload(DEFAULT_CUSTOMER_NAME);
        assert_eq!(payload.customer_name, "Consumidor Final");
        assert_eq!(payload.customer_document, None);
        assert_eq!(payload.discount_total, reais(30));
        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.items[0].quantity, 2);
        assert_eq!(payload.items[0].unit_price, reais(50));
        assert_eq!(payload.payments.len(), 1);
    }

    #[test]
    fn test_build_payload_with_customer() {
        let mut tx = Transaction::new();
        tx.set_customer("  Ana Souza ", "123.456.789-09");

        let payload = tx.build_payload(DEFAULT_CUSTOMER_NAME);
        assert_eq!(payload.customer_name, "Ana Souza");
        assert_eq!(payload.customer_document.as_deref(), Some("12345678909"));

        tx.set_customer("", "");
        let payload = tx.build_payload(DEFAULT_CUSTOMER_NAME);
        assert_eq!(payload.customer_name, DEFAULT_CUSTOMER_NAME);
        assert_eq!(payload.customer_document, None);
    }

    #[test]
    fn test_clear() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 1000)).unwrap();
        tx.add_payment(PaymentMethod::Cash, reais(5));
        tx.set_discount(reais(1));
        tx.set_customer("Ana", "1");

        tx.clear();
        assert_eq!(tx, Transaction::new());
    }

    #[test]
    fn test_deserialize_round_trip() {
        let mut tx = Transaction::new();
        tx.add_item(&entry("A", 1000)).unwrap();
        tx.change_quantity("A", 2).unwrap();
        tx.add_payment(PaymentMethod::Pix, reais(10));
        tx.set_discount(reais(1));

        let json = serde_json::to_value(&tx).unwrap();
        let loaded: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(loaded, tx);
    }

    #[test]
    fn test_deserialize_rejects_broken_state() {
        let base = serde_json::json!({
            "lineItems": [{ "catalogId": "A", "name": "Item A", "unitPrice": "10.00", "quantity": 1 }],
            "discount": 0,
            "payments": [{ "method": "cash", "amount": "5.00" }],
            "customerName": null,
            "customerDocument": null
        });
        assert!(serde_json::from_value::<Transaction>(base.clone()).is_ok());

        let mut zero_payment = base.clone();
        zero_payment["payments"][0]["amount"] = serde_json::json!("0");
        assert!(serde_json::from_value::<Transaction>(zero_payment).is_err());

        let mut zero_quantity = base.clone();
        zero_quantity["lineItems"][0]["quantity"] = serde_json::json!(0);
        assert!(serde_json::from_value::<Transaction>(zero_quantity).is_err());

        let mut negative_discount = base.clone();
        negative_discount["discount"] = serde_json::json!(-100);
        assert!(serde_json::from_value::<Transaction>(negative_discount).is_err());

        let mut duplicated = base;
        let line = duplicated["lineItems"][0].clone();
        duplicated["lineItems"].as_array_mut().unwrap().push(line);
        assert!(serde_json::from_value::<Transaction>(duplicated).is_err());
    }
}

// =============================================================================
// Property Tests
// =============================================================================
