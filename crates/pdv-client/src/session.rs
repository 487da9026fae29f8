//! # Checkout Session
//!
//! One checkout screen: the transaction, the search field, and the two
//! backends.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  keystroke ──► on_search_input ──► PendingLookup ──(debounce)──┐       │
//! │  Enter     ──► search_now ─────────────────────────────────────┤       │
//! │                                                                 ▼       │
//! │                                   CatalogLookup::search ─► apply_lookup │
//! │                                                                 │       │
//! │                          BarcodeHit → add_item, field cleared ◄─┤       │
//! │                          Results    → shown for select_result ◄─┤       │
//! │                          failure    → empty results, logged   ◄─┘       │
//! │                                                                         │
//! │  F9  finalize ─► guard ─► SaleSubmission::submit ─► Ok: clear           │
//! │  F8  suspend  ─► guard ─► SaleSubmission::hold   ─► Ok: clear           │
//! │  Esc cancel   ─► guard ─► clear (no network)                            │
//! │                                Err: transaction untouched               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use pdv_core::{
    Action, CatalogEntry, CoreResult, LineItem, LookupOutcome, LookupTicket, Receipt, SearchSession,
    Transaction, DEFAULT_CUSTOMER_NAME,
};

use crate::backend::{CatalogLookup, SaleSubmission};
use crate::config::PdvConfig;
use crate::debounce::Debouncer;
use crate::error::{BackendResult, CheckoutResult};

// =============================================================================
// Lookup plumbing
// =============================================================================

/// A catalog reply tagged with the ticket it answers.
#[derive(Debug)]
pub struct LookupReply {
    pub ticket: LookupTicket,
    pub result: BackendResult<Vec<CatalogEntry>>,
}

/// A debounced lookup that runs without borrowing the session.
///
/// ```rust,ignore
/// if let Some(pending) = session.on_search_input("arroz") {
///     if let Some(reply) = pending.run().await {
///         session.apply_lookup(reply)?;
///     }
/// }
/// ```
pub struct PendingLookup {
    ticket: LookupTicket,
    generation: u64,
    debouncer: Debouncer,
    lookup: Arc<dyn CatalogLookup>,
}

impl PendingLookup {
    pub fn ticket(&self) -> &LookupTicket {
        &self.ticket
    }

    /// Waits out the debounce, then searches. `None` if a newer keystroke
    /// arrived in the meantime.
    pub async fn run(self) -> Option<LookupReply> {
        let PendingLookup {
            ticket,
            generation,
            debouncer,
            lookup,
        } = self;

        debouncer
            .run_after(generation, || async move {
                let result = lookup.search(ticket.term()).await;
                LookupReply { ticket, result }
            })
            .await
    }
}

/// What a dispatched shortcut did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    FocusSearch,
    Cancelled,
    Suspended(Receipt),
    Finalized(Receipt),
}

// =============================================================================
// Checkout Session
// =============================================================================

pub struct CheckoutSession {
    transaction: Transaction,
    search: SearchSession,
    lookup: Arc<dyn CatalogLookup>,
    submission: Arc<dyn SaleSubmission>,
    debouncer: Debouncer,
    default_customer_name: String,
}

impl CheckoutSession {
    pub fn new(lookup: Arc<dyn CatalogLookup>, submission: Arc<dyn SaleSubmission>) -> Self {
        CheckoutSession {
            transaction: Transaction::new(),
            search: SearchSession::new(),
            lookup,
            submission,
            debouncer: Debouncer::default(),
            default_customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
        }
    }

    /// Session using the terminal settings from `config`.
    pub fn from_config(
        config: &PdvConfig,
        lookup: Arc<dyn CatalogLookup>,
        submission: Arc<dyn SaleSubmission>,
    ) -> Self {
        Self::new(lookup, submission)
            .with_debounce(Debouncer::new(config.debounce()))
            .with_default_customer_name(&config.terminal.default_customer_name)
    }

    pub fn with_debounce(mut self, debouncer: Debouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    pub fn with_default_customer_name(mut self, name: &str) -> Self {
        self.default_customer_name = name.to_string();
        self
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Direct access for cart and payment edits.
    pub fn transaction_mut(&mut self) -> &mut Transaction {
        &mut self.transaction
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        self.transaction.is_enabled(action)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// A keystroke in the search field.
    ///
    /// Returns the debounced lookup to run, or `None` when the field is
    /// blank. Either way earlier pending lookups are superseded.
    pub fn on_search_input(&mut self, text: &str) -> Option<PendingLookup> {
        let generation = self.debouncer.bump();
        let ticket = self.search.set_input(text)?;

        Some(PendingLookup {
            ticket,
            generation,
            debouncer: self.debouncer.clone(),
            lookup: Arc::clone(&self.lookup),
        })
    }

    /// Explicit confirm: look up the current field text now.
    pub async fn search_now(&mut self) -> CoreResult<LookupOutcome> {
        self.debouncer.cancel();
        let ticket = match self.search.begin() {
            Some(ticket) => ticket,
            None => return Ok(LookupOutcome::Results(0)),
        };

        let result = self.lookup.search(ticket.term()).await;
        self.apply_lookup(LookupReply { ticket, result })
    }

    /// Sets the field text and looks it up immediately (scanner input).
    pub async fn scan(&mut self, text: &str) -> CoreResult<LookupOutcome> {
        self.search.set_input(text);
        self.search_now().await
    }

    /// Applies a lookup reply. A barcode hit is added to the transaction.
    ///
    /// Lookup failures never propagate: the result list is emptied and the
    /// failure logged.
    pub fn apply_lookup(&mut self, reply: LookupReply) -> CoreResult<LookupOutcome> {
        let LookupReply { ticket, result } = reply;

        let entries = match result {
            Ok(entries) => entries,
            Err(err) => {
                if self.search.fail(&ticket) {
                    warn!(term = %ticket.term(), error = %err, "Catalog lookup failed");
                    return Ok(LookupOutcome::Results(0));
                }
                return Ok(LookupOutcome::Stale);
            }
        };

        let outcome = self.search.resolve(&ticket, entries);
        match &outcome {
            LookupOutcome::Stale => debug!(seq = ticket.seq(), "Discarding stale lookup"),
            LookupOutcome::BarcodeHit(entry) => {
                debug!(catalog_id = %entry.id, "Barcode hit");
                self.transaction.add_item(entry)?;
            }
            LookupOutcome::Results(count) => debug!(term = %ticket.term(), count, "Lookup results"),
        }
        Ok(outcome)
    }

    /// Adds the presented result at `index`. Returns the updated line.
    pub fn select_result(&mut self, index: usize) -> CoreResult<Option<LineItem>> {
        match self.search.select(index) {
            Some(entry) => Ok(Some(self.transaction.add_item(&entry)?.clone())),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Finalize / Suspend / Cancel
    // =========================================================================

    /// Submits the sale. Clears the transaction only on success.
    pub async fn finalize(&mut self) -> CheckoutResult<Receipt> {
        self.transaction.ensure_finalizable()?;

        let payload = self.transaction.build_payload(&self.default_customer_name);
        match self.submission.submit(&payload).await {
            Ok(receipt) => {
                info!(
                    total = %self.transaction.total(),
                    change_due = %self.transaction.change_due(),
                    items = payload.items.len(),
                    "Sale finalized"
                );
                self.reset();
                Ok(receipt)
            }
            Err(err) => {
                error!(error = %err, "Finalize failed, transaction kept");
                Err(err.into())
            }
        }
    }

    /// Parks the sale on the hold endpoint. Clears only on success.
    pub async fn suspend(&mut self) -> CheckoutResult<Receipt> {
        self.transaction.ensure_not_empty()?;

        let payload = self.transaction.build_payload(&self.default_customer_name);
        match self.submission.hold(&payload).await {
            Ok(receipt) => {
                info!(items = payload.items.len(), "Sale suspended");
                self.reset();
                Ok(receipt)
            }
            Err(err) => {
                error!(error = %err, "Suspend failed, transaction kept");
                Err(err.into())
            }
        }
    }

    /// Discards the transaction. The caller confirms with the operator first.
    pub fn cancel(&mut self) -> CheckoutResult<()> {
        self.transaction.ensure_not_empty()?;

        info!(
            items = self.transaction.line_items().len(),
            total = %self.transaction.total(),
            "Sale cancelled"
        );
        self.reset();
        Ok(())
    }

    /// Routes a keyboard shortcut through the same guards as the buttons.
    pub async fn dispatch(&mut self, action: Action) -> CheckoutResult<ActionOutcome> {
        debug!(?action, enabled = self.is_enabled(action), "Dispatching action");

        match action {
            Action::FocusSearch => Ok(ActionOutcome::FocusSearch),
            Action::Cancel => self.cancel().map(|_| ActionOutcome::Cancelled),
            Action::Suspend => self.suspend().await.map(ActionOutcome::Suspended),
            Action::Finalize => self.finalize().await.map(ActionOutcome::Finalized),
        }
    }

    fn reset(&mut self) {
        self.transaction.clear();
        self.search.clear();
        self.debouncer.cancel();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
