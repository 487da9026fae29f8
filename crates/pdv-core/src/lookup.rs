//! # Lookup Session
//!
//! Search-field state for catalog lookup.
//!
//! Every lookup is tagged with a [`LookupTicket`]. A reply is applied only if
//! its ticket is still the newest one issued, so a slow reply for `"arr"`
//! can never overwrite the results for `"arroz"`.
//!
//! ```text
//! keystroke "a"    ──► ticket #1 ─────────────────────────┐ (slow)
//! keystroke "ar"   ──► ticket #2 ──────┐                  │
//!                                      ▼                  ▼
//!                              resolve(#2) → Results   resolve(#1) → Stale
//! ```
//!
//! The session does no I/O. The async side (debounce, backend call) lives in
//! the client crate and feeds replies back through [`SearchSession::resolve`].

use serde::{Deserialize, Serialize};

use crate::types::CatalogEntry;
use crate::validation::validate_search_query;

/// Identifies one lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupTicket {
    seq: u64,
    term: String,
}

impl LookupTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The trimmed term to send to the catalog.
    pub fn term(&self) -> &str {
        &self.term
    }
}

/// What applying a reply did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// A newer lookup was issued (or the field changed); reply dropped.
    Stale,
    /// Exactly one entry's code equals the term. The field was cleared and
    /// the caller adds the entry to the transaction.
    BarcodeHit(CatalogEntry),
    /// Results are now presented for manual selection (possibly none).
    Results(usize),
}

/// Search field text, presented results and the ticket sequence.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    input: String,
    results: Vec<CatalogEntry>,
    seq: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn results(&self) -> &[CatalogEntry] {
        &self.results
    }

    /// Replaces the field text (a keystroke).
    ///
    /// Returns a ticket for the new term, or `None` when the term is blank or
    /// too long; in that case the results are cleared. Either way, any ticket
    /// issued earlier becomes stale.
    pub fn set_input(&mut self, text: &str) -> Option<LookupTicket> {
        self.input = text.to_string();
        self.begin()
    }

    /// Issues a ticket for the current field text (explicit confirm).
    pub fn begin(&mut self) -> Option<LookupTicket> {
        self.seq += 1;

        match validate_search_query(&self.input) {
            Ok(term) if !term.is_empty() => Some(LookupTicket {
                seq: self.seq,
                term,
            }),
            _ => {
                self.results.clear();
                None
            }
        }
    }

    /// Whether a ticket is still the newest one.
    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        ticket.seq == self.seq
    }

    /// Applies catalog results for `ticket`.
    pub fn resolve(&mut self, ticket: &LookupTicket, entries: Vec<CatalogEntry>) -> LookupOutcome {
        if !self.is_current(ticket) {
            return LookupOutcome::Stale;
        }

        let mut hits = entries.iter().filter(|e| e.matches_code(&ticket.term));
        if let (Some(hit), None) = (hits.next(), hits.next()) {
            let hit = hit.clone();
            self.clear();
            return LookupOutcome::BarcodeHit(hit);
        }

        self.results = entries;
        LookupOutcome::Results(self.results.len())
    }

    /// Applies a failed lookup: results become empty, the field is kept.
    ///
    /// Returns `false` if the ticket was already stale.
    pub fn fail(&mut self, ticket: &LookupTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.results.clear();
        true
    }

    /// Picks a presented result. Clears the field on success.
    pub fn select(&mut self, index: usize) -> Option<CatalogEntry> {
        let entry = self.results.get(index).cloned()?;
        self.clear();
        Some(entry)
    }

    /// Empties the field and results, invalidating in-flight lookups.
    pub fn clear(&mut self) {
        self.input.clear();
        self.results.clear();
        self.seq += 1;
    }
}
