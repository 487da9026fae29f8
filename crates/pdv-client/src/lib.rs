//! # pdv-client: Checkout Orchestration
//!
//! Wires the pure [`pdv_core::Transaction`] to its collaborators: catalog
//! lookup, sale submission, debounced search input and configuration.
//!
//! ## Module Organization
//!
//! - [`session`] - `CheckoutSession`: finalize, suspend, cancel, lookup
//! - [`backend`] - `CatalogLookup` / `SaleSubmission` and their HTTP and local implementations
//! - [`debounce`] - Generation-counter debouncer on tokio timers
//! - [`config`] - `PdvConfig` (TOML + `PDV_*` environment)
//! - [`error`] - Backend, checkout and config errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = PdvConfig::load(None)?;
//! let backend = Arc::new(LocalBackend::from_database(&db));
//! let mut session = CheckoutSession::from_config(&config, backend.clone(), backend);
//!
//! session.scan("7891000100103").await?;
//! let due = session.transaction().balance_due();
//! session.transaction_mut().add_payment(PaymentMethod::Pix, due);
//! let receipt = session.finalize().await?;
//! ```

pub mod backend;
pub mod config;
pub mod debounce;
pub mod error;
pub mod session;

pub use backend::{CatalogLookup, HttpBackend, LocalBackend, SaleSubmission};
pub use config::{BackendMode, PdvConfig};
pub use debounce::Debouncer;
pub use error::{BackendError, BackendResult, CheckoutError, CheckoutResult, ConfigError};
pub use session::{ActionOutcome, CheckoutSession, LookupReply, PendingLookup};

/// Default log filter for the binaries, overridable with `RUST_LOG`.
pub const DEFAULT_LOG_FILTER: &str = "info,pdv=debug,pdv_core=debug,pdv_client=debug,sqlx=warn";
