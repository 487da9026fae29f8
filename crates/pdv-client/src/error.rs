//! # Client Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  BackendError   │  │  CheckoutError  │  │  ConfigError            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Rejected       │  │  Core           │  │  Io                     │ │
//! │  │  Transport      │  │  Backend        │  │  Parse / Serialize      │ │
//! │  │  Decode         │  │                 │  │  Invalid                │ │
//! │  │  Store          │  │  user_message() │  │  NoConfigPath           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Lookup failures are logged and swallowed (empty results).             │
//! │  Finalize/suspend failures surface as CheckoutError, cart untouched.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pdv_core::CoreError;
use pdv_store::StoreError;
use thiserror::Error;

/// Message shown when the backend gave no usable explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Não foi possível concluir a operação. Tente novamente.";

// =============================================================================
// Backend Error
// =============================================================================

/// Failures of the catalog lookup and sale submission collaborators.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    ///
    /// ## When This Occurs
    /// - Validation failure on the server (HTTP 4xx)
    /// - Server error (HTTP 5xx)
    ///
    /// `message` carries the body's `message` or `error` field if present.
    #[error("Backend rejected request (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// The request never got an answer (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The answer could not be decoded.
    #[error("Invalid backend response: {0}")]
    Decode(String),

    /// Local store failure (local backend only).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BackendError {
    /// Server-provided explanation, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// What a finalize, suspend or cancel attempt reports to the screen.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Rejected locally before any network call.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backend call failed; the transaction is unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CheckoutError {
    /// Text for the operator.
    ///
    /// ```text
    /// Core(..)                           → the rule that blocked it
    /// Backend(Rejected { message: Some }) → the server's message
    /// Backend(anything else)              → GENERIC_FAILURE_MESSAGE
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Core(err) => err.to_string(),
            CheckoutError::Backend(err) => err
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        }
    }
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration load/save failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available on this platform")]
    NoConfigPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
