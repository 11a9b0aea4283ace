//! Error types for the quoting crate.

use thiserror::Error;
use volmm_exchange::ExchangeError;

/// Quoting failures.
#[derive(Debug, Error)]
pub enum MmError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// A quote input that must be a finite number was not; the instrument
    /// is skipped this cycle.
    #[error("Non-finite quote input: {0}")]
    NonFinite(&'static str),
}

/// Result type alias for quoting operations.
pub type Result<T> = std::result::Result<T, MmError>;
