//! Application error types.

use thiserror::Error;

/// Top-level application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing instrument: {0}")]
    MissingInstrument(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] volmm_exchange::ExchangeError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] volmm_telemetry::TelemetryError),
}

/// Result type alias for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
