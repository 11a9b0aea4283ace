//! Error types for the risk crate.

use thiserror::Error;
use volmm_exchange::ExchangeError;
use volmm_pricing::PricingError;

/// Risk-side failures.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),
}

/// Result type alias for risk operations.
pub type Result<T> = std::result::Result<T, RiskError>;
