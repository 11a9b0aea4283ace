//! Error types for the pricing oracle.

use thiserror::Error;

/// Pricing failures.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The model cannot be evaluated for these inputs.
    #[error("Degenerate pricing input: {0}")]
    Degenerate(String),
}

/// Result type alias for pricing operations.
pub type Result<T> = std::result::Result<T, PricingError>;
