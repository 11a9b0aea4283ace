//! Error types for exchange access.

use thiserror::Error;
use volmm_core::{InstrumentId, OrderId};

/// Errors returned by `ExchangeClient` implementations.
///
/// An empty or one-sided book is NOT an error; it is the `None` case of
/// `top_of_book`. Errors here are rejections and transport failures.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(InstrumentId),

    #[error("Unknown order {order_id} for {instrument}")]
    UnknownOrder {
        instrument: InstrumentId,
        order_id: OrderId,
    },

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Result type alias for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;
