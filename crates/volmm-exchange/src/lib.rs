//! Exchange access for the volmm option market maker.
//!
//! Everything the control loop needs from the venue goes through the
//! `ExchangeClient` trait: top-of-book, positions, pnl, trade polling,
//! resting-order management and order submission. `SimExchange` is a
//! deterministic in-memory implementation used by tests and the bundled
//! simulation binary; a live venue client would implement the same trait.

pub mod client;
pub mod error;
pub mod pacer;
pub mod sim;

pub use client::ExchangeClient;
pub use error::{ExchangeError, Result};
pub use pacer::{Pacer, PacerConfig};
pub use sim::SimExchange;
