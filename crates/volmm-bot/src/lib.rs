//! Control loop driver for the volmm option market maker.
//!
//! Sequences the full cycle once per interval: read the underlying,
//! aggregate portfolio delta, refresh each option's quotes with a
//! dynamically computed credit and volume, hedge the residual delta in the
//! underlying, record, sleep.

pub mod app;
pub mod config;
pub mod error;

pub use app::{Application, CycleReport};
pub use config::{AppConfig, SimConfig};
pub use error::{AppError, AppResult};
