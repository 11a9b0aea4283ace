//! Observability for the volmm option market maker.
//!
//! Structured logging via `tracing` plus a JSON-Lines recorder that writes
//! one row per instrument per control-loop cycle for offline analysis.

pub mod error;
pub mod logging;
pub mod recorder;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use recorder::{CycleRecord, JsonLinesRecorder};
