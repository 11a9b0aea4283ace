//! Quote side of the option market-making control loop.
//!
//! Per option per cycle:
//! - `credit`: dynamic half-spread from book liquidity, risk floors and
//!   exponential smoothing
//! - `volume`: quote size from liquidity depth and remaining risk budget
//! - `quoter`: full cancel/replace of the resting bid and ask at
//!   theo ± credit

pub mod config;
pub mod credit;
pub mod error;
pub mod quoter;
pub mod volume;

pub use config::{CreditConfig, QuoterConfig, VolumeConfig};
pub use credit::{compute_credit, exposure_widen, global_widen_factor, CreditBook, CreditInputs};
pub use error::{MmError, Result};
pub use quoter::{refresh_quotes, QuoteOutcome, QuoteParams};
pub use volume::{compute_volume, VolumeInputs};
