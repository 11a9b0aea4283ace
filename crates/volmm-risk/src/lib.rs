//! Exposure side of the control loop.
//!
//! `delta` aggregates position-weighted option deltas plus the underlying
//! position into one portfolio delta; `hedger` trades the underlying with a
//! single IOC order to bring that delta back inside a deadband.

pub mod delta;
pub mod error;
pub mod hedger;

pub use delta::{portfolio_delta, OptionExposure, PortfolioDelta};
pub use error::{Result, RiskError};
pub use hedger::{hedge_portfolio, HedgeOutcome, HedgeParams};
