//! Fair value oracle for listed stock options.
//!
//! Wraps Black-Scholes value and delta as pure functions of the inputs and
//! the current time. Time to expiry is floored at a small positive epsilon
//! so pricing near expiry never divides by zero.

pub mod black_scholes;
pub mod error;

pub use black_scholes::{call_delta, call_value, put_delta, put_value};
pub use error::{PricingError, Result};

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use volmm_core::{OptionKind, OptionSeries};

/// Seconds in the pricing year convention.
const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Minimum time to expiry, in years.
pub const MIN_TIME_TO_EXPIRY: f64 = 1e-6;

/// Year fraction from `now` to `expiry`, floored at `MIN_TIME_TO_EXPIRY`.
pub fn time_to_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (expiry - now).num_seconds() as f64;
    (seconds / SECONDS_PER_YEAR).max(MIN_TIME_TO_EXPIRY)
}

fn strike_of(series: &OptionSeries) -> Result<f64> {
    series
        .strike
        .to_f64()
        .filter(|k| k.is_finite() && *k > 0.0)
        .ok_or_else(|| PricingError::Degenerate(format!("strike {}", series.strike)))
}

/// Theoretical price of an option series given the underlying value.
pub fn theoretical_value(
    series: &OptionSeries,
    stock_value: f64,
    rate: f64,
    volatility: f64,
    now: DateTime<Utc>,
) -> Result<f64> {
    let k = strike_of(series)?;
    let t = time_to_expiry(series.expiry, now);
    match series.kind {
        OptionKind::Call => call_value(stock_value, k, t, rate, volatility),
        OptionKind::Put => put_value(stock_value, k, t, rate, volatility),
    }
}

/// Black-Scholes delta of an option series given the underlying value.
pub fn option_delta(
    series: &OptionSeries,
    stock_value: f64,
    rate: f64,
    volatility: f64,
    now: DateTime<Utc>,
) -> Result<f64> {
    let k = strike_of(series)?;
    let t = time_to_expiry(series.expiry, now);
    match series.kind {
        OptionKind::Call => call_delta(stock_value, k, t, rate, volatility),
        OptionKind::Put => put_delta(stock_value, k, t, rate, volatility),
    }
}
