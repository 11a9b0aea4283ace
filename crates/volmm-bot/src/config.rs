//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use volmm_exchange::PacerConfig;
use volmm_mm::QuoterConfig;

/// Seeded market for the bundled exchange simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Underlying mid price at session start.
    #[serde(default = "default_stock_mid")]
    pub stock_mid: f64,

    /// Underlying bid/ask spread.
    #[serde(default = "default_stock_spread")]
    pub stock_spread: f64,

    /// Option bid/ask spread around theoretical value.
    #[serde(default = "default_option_spread")]
    pub option_spread: f64,

    /// Top-of-book volume seeded on both sides.
    #[serde(default = "default_book_depth")]
    pub book_depth: i64,

    /// Option strikes to list per expiry (calls and puts).
    #[serde(default = "default_strikes")]
    pub strikes: Vec<f64>,

    /// Option expiries, RFC 3339.
    #[serde(default = "default_expiries")]
    pub expiries: Vec<String>,
}

fn default_stock_mid() -> f64 {
    100.0
}
fn default_stock_spread() -> f64 {
    0.2
}
fn default_option_spread() -> f64 {
    0.4
}
fn default_book_depth() -> i64 {
    50
}
fn default_strikes() -> Vec<f64> {
    vec![90.0, 100.0, 110.0]
}
fn default_expiries() -> Vec<String> {
    vec!["2026-12-31T12:00:00Z".to_string()]
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            stock_mid: default_stock_mid(),
            stock_spread: default_stock_spread(),
            option_spread: default_option_spread(),
            book_depth: default_book_depth(),
            strikes: default_strikes(),
            expiries: default_expiries(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Underlying stock instrument id.
    #[serde(default = "default_underlying")]
    pub underlying: String,

    /// Risk-free rate fed to the pricing oracle.
    #[serde(default = "default_interest_rate")]
    pub interest_rate: f64,

    /// Volatility assumption fed to the pricing oracle.
    #[serde(default = "default_volatility")]
    pub volatility: f64,

    /// Hedge deadband in delta lots.
    #[serde(default = "default_deadband")]
    pub deadband: f64,

    /// Sleep between full cycles, milliseconds.
    #[serde(default = "default_cycle_sleep_ms")]
    pub cycle_sleep_ms: u64,

    /// Sleep between per-option quote refreshes, milliseconds.
    #[serde(default = "default_quote_pause_ms")]
    pub quote_pause_ms: u64,

    /// Directory for JSON-Lines cycle records.
    #[serde(default = "default_record_dir")]
    pub record_dir: String,

    /// Records buffered before a flush.
    #[serde(default = "default_record_buffer")]
    pub record_buffer: usize,

    #[serde(default)]
    pub quoter: QuoterConfig,

    #[serde(default)]
    pub pacer: PacerConfig,

    #[serde(default)]
    pub sim: SimConfig,
}

fn default_underlying() -> String {
    "ASML".to_string()
}
fn default_interest_rate() -> f64 {
    0.03
}
fn default_volatility() -> f64 {
    3.0
}
fn default_deadband() -> f64 {
    20.0
}
fn default_cycle_sleep_ms() -> u64 {
    4000
}
fn default_quote_pause_ms() -> u64 {
    200
}
fn default_record_dir() -> String {
    "data".to_string()
}
fn default_record_buffer() -> usize {
    64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            underlying: default_underlying(),
            interest_rate: default_interest_rate(),
            volatility: default_volatility(),
            deadband: default_deadband(),
            cycle_sleep_ms: default_cycle_sleep_ms(),
            quote_pause_ms: default_quote_pause_ms(),
            record_dir: default_record_dir(),
            record_buffer: default_record_buffer(),
            quoter: QuoterConfig::default(),
            pacer: PacerConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path` when given, else `VOLMM_CONFIG`, else the default
    /// path; fall back to defaults when no file exists.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let config_path = path
            .map(str::to_string)
            .or_else(|| std::env::var("VOLMM_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse a TOML configuration file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.underlying, "ASML");
        assert!((config.interest_rate - 0.03).abs() < f64::EPSILON);
        assert!((config.volatility - 3.0).abs() < f64::EPSILON);
        assert!((config.deadband - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.cycle_sleep_ms, 4000);
        assert_eq!(config.quoter.position_limit, 100);
        assert_eq!(config.quoter.tick_size, dec!(0.10));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
underlying = "SAP"
deadband = 5.0

[quoter]
position_limit = 40

[sim]
stock_mid = 120.0
strikes = [110.0, 120.0, 130.0]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.underlying, "SAP");
        assert!((config.deadband - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.quoter.position_limit, 40);
        assert_eq!(config.quoter.tick_size, dec!(0.10));
        assert_eq!(config.sim.strikes.len(), 3);
        assert_eq!(config.cycle_sleep_ms, 4000);
    }
}
