//! Static instrument reference data.
//!
//! Loaded once per session from the exchange and never mutated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument identifier as used by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InstrumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Direction of the underlying exposure a long position carries:
    /// +1 for calls, -1 for puts.
    pub fn direction(&self) -> i64 {
        match self {
            Self::Call => 1,
            Self::Put => -1,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Contract terms of a listed stock option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSeries {
    /// Underlying stock instrument.
    pub base: InstrumentId,
    pub strike: Decimal,
    pub expiry: DateTime<Utc>,
    pub kind: OptionKind,
}

/// Instrument kind with kind-specific reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum InstrumentKind {
    Stock,
    StockOption(OptionSeries),
}

/// One tradeable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub kind: InstrumentKind,
}

impl Instrument {
    pub fn stock(id: impl Into<InstrumentId>) -> Self {
        Self {
            id: id.into(),
            kind: InstrumentKind::Stock,
        }
    }

    pub fn stock_option(id: impl Into<InstrumentId>, series: OptionSeries) -> Self {
        Self {
            id: id.into(),
            kind: InstrumentKind::StockOption(series),
        }
    }

    /// Contract terms when this instrument is an option.
    pub fn option_series(&self) -> Option<&OptionSeries> {
        match &self.kind {
            InstrumentKind::StockOption(series) => Some(series),
            InstrumentKind::Stock => None,
        }
    }
}
