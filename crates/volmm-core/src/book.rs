//! Top-of-book snapshot.
//!
//! A `TopOfBook` only exists when both sides of the book are live; a
//! one-sided or empty book is represented as `None` at the exchange
//! boundary. Downstream logic treats that as "skip this instrument this
//! cycle", never as an error.

use crate::decimal::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Best bid and ask with top-of-book volumes for one instrument at one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub bid_price: Price,
    pub bid_volume: i64,
    pub ask_price: Price,
    pub ask_volume: i64,
}

impl TopOfBook {
    /// Build a snapshot; returns `None` when either side is missing or the
    /// book is crossed, so callers never see a half-formed top of book.
    pub fn new(bid_price: Price, bid_volume: i64, ask_price: Price, ask_volume: i64) -> Option<Self> {
        if !bid_price.is_positive() || !ask_price.is_positive() {
            return None;
        }
        if bid_volume <= 0 || ask_volume <= 0 {
            return None;
        }
        if bid_price >= ask_price {
            return None;
        }
        Some(Self {
            bid_price,
            bid_volume,
            ask_price,
            ask_volume,
        })
    }

    /// Mid price: (bid + ask) / 2.
    pub fn mid(&self) -> Price {
        Price::new((self.bid_price.inner() + self.ask_price.inner()) / Decimal::TWO)
    }

    /// Absolute spread: ask - bid.
    pub fn spread(&self) -> Price {
        self.ask_price - self.bid_price
    }

    /// Spread relative to mid. `None` when mid is zero.
    pub fn relative_spread(&self) -> Option<Decimal> {
        let mid = self.mid();
        if mid.is_zero() {
            return None;
        }
        Some(self.spread().inner() / mid.inner())
    }

    /// Smaller of the two top-of-book volumes, the depth the volume engine
    /// scales against.
    pub fn top_depth(&self) -> i64 {
        self.bid_volume.min(self.ask_volume)
    }
}
