//! Portfolio delta hedger.
//!
//! One IOC trade in the underlying per cycle, sized to move aggregate delta
//! toward zero and clamped so a full fill cannot breach the position limit.
//! An unfilled remainder is not retried; the next cycle re-evaluates the
//! residual from scratch.

use crate::error::Result;
use tracing::{info, warn};
use volmm_core::{InstrumentId, OrderRequest, OrderType, Price, Side};
use volmm_exchange::{client::position_of, ExchangeClient, Pacer};

/// Hedging parameters.
#[derive(Debug, Clone, Copy)]
pub struct HedgeParams {
    /// No hedge while |total delta| stays within this band.
    pub deadband: f64,
    /// Hard position limit on the underlying, in lots.
    pub position_limit: i64,
}

/// What the hedger decided.
#[derive(Debug, Clone, PartialEq)]
pub enum HedgeOutcome {
    /// |delta| within the deadband; nothing to do.
    WithinDeadband,
    /// One IOC submitted.
    Hedged {
        side: Side,
        volume: i64,
        price: Price,
    },
    /// The clamped trade size was zero; hedging skipped.
    WouldBreachLimit,
    /// Underlying book unavailable; cannot hedge now.
    NoMarket,
    /// Submission failed or was throttled; reported, never fatal.
    SubmitFailed { reason: String },
}

/// Flatten aggregate delta with a single IOC order on the underlying.
pub fn hedge_portfolio<E: ExchangeClient>(
    exchange: &mut E,
    pacer: &mut Pacer,
    stock: &InstrumentId,
    total_delta: f64,
    params: &HedgeParams,
) -> Result<HedgeOutcome> {
    if total_delta.abs() <= params.deadband {
        info!(
            total_delta,
            deadband = params.deadband,
            "Delta within deadband; no hedge needed"
        );
        return Ok(HedgeOutcome::WithinDeadband);
    }

    // Hedge toward zero, nearest whole lot.
    let target = (-total_delta).round() as i64;

    let position = position_of(exchange, stock)?;
    let max_buy = params.position_limit - position;
    let max_sell = params.position_limit + position;
    let trade = if target > 0 {
        target.min(max_buy).max(0)
    } else {
        -(-target).min(max_sell).max(0)
    };

    if trade == 0 {
        warn!(total_delta, position, "Hedge would breach position limit; skipping");
        return Ok(HedgeOutcome::WouldBreachLimit);
    }

    let Some(book) = exchange.top_of_book(stock)? else {
        warn!(%stock, "No underlying top of book; cannot hedge now");
        return Ok(HedgeOutcome::NoMarket);
    };

    // Buy at the ask, sell at the bid.
    let (side, price, volume) = if trade > 0 {
        (Side::Bid, book.ask_price, trade)
    } else {
        (Side::Ask, book.bid_price, -trade)
    };

    if !pacer.admit() {
        return Ok(HedgeOutcome::SubmitFailed {
            reason: "per-cycle order cap reached".to_string(),
        });
    }

    info!(
        %stock,
        %side,
        volume,
        %price,
        total_delta,
        "Hedging with IOC order"
    );
    let request = OrderRequest {
        instrument: stock.clone(),
        price,
        volume,
        side,
        order_type: OrderType::Ioc,
    };
    match exchange.insert_order(&request) {
        Ok(_) => Ok(HedgeOutcome::Hedged {
            side,
            volume,
            price,
        }),
        Err(error) => {
            warn!(%stock, %error, "Hedge IOC insert failed");
            Ok(HedgeOutcome::SubmitFailed {
                reason: error.to_string(),
            })
        }
    }
}
