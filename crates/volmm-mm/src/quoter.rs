//! Quote refresher.
//!
//! One routine, invoked per option per cycle: report fills since the last
//! refresh, cancel every resting order (full replace, no diffing), compute
//! tick-rounded prices at theo ± credit, size each side by position
//! headroom, and submit. Cancellation always precedes submission for the
//! same instrument.

use crate::error::{MmError, Result};
use tracing::{debug, info, warn};
use volmm_core::{InstrumentId, OrderRequest, OrderType, Price, Side};
use volmm_exchange::{client::position_of, ExchangeClient, Pacer};

/// Static quoting parameters shared by every instrument.
#[derive(Debug, Clone, Copy)]
pub struct QuoteParams {
    pub position_limit: i64,
    pub tick_size: Price,
}

/// What one refresh did.
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
    pub bid_price: Price,
    pub ask_price: Price,
    /// Volumes after the headroom check; 0 means that side was not quoted.
    pub bid_volume: i64,
    pub ask_volume: i64,
    /// Lots filled on this instrument since the previous refresh.
    pub filled_since_last: i64,
    /// Stale orders cancelled.
    pub cancelled: usize,
    /// Submissions the exchange rejected (logged, not fatal).
    pub rejected: u32,
}

/// Replace the resting quotes on one option.
///
/// On return no order from a prior cycle rests on this instrument, and the
/// submitted volumes respect the position limit for the position observed
/// at sizing time.
pub fn refresh_quotes<E: ExchangeClient>(
    exchange: &mut E,
    pacer: &mut Pacer,
    instrument: &InstrumentId,
    theoretical: f64,
    credit: f64,
    volume: i64,
    params: &QuoteParams,
) -> Result<QuoteOutcome> {
    // 1. Report what traded since the previous refresh.
    let trades = exchange.poll_new_trades(instrument)?;
    let mut filled_since_last = 0;
    for trade in &trades {
        info!(
            %instrument,
            side = %trade.side,
            volume = trade.volume,
            price = %trade.price,
            "Traded since last refresh"
        );
        filled_since_last += trade.volume;
    }

    // 2. Full replace: cancel everything currently resting.
    let resting = exchange.outstanding_orders(instrument)?;
    let cancelled = resting.len();
    for order in resting {
        debug!(
            %instrument,
            order_id = %order.order_id,
            side = %order.side,
            volume = order.volume,
            price = %order.price,
            "Cancelling stale order"
        );
        exchange.cancel_order(instrument, order.order_id)?;
    }

    // 3. Tick-rounded prices around theo.
    let theo = Price::from_f64(theoretical)
        .ok_or(MmError::NonFinite("theoretical price"))?;
    let credit_offset = Price::from_f64(credit).ok_or(MmError::NonFinite("credit"))?;
    let tick = params.tick_size;

    let mut bid_price = (theo - credit_offset).round_down_to_tick(tick);
    let mut ask_price = (theo + credit_offset).round_up_to_tick(tick);

    // 4. Rounding can cross the pair; widen one tick each way.
    if bid_price >= ask_price {
        bid_price = (bid_price - tick).round_down_to_tick(tick);
        ask_price = (ask_price + tick).round_up_to_tick(tick);
    }

    // 5. Size each side so a full fill cannot breach the position limit.
    let position = position_of(exchange, instrument)?;
    let bid_volume = volume.min(params.position_limit - position).max(0);
    let ask_volume = volume.min(params.position_limit + position).max(0);

    // 6. Submit; a rejected side is logged and the other side still goes out.
    let mut rejected = 0;
    for (side, price, side_volume) in [
        (Side::Bid, bid_price, bid_volume),
        (Side::Ask, ask_price, ask_volume),
    ] {
        if side_volume <= 0 {
            continue;
        }
        if !pacer.admit() {
            continue;
        }
        let request = OrderRequest {
            instrument: instrument.clone(),
            price,
            volume: side_volume,
            side,
            order_type: OrderType::Limit,
        };
        match exchange.insert_order(&request) {
            Ok(order_id) => debug!(
                %instrument,
                %order_id,
                %side,
                volume = side_volume,
                %price,
                "Inserted limit order"
            ),
            Err(error) => {
                warn!(%instrument, %side, %error, "Order insert failed");
                rejected += 1;
            }
        }
    }

    Ok(QuoteOutcome {
        bid_price,
        ask_price,
        bid_volume,
        ask_volume,
        filled_since_last,
        cancelled,
        rejected,
    })
}
