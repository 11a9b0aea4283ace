//! The narrow exchange capability trait.
//!
//! The control loop is written entirely against this interface so it can be
//! exercised with the deterministic `SimExchange` in tests. The trait is
//! synchronous: the loop is single-threaded and cooperative, and every call
//! completes before the next decision is taken.

use crate::error::Result;
use rust_decimal::Decimal;
use std::collections::HashMap;
use volmm_core::{Instrument, InstrumentId, OrderId, OrderRequest, RestingOrder, TopOfBook, Trade};

/// Capability set consumed from the venue.
pub trait ExchangeClient {
    /// Static instrument metadata, keyed by id.
    fn instruments(&self) -> Result<HashMap<InstrumentId, Instrument>>;

    /// Top of book for one instrument. `Ok(None)` when either side of the
    /// book is empty; callers degrade gracefully, this is not an error.
    fn top_of_book(&self, instrument: &InstrumentId) -> Result<Option<TopOfBook>>;

    /// Current signed positions for all instruments ever traded.
    fn positions(&self) -> Result<HashMap<InstrumentId, i64>>;

    /// Aggregate realized plus unrealized profit-and-loss, if the venue has
    /// marked any yet.
    fn pnl(&self) -> Result<Option<Decimal>>;

    /// Fills on `instrument` since the previous poll. Draining: each trade
    /// is reported exactly once.
    fn poll_new_trades(&mut self, instrument: &InstrumentId) -> Result<Vec<Trade>>;

    /// Currently resting orders owned by this session on `instrument`.
    fn outstanding_orders(&self, instrument: &InstrumentId) -> Result<Vec<RestingOrder>>;

    /// Cancel one resting order.
    fn cancel_order(&mut self, instrument: &InstrumentId, order_id: OrderId) -> Result<()>;

    /// Submit an order. Limit orders rest; IOC orders fill what they can at
    /// the limit and the remainder is cancelled by the venue.
    fn insert_order(&mut self, request: &OrderRequest) -> Result<OrderId>;
}

/// Signed position for one instrument, zero when never traded.
pub fn position_of<E: ExchangeClient + ?Sized>(
    exchange: &E,
    instrument: &InstrumentId,
) -> Result<i64> {
    Ok(exchange
        .positions()?
        .get(instrument)
        .copied()
        .unwrap_or(0))
}
