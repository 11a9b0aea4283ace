//! Deterministic in-memory exchange.
//!
//! Implements `ExchangeClient` without any I/O. Books are whatever the test
//! (or the simulation binary) seeds them to be; IOC orders fill against the
//! seeded top of book; limit orders rest until cancelled or explicitly
//! filled via `fill_resting`. Every accepted submission is kept in an audit
//! log so tests can assert exactly what the control loop sent.

use crate::error::{ExchangeError, Result};
use crate::ExchangeClient;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use volmm_core::{
    Instrument, InstrumentId, OrderId, OrderRequest, OrderType, Price, RestingOrder, Side,
    TopOfBook, Trade,
};

/// In-memory exchange simulator.
#[derive(Debug, Default)]
pub struct SimExchange {
    instruments: HashMap<InstrumentId, Instrument>,
    books: HashMap<InstrumentId, TopOfBook>,
    positions: HashMap<InstrumentId, i64>,
    pnl: Option<Decimal>,
    resting: HashMap<InstrumentId, BTreeMap<OrderId, RestingOrder>>,
    pending_trades: HashMap<InstrumentId, Vec<Trade>>,
    next_order_id: u64,
    /// Every accepted submission, in order.
    submitted: Vec<OrderRequest>,
    /// One-shot injected failure for the next insert.
    reject_next: Option<String>,
}

impl SimExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instrument.
    pub fn add_instrument(&mut self, instrument: Instrument) {
        self.instruments.insert(instrument.id.clone(), instrument);
    }

    /// Set (or clear) the top of book for an instrument.
    pub fn set_book(&mut self, instrument: &InstrumentId, book: Option<TopOfBook>) {
        match book {
            Some(b) => self.books.insert(instrument.clone(), b),
            None => self.books.remove(instrument),
        };
    }

    /// Force a position, bypassing fills.
    pub fn set_position(&mut self, instrument: &InstrumentId, position: i64) {
        self.positions.insert(instrument.clone(), position);
    }

    pub fn set_pnl(&mut self, pnl: Option<Decimal>) {
        self.pnl = pnl;
    }

    /// Make the next `insert_order` fail with a rejection.
    pub fn reject_next_insert(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    /// Fill (part of) a resting order: adjusts the position, queues the
    /// trade for the next poll, and shrinks or removes the order.
    pub fn fill_resting(
        &mut self,
        instrument: &InstrumentId,
        order_id: OrderId,
        volume: i64,
    ) -> Result<()> {
        let orders = self
            .resting
            .get_mut(instrument)
            .ok_or_else(|| ExchangeError::UnknownOrder {
                instrument: instrument.clone(),
                order_id,
            })?;
        let order = orders.get_mut(&order_id).ok_or_else(|| ExchangeError::UnknownOrder {
            instrument: instrument.clone(),
            order_id,
        })?;
        let filled = volume.min(order.volume);
        let (price, side) = (order.price, order.side);
        order.volume -= filled;
        if order.volume == 0 {
            orders.remove(&order_id);
        }
        self.apply_fill(instrument, side, price, filled);
        Ok(())
    }

    /// Orders accepted so far, oldest first.
    pub fn submitted_orders(&self) -> &[OrderRequest] {
        &self.submitted
    }

    pub fn clear_submitted(&mut self) {
        self.submitted.clear();
    }

    fn apply_fill(&mut self, instrument: &InstrumentId, side: Side, price: Price, volume: i64) {
        if volume <= 0 {
            return;
        }
        *self.positions.entry(instrument.clone()).or_insert(0) += side.sign() * volume;
        self.pending_trades
            .entry(instrument.clone())
            .or_default()
            .push(Trade {
                instrument: instrument.clone(),
                price,
                volume,
                side,
                timestamp: Utc::now(),
            });
    }

    fn next_id(&mut self) -> OrderId {
        self.next_order_id += 1;
        OrderId(self.next_order_id)
    }
}

impl ExchangeClient for SimExchange {
    fn instruments(&self) -> Result<HashMap<InstrumentId, Instrument>> {
        Ok(self.instruments.clone())
    }

    fn top_of_book(&self, instrument: &InstrumentId) -> Result<Option<TopOfBook>> {
        Ok(self.books.get(instrument).copied())
    }

    fn positions(&self) -> Result<HashMap<InstrumentId, i64>> {
        Ok(self.positions.clone())
    }

    fn pnl(&self) -> Result<Option<Decimal>> {
        Ok(self.pnl)
    }

    fn poll_new_trades(&mut self, instrument: &InstrumentId) -> Result<Vec<Trade>> {
        Ok(self
            .pending_trades
            .get_mut(instrument)
            .map(std::mem::take)
            .unwrap_or_default())
    }

    fn outstanding_orders(&self, instrument: &InstrumentId) -> Result<Vec<RestingOrder>> {
        Ok(self
            .resting
            .get(instrument)
            .map(|orders| orders.values().cloned().collect())
            .unwrap_or_default())
    }

    fn cancel_order(&mut self, instrument: &InstrumentId, order_id: OrderId) -> Result<()> {
        let removed = self
            .resting
            .get_mut(instrument)
            .and_then(|orders| orders.remove(&order_id));
        if removed.is_none() {
            return Err(ExchangeError::UnknownOrder {
                instrument: instrument.clone(),
                order_id,
            });
        }
        Ok(())
    }

    fn insert_order(&mut self, request: &OrderRequest) -> Result<OrderId> {
        if let Some(reason) = self.reject_next.take() {
            return Err(ExchangeError::Rejected(reason));
        }
        if !self.instruments.contains_key(&request.instrument) {
            return Err(ExchangeError::UnknownInstrument(request.instrument.clone()));
        }
        if request.volume <= 0 {
            return Err(ExchangeError::Rejected(format!(
                "non-positive volume {}",
                request.volume
            )));
        }

        self.submitted.push(request.clone());
        let order_id = self.next_id();

        match request.order_type {
            OrderType::Limit => {
                self.resting
                    .entry(request.instrument.clone())
                    .or_default()
                    .insert(
                        order_id,
                        RestingOrder {
                            order_id,
                            side: request.side,
                            price: request.price,
                            volume: request.volume,
                        },
                    );
            }
            OrderType::Ioc => {
                // Fill against the seeded touch; the remainder is gone.
                if let Some(book) = self.books.get(&request.instrument).copied() {
                    let filled = match request.side {
                        Side::Bid if request.price >= book.ask_price => {
                            (request.volume.min(book.ask_volume), book.ask_price)
                        }
                        Side::Ask if request.price <= book.bid_price => {
                            (request.volume.min(book.bid_volume), book.bid_price)
                        }
                        _ => (0, request.price),
                    };
                    let (volume, price) = filled;
                    self.apply_fill(&request.instrument, request.side, price, volume);
                }
            }
        }

        Ok(order_id)
    }
}
