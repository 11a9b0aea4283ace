//! Portfolio delta aggregation.
//!
//! A pure read: positions and deltas are fetched fresh on every call, never
//! cached. Every option of the underlying contributes, so the breakdown is
//! complete even for flat positions.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use volmm_core::{InstrumentId, OptionSeries};
use volmm_exchange::ExchangeClient;
use volmm_pricing::option_delta;

/// One option's contribution to the portfolio delta.
#[derive(Debug, Clone)]
pub struct OptionExposure {
    pub instrument: InstrumentId,
    pub position: i64,
    pub delta: f64,
    /// position * delta.
    pub contribution: f64,
}

/// Aggregate exposure of the underlying plus all its options.
#[derive(Debug, Clone)]
pub struct PortfolioDelta {
    /// Underlying position + sum of option contributions.
    pub total: f64,
    pub stock_position: i64,
    pub breakdown: Vec<OptionExposure>,
}

/// Sum position-weighted deltas across `options` plus the underlying
/// position. Fails if any option with a position cannot be priced; the
/// caller skips hedging this cycle rather than hedge a wrong number.
pub fn portfolio_delta<E: ExchangeClient + ?Sized>(
    exchange: &E,
    stock: &InstrumentId,
    options: &BTreeMap<InstrumentId, OptionSeries>,
    stock_value: f64,
    rate: f64,
    volatility: f64,
    now: DateTime<Utc>,
) -> Result<PortfolioDelta> {
    let positions = exchange.positions()?;

    let mut total_option_delta = 0.0;
    let mut breakdown = Vec::with_capacity(options.len());
    for (instrument, series) in options {
        let position = positions.get(instrument).copied().unwrap_or(0);
        let delta = option_delta(series, stock_value, rate, volatility, now)?;
        let contribution = position as f64 * delta;
        total_option_delta += contribution;
        breakdown.push(OptionExposure {
            instrument: instrument.clone(),
            position,
            delta,
            contribution,
        });
    }

    let stock_position = positions.get(stock).copied().unwrap_or(0);
    Ok(PortfolioDelta {
        total: stock_position as f64 + total_option_delta,
        stock_position,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use volmm_core::{Instrument, OptionKind};
    use volmm_exchange::SimExchange;

    fn series(strike: rust_decimal::Decimal, kind: OptionKind) -> OptionSeries {
        OptionSeries {
            base: "ASML".into(),
            strike,
            expiry: chrono::Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
            kind,
        }
    }

    fn now() -> DateTime<Utc> {
        chrono::Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_flat_portfolio_is_flat() {
        let sim = SimExchange::new();
        let stock: InstrumentId = "ASML".into();
        let mut options = BTreeMap::new();
        options.insert(
            InstrumentId::new("ASML_C100"),
            series(dec!(100), OptionKind::Call),
        );

        let portfolio =
            portfolio_delta(&sim, &stock, &options, 100.0, 0.03, 0.2, now()).unwrap();
        assert_eq!(portfolio.stock_position, 0);
        assert!(portfolio.total.abs() < 1e-12);
        // Breakdown still lists the flat option.
        assert_eq!(portfolio.breakdown.len(), 1);
        assert_eq!(portfolio.breakdown[0].position, 0);
    }

    #[test]
    fn test_deep_itm_call_contributes_its_position() {
        let mut sim = SimExchange::new();
        let stock: InstrumentId = "ASML".into();
        let option: InstrumentId = "ASML_C1".into();
        sim.add_instrument(Instrument::stock(stock.clone()));
        sim.set_position(&option, 40);
        sim.set_position(&stock, -10);

        let mut options = BTreeMap::new();
        options.insert(option.clone(), series(dec!(1), OptionKind::Call));

        let portfolio =
            portfolio_delta(&sim, &stock, &options, 100.0, 0.03, 0.2, now()).unwrap();
        // Delta of a strike-1 call is ~1: total ~ -10 + 40.
        assert!((portfolio.total - 30.0).abs() < 0.1, "got {}", portfolio.total);
        assert_eq!(portfolio.stock_position, -10);
        let exposure = &portfolio.breakdown[0];
        assert_eq!(exposure.position, 40);
        assert!((exposure.contribution - 40.0 * exposure.delta).abs() < 1e-12);
    }

    #[test]
    fn test_put_offsets_call() {
        let mut sim = SimExchange::new();
        let stock: InstrumentId = "ASML".into();
        let call: InstrumentId = "ASML_C100".into();
        let put: InstrumentId = "ASML_P100".into();
        sim.set_position(&call, 10);
        sim.set_position(&put, 10);

        let mut options = BTreeMap::new();
        options.insert(call, series(dec!(100), OptionKind::Call));
        options.insert(put, series(dec!(100), OptionKind::Put));

        let portfolio =
            portfolio_delta(&sim, &stock, &options, 100.0, 0.03, 0.2, now()).unwrap();
        // 10 * call_delta + 10 * (call_delta - 1) = 20*call_delta - 10;
        // near the money this sits well inside (-10, 10).
        assert!(portfolio.total.abs() < 10.0);
        assert_eq!(portfolio.breakdown.len(), 2);
    }

    #[test]
    fn test_degenerate_pricing_fails_the_aggregate() {
        let sim = SimExchange::new();
        let stock: InstrumentId = "ASML".into();
        let mut options = BTreeMap::new();
        options.insert(
            InstrumentId::new("ASML_C0"),
            series(dec!(0), OptionKind::Call),
        );
        assert!(portfolio_delta(&sim, &stock, &options, 100.0, 0.03, 0.2, now()).is_err());
    }
}
