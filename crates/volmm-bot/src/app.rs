//! Main application orchestration.
//!
//! Owns the per-session state (instruments, smoothed credits, pacer,
//! recorder, running tallies) and sequences one control-loop cycle:
//! underlying snapshot, delta aggregate, per-option quote refresh, hedge,
//! record, sleep. Recoverable conditions are logged and the loop continues;
//! only external interruption stops it.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use volmm_core::{InstrumentId, InstrumentKind, OptionSeries, Price};
use volmm_exchange::{ExchangeClient, Pacer};
use volmm_mm::{
    compute_credit, compute_volume, exposure_widen, global_widen_factor, refresh_quotes,
    CreditBook, CreditInputs, QuoteParams, VolumeInputs,
};
use volmm_pricing::{option_delta, theoretical_value, time_to_expiry};
use volmm_risk::{hedge_portfolio, portfolio_delta, HedgeOutcome, HedgeParams, PortfolioDelta};
use volmm_telemetry::{CycleRecord, JsonLinesRecorder};

/// Running tallies across cycles, logged as a performance snapshot.
#[derive(Debug, Default)]
struct PerfStats {
    cycles: u64,
    fills: i64,
    credit_sum: f64,
    size_sum: i64,
    delta_abs_sum: f64,
}

impl PerfStats {
    fn log_snapshot(&self, option_count: usize) {
        let quotes = (self.cycles * option_count as u64).max(1) as f64;
        info!(
            cycles = self.cycles,
            fills = self.fills,
            avg_credit = self.credit_sum / quotes,
            avg_size = self.size_sum as f64 / quotes,
            avg_abs_delta = self.delta_abs_sum / self.cycles.max(1) as f64,
            "Performance snapshot"
        );
    }
}

/// What one cycle did, for tests and logging.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    /// Options whose quotes were refreshed.
    pub quoted: usize,
    /// Options skipped this cycle (no theo, refresh failure).
    pub skipped: usize,
    /// Aggregate delta at cycle start; `None` when the cycle was skipped.
    pub total_delta: Option<f64>,
    pub hedge: Option<HedgeOutcome>,
}

impl CycleReport {
    fn skipped_cycle(cycle: u64) -> Self {
        Self {
            cycle,
            quoted: 0,
            skipped: 0,
            total_delta: None,
            hedge: None,
        }
    }
}

/// Main application.
pub struct Application<E: ExchangeClient> {
    config: AppConfig,
    exchange: E,
    stock_id: InstrumentId,
    options: BTreeMap<InstrumentId, OptionSeries>,
    credit_book: CreditBook,
    pacer: Pacer,
    recorder: JsonLinesRecorder,
    stats: PerfStats,
    cycle_count: u64,
}

impl<E: ExchangeClient> Application<E> {
    /// Create an application around an exchange client.
    ///
    /// Call `load_instruments()` before `run()`.
    pub fn new(config: AppConfig, exchange: E) -> Self {
        let stock_id = InstrumentId::new(config.underlying.clone());
        let pacer = Pacer::new(config.pacer.clone());
        let recorder = JsonLinesRecorder::new(&config.record_dir, config.record_buffer);
        Self {
            config,
            exchange,
            stock_id,
            options: BTreeMap::new(),
            credit_book: CreditBook::new(),
            pacer,
            recorder,
            stats: PerfStats::default(),
            cycle_count: 0,
        }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    pub fn exchange_mut(&mut self) -> &mut E {
        &mut self.exchange
    }

    pub fn options(&self) -> &BTreeMap<InstrumentId, OptionSeries> {
        &self.options
    }

    /// Discover the underlying and every option listed on it.
    pub fn load_instruments(&mut self) -> AppResult<()> {
        let instruments = self.exchange.instruments()?;

        let stock = instruments
            .get(&self.stock_id)
            .ok_or_else(|| AppError::MissingInstrument(self.stock_id.to_string()))?;
        if !matches!(stock.kind, InstrumentKind::Stock) {
            return Err(AppError::MissingInstrument(format!(
                "{} is not a stock",
                self.stock_id
            )));
        }

        self.options = instruments
            .into_iter()
            .filter_map(|(id, instrument)| match instrument.kind {
                InstrumentKind::StockOption(series) if series.base == self.stock_id => {
                    Some((id, series))
                }
                _ => None,
            })
            .collect();

        info!(
            underlying = %self.stock_id,
            options = self.options.len(),
            "Loaded instruments"
        );
        Ok(())
    }

    /// Run the control loop until externally interrupted.
    pub fn run(&mut self) -> AppResult<()> {
        if self.options.is_empty() {
            self.load_instruments()?;
        }
        loop {
            if let Err(err) = self.cycle() {
                error!(error = %err, "Cycle failed; continuing");
            }
            std::thread::sleep(Duration::from_millis(self.config.cycle_sleep_ms));
        }
    }

    /// One full control-loop cycle.
    pub fn cycle(&mut self) -> AppResult<CycleReport> {
        self.cycle_count += 1;
        let cycle = self.cycle_count;
        self.pacer.begin_cycle();
        let now = Utc::now();
        info!(cycle, "Trade loop entered");

        let Some(stock_book) = self.exchange.top_of_book(&self.stock_id)? else {
            warn!(stock = %self.stock_id, "Empty underlying book; skipping cycle");
            return Ok(CycleReport::skipped_cycle(cycle));
        };
        let stock_value = stock_book.mid().to_f64();
        let stock_view = Some((stock_book.mid().to_f64(), stock_book.spread().to_f64()));

        let rate = self.config.interest_rate;
        let sigma = self.config.volatility;

        let portfolio = match portfolio_delta(
            &self.exchange,
            &self.stock_id,
            &self.options,
            stock_value,
            rate,
            sigma,
            now,
        ) {
            Ok(p) => p,
            Err(err) => {
                warn!(error = %err, "Delta aggregation failed; skipping cycle");
                return Ok(CycleReport::skipped_cycle(cycle));
            }
        };

        let pnl = self.exchange.pnl()?.and_then(|p| p.to_f64());
        log_positions_and_pnl(&self.stock_id, &portfolio, pnl);

        let credit_cfg = &self.config.quoter.credit;
        let volume_cfg = &self.config.quoter.volume;
        let position_limit = self.config.quoter.position_limit;
        let tick = Price::new(self.config.quoter.tick_size);
        let tick_f64 = self.config.quoter.tick_size.to_f64().unwrap_or(0.0);
        let quote_params = QuoteParams {
            position_limit,
            tick_size: tick,
        };
        let global_widen = global_widen_factor(credit_cfg, portfolio.total);

        let mut quoted = 0;
        let mut skipped = 0;

        for (option_id, series) in &self.options {
            debug!(%option_id, "Updating instrument");

            // Fatal for this option's cycle: no theo, no quote.
            let theo = match theoretical_value(series, stock_value, rate, sigma, now) {
                Ok(v) => v,
                Err(err) => {
                    warn!(%option_id, error = %err, "No theoretical value; skipping");
                    skipped += 1;
                    continue;
                }
            };

            let position = self
                .exchange
                .positions()?
                .get(option_id)
                .copied()
                .unwrap_or(0);
            // Recoverable: a missing delta only skips the floor term.
            let delta = option_delta(series, stock_value, rate, sigma, now).ok();
            let option_book = self.exchange.top_of_book(option_id)?;

            let inputs = CreditInputs {
                stock: stock_view,
                option: option_book.map(|b| (b.mid().to_f64(), b.spread().to_f64())),
                time_to_expiry: Some(time_to_expiry(series.expiry, now)),
                option_delta: delta,
                global_widen,
                exposure_widen: exposure_widen(credit_cfg, position, series.kind),
            };
            let raw = compute_credit(credit_cfg, tick_f64, &inputs);
            let credit = self
                .credit_book
                .smooth(option_id, raw, credit_cfg.smooth_lambda);

            let volume = compute_volume(
                volume_cfg,
                position_limit,
                &VolumeInputs {
                    option_rel_spread: option_book
                        .and_then(|b| b.relative_spread())
                        .and_then(|r| r.to_f64()),
                    top_depth: option_book.map(|b| b.top_depth()).unwrap_or(0),
                    total_delta: portfolio.total,
                    stock_position: portfolio.stock_position,
                    option_position: position,
                    option_delta: delta,
                },
            );
            debug!(%option_id, credit, volume, theo, "Quote inputs");

            match refresh_quotes(
                &mut self.exchange,
                &mut self.pacer,
                option_id,
                theo,
                credit,
                volume,
                &quote_params,
            ) {
                Ok(outcome) => {
                    quoted += 1;
                    self.stats.fills += outcome.filled_since_last;
                    self.stats.credit_sum += credit;
                    self.stats.size_sum += volume;
                    let record = CycleRecord {
                        timestamp_ms: now.timestamp_millis(),
                        cycle,
                        instrument: option_id.to_string(),
                        theoretical: Some(theo),
                        credit: Some(credit),
                        quoted_volume: Some(volume),
                        position,
                        delta,
                        total_delta: portfolio.total,
                        pnl,
                    };
                    if let Err(err) = self.recorder.add_record(record) {
                        warn!(error = %err, "Failed to record cycle row");
                    }
                }
                Err(err) => {
                    warn!(%option_id, error = %err, "Quote refresh failed; continuing");
                    skipped += 1;
                }
            }

            if self.config.quote_pause_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.config.quote_pause_ms));
            }
        }

        // Hedge against a fresh aggregate: fills during quoting count.
        info!("Hedging delta position");
        let hedge_params = HedgeParams {
            deadband: self.config.deadband,
            position_limit,
        };
        let hedge = match portfolio_delta(
            &self.exchange,
            &self.stock_id,
            &self.options,
            stock_value,
            rate,
            sigma,
            now,
        ) {
            Ok(fresh) => {
                match hedge_portfolio(
                    &mut self.exchange,
                    &mut self.pacer,
                    &self.stock_id,
                    fresh.total,
                    &hedge_params,
                ) {
                    Ok(outcome) => Some(outcome),
                    Err(err) => {
                        warn!(error = %err, "Hedge failed; continuing");
                        None
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "Delta aggregation for hedge failed; skipping hedge");
                None
            }
        };

        // Underlying row closes out the cycle's records.
        let stock_position = self
            .exchange
            .positions()?
            .get(&self.stock_id)
            .copied()
            .unwrap_or(0);
        let record = CycleRecord {
            timestamp_ms: now.timestamp_millis(),
            cycle,
            instrument: self.stock_id.to_string(),
            theoretical: None,
            credit: None,
            quoted_volume: None,
            position: stock_position,
            delta: None,
            total_delta: portfolio.total,
            pnl,
        };
        if let Err(err) = self.recorder.add_record(record) {
            warn!(error = %err, "Failed to record cycle row");
        }

        self.stats.cycles += 1;
        self.stats.delta_abs_sum += portfolio.total.abs();
        self.stats.log_snapshot(self.options.len());

        Ok(CycleReport {
            cycle,
            quoted,
            skipped,
            total_delta: Some(portfolio.total),
            hedge,
        })
    }
}

fn log_positions_and_pnl(stock: &InstrumentId, portfolio: &PortfolioDelta, pnl: Option<f64>) {
    info!(
        %stock,
        position = portfolio.stock_position,
        "Underlying position"
    );
    for exposure in &portfolio.breakdown {
        if exposure.position != 0 {
            info!(
                instrument = %exposure.instrument,
                position = exposure.position,
                delta = exposure.delta,
                contribution = exposure.contribution,
                "Option exposure"
            );
        }
    }
    info!(total_delta = portfolio.total, pnl, "Portfolio delta");
}
