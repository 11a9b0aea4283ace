//! volmm bot entry point.
//!
//! Runs the control loop against the bundled in-memory exchange simulator,
//! seeded from the `[sim]` section of the configuration.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::info;
use volmm_bot::{AppConfig, Application};
use volmm_core::{Instrument, InstrumentId, OptionKind, OptionSeries, Price, TopOfBook};
use volmm_exchange::SimExchange;
use volmm_pricing::theoretical_value;

/// Option market-making bot (simulated session)
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via VOLMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    volmm_telemetry::init_logging()?;

    info!("Starting volmm bot v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(args.config.as_deref())?;
    info!(underlying = %config.underlying, "Configuration loaded");

    let exchange = build_sim(&config)?;
    let mut app = Application::new(config, exchange);
    app.load_instruments()?;
    app.run()?;

    Ok(())
}

/// Seed the simulator with the underlying and an option chain whose books
/// sit around Black-Scholes theoretical values.
fn build_sim(config: &AppConfig) -> Result<SimExchange> {
    let mut sim = SimExchange::new();
    let now = Utc::now();

    let stock_id = InstrumentId::new(config.underlying.clone());
    sim.add_instrument(Instrument::stock(stock_id.clone()));

    let tick = Price::new(config.quoter.tick_size);
    let depth = config.sim.book_depth;
    seed_book(
        &mut sim,
        &stock_id,
        config.sim.stock_mid,
        config.sim.stock_spread,
        tick,
        depth,
    );

    for expiry_str in &config.sim.expiries {
        let expiry: DateTime<Utc> = expiry_str
            .parse()
            .with_context(|| format!("invalid expiry {expiry_str}"))?;
        for &strike in &config.sim.strikes {
            let strike_dec = Decimal::from_f64(strike)
                .with_context(|| format!("invalid strike {strike}"))?;
            for kind in [OptionKind::Call, OptionKind::Put] {
                let suffix = match kind {
                    OptionKind::Call => "C",
                    OptionKind::Put => "P",
                };
                let id = InstrumentId::new(format!(
                    "{}_{}_{}{}",
                    config.underlying,
                    expiry.format("%Y%m"),
                    strike,
                    suffix
                ));
                let series = OptionSeries {
                    base: stock_id.clone(),
                    strike: strike_dec,
                    expiry,
                    kind,
                };

                let theo = theoretical_value(
                    &series,
                    config.sim.stock_mid,
                    config.interest_rate,
                    config.volatility,
                    now,
                )
                .with_context(|| format!("cannot seed {id}"))?;
                sim.add_instrument(Instrument::stock_option(id.clone(), series));
                seed_book(&mut sim, &id, theo, config.sim.option_spread, tick, depth);
            }
        }
    }

    Ok(sim)
}

/// Seed a symmetric book around `mid`; a book that would have a
/// non-positive bid is simply left empty.
fn seed_book(
    sim: &mut SimExchange,
    instrument: &InstrumentId,
    mid: f64,
    spread: f64,
    tick: Price,
    depth: i64,
) {
    let bid = Price::from_f64(mid - spread / 2.0).map(|p| p.round_down_to_tick(tick));
    let ask = Price::from_f64(mid + spread / 2.0).map(|p| p.round_up_to_tick(tick));
    if let (Some(bid), Some(ask)) = (bid, ask) {
        sim.set_book(instrument, TopOfBook::new(bid, depth, ask, depth));
    }
}
