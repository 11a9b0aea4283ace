//! Full control-loop cycles against the in-memory exchange.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use volmm_bot::{AppConfig, Application};
use volmm_core::{
    Instrument, InstrumentId, OptionKind, OptionSeries, OrderType, Price, Side, TopOfBook,
};
use volmm_exchange::{ExchangeClient, PacerConfig, SimExchange};
use volmm_risk::HedgeOutcome;

fn stock_id() -> InstrumentId {
    "ASML".into()
}

fn far_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2036, 12, 31, 12, 0, 0).unwrap()
}

fn series(strike: Decimal, kind: OptionKind) -> OptionSeries {
    OptionSeries {
        base: stock_id(),
        strike,
        expiry: far_expiry(),
        kind,
    }
}

fn test_config(tag: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.quote_pause_ms = 0;
    config.cycle_sleep_ms = 0;
    config.pacer = PacerConfig {
        min_order_gap_ms: 0,
        max_orders_per_cycle: 500,
    };
    config.record_dir = std::env::temp_dir()
        .join(format!("volmm-bot-{tag}-{}", std::process::id()))
        .to_string_lossy()
        .into_owned();
    config
}

fn base_sim() -> SimExchange {
    let mut sim = SimExchange::new();
    sim.add_instrument(Instrument::stock(stock_id()));
    sim.set_book(
        &stock_id(),
        TopOfBook::new(Price::new(dec!(99.90)), 500, Price::new(dec!(100.10)), 500),
    );
    sim
}

fn add_option(
    sim: &mut SimExchange,
    id: &str,
    strike: Decimal,
    kind: OptionKind,
    book: Option<(Decimal, Decimal)>,
) -> InstrumentId {
    let id: InstrumentId = id.into();
    sim.add_instrument(Instrument::stock_option(id.clone(), series(strike, kind)));
    if let Some((bid, ask)) = book {
        sim.set_book(
            &id,
            TopOfBook::new(Price::new(bid), 10, Price::new(ask), 10),
        );
    }
    id
}

#[test]
fn test_cycle_quotes_every_option() {
    let mut sim = base_sim();
    let call = add_option(
        &mut sim,
        "ASML_C100",
        dec!(100),
        OptionKind::Call,
        Some((dec!(95.00), dec!(96.00))),
    );
    // Empty option book: credit falls back to its base, quoting proceeds.
    let put = add_option(&mut sim, "ASML_P100", dec!(100), OptionKind::Put, None);

    let mut app = Application::new(test_config("quotes"), sim);
    app.load_instruments().unwrap();
    assert_eq!(app.options().len(), 2);

    let report = app.cycle().unwrap();
    assert_eq!(report.quoted, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.hedge, Some(HedgeOutcome::WithinDeadband));

    for id in [&call, &put] {
        let orders = app.exchange().outstanding_orders(id).unwrap();
        assert_eq!(orders.len(), 2, "expected two quotes on {id}");
        let bid = orders.iter().find(|o| o.side == Side::Bid).unwrap();
        let ask = orders.iter().find(|o| o.side == Side::Ask).unwrap();
        assert!(bid.price < ask.price, "crossed quotes on {id}");
        assert!(bid.volume >= 1 && ask.volume >= 1);
    }
}

#[test]
fn test_cycle_skips_when_underlying_book_empty() {
    let mut sim = SimExchange::new();
    sim.add_instrument(Instrument::stock(stock_id()));
    let option = add_option(
        &mut sim,
        "ASML_C100",
        dec!(100),
        OptionKind::Call,
        Some((dec!(95.00), dec!(96.00))),
    );

    let mut app = Application::new(test_config("empty-underlying"), sim);
    app.load_instruments().unwrap();

    let report = app.cycle().unwrap();
    assert_eq!(report.quoted, 0);
    assert!(report.total_delta.is_none());
    assert!(report.hedge.is_none());
    assert!(app.exchange().outstanding_orders(&option).unwrap().is_empty());
    assert!(app.exchange().submitted_orders().is_empty());
}

#[test]
fn test_full_replace_keeps_one_quote_pair() {
    let mut sim = base_sim();
    let call = add_option(
        &mut sim,
        "ASML_C100",
        dec!(100),
        OptionKind::Call,
        Some((dec!(95.00), dec!(96.00))),
    );

    let mut app = Application::new(test_config("replace"), sim);
    app.load_instruments().unwrap();

    app.cycle().unwrap();
    app.cycle().unwrap();
    app.cycle().unwrap();

    // Full replace every cycle: exactly one resting pair survives.
    assert_eq!(app.exchange().outstanding_orders(&call).unwrap().len(), 2);
}

#[test]
fn test_position_limits_hold_and_delta_gets_hedged() {
    let mut sim = base_sim();
    let call = add_option(
        &mut sim,
        "ASML_C100",
        dec!(100),
        OptionKind::Call,
        Some((dec!(95.00), dec!(96.00))),
    );
    // Long 95 lots of a delta ~1 call: heavy directional exposure.
    sim.set_position(&call, 95);

    let mut app = Application::new(test_config("limits"), sim);
    app.load_instruments().unwrap();

    let report = app.cycle().unwrap();

    // Quote sizes respect the remaining headroom on both sides.
    let orders = app.exchange().outstanding_orders(&call).unwrap();
    for order in &orders {
        match order.side {
            Side::Bid => assert!(order.volume <= 5, "bid volume {}", order.volume),
            Side::Ask => assert!(order.volume <= 195),
        }
    }

    // Aggregate delta ~95 is far outside the deadband: one IOC sell of 95
    // at the underlying bid.
    match report.hedge {
        Some(HedgeOutcome::Hedged {
            side,
            volume,
            price,
        }) => {
            assert_eq!(side, Side::Ask);
            assert_eq!(volume, 95);
            assert_eq!(price, Price::new(dec!(99.90)));
        }
        other => panic!("expected a hedge, got {other:?}"),
    }
    assert_eq!(
        app.exchange().positions().unwrap()[&stock_id()],
        -95,
        "IOC should have filled against the seeded bid"
    );

    // The hedge order itself was an IOC on the underlying.
    let hedge_order = app
        .exchange()
        .submitted_orders()
        .iter()
        .find(|o| o.instrument == stock_id())
        .unwrap();
    assert_eq!(hedge_order.order_type, OrderType::Ioc);
}

#[test]
fn test_rejected_submission_does_not_stop_the_loop() {
    let mut sim = base_sim();
    let call = add_option(
        &mut sim,
        "ASML_C100",
        dec!(100),
        OptionKind::Call,
        Some((dec!(95.00), dec!(96.00))),
    );

    let mut app = Application::new(test_config("reject"), sim);
    app.load_instruments().unwrap();

    app.exchange_mut().reject_next_insert("simulated outage");
    let report = app.cycle().unwrap();
    assert_eq!(report.quoted, 1);

    // Next cycle recovers fully.
    let report = app.cycle().unwrap();
    assert_eq!(report.quoted, 1);
    assert_eq!(app.exchange().outstanding_orders(&call).unwrap().len(), 2);
}

#[test]
fn test_fills_between_cycles_are_reported_and_absorbed() {
    let mut sim = base_sim();
    let call = add_option(
        &mut sim,
        "ASML_C100",
        dec!(100),
        OptionKind::Call,
        Some((dec!(95.00), dec!(96.00))),
    );

    let mut app = Application::new(test_config("fills"), sim);
    app.load_instruments().unwrap();
    app.cycle().unwrap();

    // Someone lifts part of our resting bid between cycles.
    let bid = app
        .exchange()
        .outstanding_orders(&call)
        .unwrap()
        .into_iter()
        .find(|o| o.side == Side::Bid)
        .unwrap();
    app.exchange_mut()
        .fill_resting(&call, bid.order_id, bid.volume.min(2))
        .unwrap();

    let report = app.cycle().unwrap();
    assert_eq!(report.quoted, 1);
    assert!(app.exchange().positions().unwrap()[&call] >= 1);
}
