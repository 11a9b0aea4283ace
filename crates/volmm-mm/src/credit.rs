//! Dynamic credit engine.
//!
//! Produces the symmetric half-spread quoted around the theoretical price.
//! The raw credit combines a multiplicative base driven by relative spreads
//! with an additive term driven by absolute spreads, is floored by a
//! risk-aware minimum, capped at a multiple of the base credit, and smoothed
//! exponentially across cycles.
//!
//! The smoothed state lives in `CreditBook`, owned by the loop driver and
//! passed in explicitly, so the computation itself stays a pure function.

use crate::config::CreditConfig;
use std::collections::HashMap;
use volmm_core::{InstrumentId, OptionKind};

/// Market view feeding one credit computation. `(mid, spread)` pairs are
/// `None` when the corresponding book is unavailable this cycle.
#[derive(Debug, Clone, Default)]
pub struct CreditInputs {
    pub stock: Option<(f64, f64)>,
    pub option: Option<(f64, f64)>,
    /// Years to expiry; `None` skips the expiry floor term.
    pub time_to_expiry: Option<f64>,
    /// Black-Scholes delta; `None` (pricing failed) skips the delta floor
    /// term rather than failing the quote.
    pub option_delta: Option<f64>,
    /// Portfolio-wide widening factor, neutral at 1.0.
    pub global_widen: f64,
    /// Per-option directional widening fraction, neutral at 0.0.
    pub exposure_widen: f64,
}

impl CreditInputs {
    /// Neutral inputs: no market data, no widening.
    pub fn neutral() -> Self {
        Self {
            global_widen: 1.0,
            exposure_widen: 0.0,
            ..Default::default()
        }
    }
}

/// Compute the raw (pre-smoothing) credit for one option this cycle.
///
/// Always returns a usable value: with both books empty the result is the
/// floored base credit.
pub fn compute_credit(config: &CreditConfig, tick_size: f64, inputs: &CreditInputs) -> f64 {
    let c0 = config.base_credit;

    // Multiplicative base from relative spreads; base credit alone when
    // either book is unavailable.
    let mult = match (inputs.stock, inputs.option) {
        (Some((s_mid, s_spread)), Some((o_mid, o_spread))) if s_mid > 0.0 && o_mid > 0.0 => {
            c0 * (1.0 + config.stock_spread_mult * (s_spread / s_mid))
                * (1.0 + config.option_spread_mult * (o_spread / o_mid))
        }
        _ => c0,
    };

    // Additive bump from absolute spreads.
    let add = match (inputs.stock, inputs.option) {
        (Some((_, s_spread)), Some((_, o_spread))) => {
            config.stock_spread_add * s_spread + config.option_spread_add * o_spread
        }
        _ => 0.0,
    };

    let mut raw = mult + add;

    // Risk-aware floor: at least one tick, widened near expiry and for
    // high-|delta| options.
    let mut floor = tick_size.max(config.floor_fraction * c0);
    if let Some(t) = inputs.time_to_expiry {
        floor = floor.max(c0 * (1.0 + config.expiry_floor_coeff / t.sqrt().max(1e-6)));
    }
    if let Some(delta) = inputs.option_delta {
        floor = floor.max(c0 * (1.0 + config.delta_floor_coeff * delta.abs()));
    }

    raw *= inputs.global_widen;
    raw *= 1.0 + inputs.exposure_widen;

    // Cap first, then floor: near expiry the floor may exceed the cap and
    // wins.
    floor.max((config.max_credit_mult * c0).min(raw))
}

/// Portfolio-level widening factor from aggregate |delta|.
pub fn global_widen_factor(config: &CreditConfig, total_delta: f64) -> f64 {
    let excess = (total_delta.abs() - config.global_widen_grace).max(0.0);
    (1.0 + config.global_widen_slope * excess).min(config.global_widen_cap)
}

/// Per-option widening fraction from signed directional exposure: long
/// calls and long puts widen the side that would grow the book further.
pub fn exposure_widen(config: &CreditConfig, position: i64, kind: OptionKind) -> f64 {
    let directional = position as f64 * kind.direction() as f64;
    (config.exposure_widen_slope * directional.max(0.0)).min(config.exposure_widen_cap)
}

/// Smoothed credit per option, carried across cycles.
///
/// Owned by the control loop driver; reset on restart.
#[derive(Debug, Default)]
pub struct CreditBook {
    credits: HashMap<InstrumentId, f64>,
}

impl CreditBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `raw` into the smoothed series for `instrument` and return the
    /// new smoothed value. The first observation passes through unchanged.
    pub fn smooth(&mut self, instrument: &InstrumentId, raw: f64, lambda: f64) -> f64 {
        let smoothed = match self.credits.get(instrument) {
            Some(previous) => (1.0 - lambda) * previous + lambda * raw,
            None => raw,
        };
        self.credits.insert(instrument.clone(), smoothed);
        smoothed
    }

    /// Last smoothed credit for an instrument, if any cycle has run.
    pub fn get(&self, instrument: &InstrumentId) -> Option<f64> {
        self.credits.get(instrument).copied()
    }

    pub fn len(&self) -> usize {
        self.credits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f64 = 0.10;

    fn config() -> CreditConfig {
        CreditConfig::default()
    }

    #[test]
    fn test_scenario_tight_stock_wide_option() {
        // Stock 99.95/100.05 (mid 100, spread 0.10), option 4.90/5.10
        // (mid 5, spread 0.20), defaults c0=0.10, alpha=0.6, beta=1.6.
        let inputs = CreditInputs {
            stock: Some((100.0, 0.10)),
            option: Some((5.0, 0.20)),
            ..CreditInputs::neutral()
        };
        let credit = compute_credit(&config(), TICK, &inputs);

        // mult = 0.1 * (1 + 0.6*0.001) * (1 + 1.6*0.04) = 0.10646384
        // add  = 0.06*0.10 + 0.22*0.20 = 0.05
        let expected = 0.1 * (1.0 + 0.6 * 0.001) * (1.0 + 1.6 * 0.04) + 0.05;
        assert!((credit - expected).abs() < 1e-9, "got {credit}");
        // Within floor and cap.
        assert!(credit >= 0.10 && credit <= 0.50);
    }

    #[test]
    fn test_empty_books_fall_back_to_base_floor() {
        let credit = compute_credit(&config(), TICK, &CreditInputs::neutral());
        // mult = c0, add = 0, floored at max(tick, 0.6*c0) = 0.10.
        assert!((credit - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_one_sided_availability_uses_base_mult() {
        let inputs = CreditInputs {
            stock: Some((100.0, 0.10)),
            option: None,
            ..CreditInputs::neutral()
        };
        let credit = compute_credit(&config(), TICK, &inputs);
        assert!((credit - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_cap_at_five_base_credits() {
        let inputs = CreditInputs {
            stock: Some((100.0, 5.0)),
            option: Some((5.0, 4.0)), // rel spread 0.8, huge
            ..CreditInputs::neutral()
        };
        let credit = compute_credit(&config(), TICK, &inputs);
        assert!((credit - 0.50).abs() < 1e-12);
    }

    #[test]
    fn test_floor_and_cap_for_any_finite_spreads() {
        let cfg = config();
        for (s_spread, o_spread) in [(0.0, 0.0), (0.01, 0.02), (1.0, 1.0), (50.0, 20.0)] {
            let inputs = CreditInputs {
                stock: Some((100.0, s_spread)),
                option: Some((5.0, o_spread)),
                ..CreditInputs::neutral()
            };
            let credit = compute_credit(&cfg, TICK, &inputs);
            assert!(credit >= 0.10, "floor violated for spreads {s_spread}/{o_spread}");
            assert!(credit <= 0.50 + 1e-12, "cap violated for spreads {s_spread}/{o_spread}");
        }
    }

    #[test]
    fn test_near_expiry_floor_can_exceed_cap() {
        let inputs = CreditInputs {
            time_to_expiry: Some(1e-6),
            ..CreditInputs::neutral()
        };
        let credit = compute_credit(&config(), TICK, &inputs);
        // floor = c0 * (1 + 0.04/1e-3) = 0.1 * 41 = 4.1, above the 0.5 cap.
        assert!((credit - 4.1).abs() < 1e-9, "got {credit}");
    }

    #[test]
    fn test_delta_floor_widens() {
        let inputs = CreditInputs {
            option_delta: Some(-1.0),
            ..CreditInputs::neutral()
        };
        let credit = compute_credit(&config(), TICK, &inputs);
        // floor = c0 * (1 + 0.04*1.0) = 0.104
        assert!((credit - 0.104).abs() < 1e-12);
    }

    #[test]
    fn test_widen_factors_scale_raw() {
        let base_inputs = CreditInputs {
            stock: Some((100.0, 0.10)),
            option: Some((5.0, 0.20)),
            ..CreditInputs::neutral()
        };
        let base = compute_credit(&config(), TICK, &base_inputs);

        let widened = compute_credit(
            &config(),
            TICK,
            &CreditInputs {
                global_widen: 1.25,
                exposure_widen: 0.15,
                ..base_inputs
            },
        );
        assert!((widened - (base * 1.25 * 1.15)).abs() < 1e-9);
    }

    #[test]
    fn test_global_widen_factor_grace_and_cap() {
        let cfg = config();
        assert!((global_widen_factor(&cfg, 0.0) - 1.0).abs() < 1e-12);
        assert!((global_widen_factor(&cfg, 10.0) - 1.0).abs() < 1e-12);
        // |delta| = 20: 1 + 0.02*10 = 1.2
        assert!((global_widen_factor(&cfg, -20.0) - 1.2).abs() < 1e-12);
        // Far beyond: capped.
        assert!((global_widen_factor(&cfg, 500.0) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_exposure_widen_direction_and_cap() {
        let cfg = config();
        // Long calls widen; short calls do not.
        assert!((exposure_widen(&cfg, 50, OptionKind::Call) - 0.10).abs() < 1e-12);
        assert!(exposure_widen(&cfg, -50, OptionKind::Call).abs() < 1e-12);
        // Long puts carry negative directional exposure.
        assert!(exposure_widen(&cfg, 50, OptionKind::Put).abs() < 1e-12);
        assert!((exposure_widen(&cfg, -50, OptionKind::Put) - 0.10).abs() < 1e-12);
        // Cap.
        assert!((exposure_widen(&cfg, 1000, OptionKind::Call) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_smoothing_first_cycle_passthrough() {
        let mut book = CreditBook::new();
        let id = InstrumentId::new("OPT");
        assert_eq!(book.smooth(&id, 0.2, 0.25), 0.2);
        assert_eq!(book.get(&id), Some(0.2));
    }

    #[test]
    fn test_smoothing_blends_quarter() {
        let mut book = CreditBook::new();
        let id = InstrumentId::new("OPT");
        book.smooth(&id, 0.2, 0.25);
        let next = book.smooth(&id, 0.1, 0.25);
        assert!((next - 0.175).abs() < 1e-12);
    }

    #[test]
    fn test_smoothing_converges_monotonically() {
        let mut book = CreditBook::new();
        let id = InstrumentId::new("OPT");
        book.smooth(&id, 0.4, 0.25);
        let mut previous = 0.4_f64;
        for _ in 0..40 {
            let next = book.smooth(&id, 0.1, 0.25);
            assert!(next < previous);
            assert!(next > 0.1);
            previous = next;
        }
        assert!((previous - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_smoothing_lambda_one_tracks_raw() {
        let mut book = CreditBook::new();
        let id = InstrumentId::new("OPT");
        book.smooth(&id, 0.4, 1.0);
        assert_eq!(book.smooth(&id, 0.1, 1.0), 0.1);
    }
}
