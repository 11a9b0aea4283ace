//! Quoting configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dynamic credit knobs.
///
/// The credit is a symmetric half-spread: quotes go out at theo - credit and
/// theo + credit before tick rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditConfig {
    /// Base credit (c0). Everything else scales around this.
    #[serde(default = "default_base_credit")]
    pub base_credit: f64,

    /// Multiplicative sensitivity to the underlying's relative spread.
    #[serde(default = "default_stock_spread_mult")]
    pub stock_spread_mult: f64,

    /// Multiplicative sensitivity to the option's relative spread.
    #[serde(default = "default_option_spread_mult")]
    pub option_spread_mult: f64,

    /// Additive weight on the underlying's absolute spread.
    #[serde(default = "default_stock_spread_add")]
    pub stock_spread_add: f64,

    /// Additive weight on the option's absolute spread.
    #[serde(default = "default_option_spread_add")]
    pub option_spread_add: f64,

    /// Floor as a fraction of base credit (floored again at one tick).
    #[serde(default = "default_floor_fraction")]
    pub floor_fraction: f64,

    /// Floor widening coefficient against 1/sqrt(time to expiry).
    #[serde(default = "default_expiry_floor_coeff")]
    pub expiry_floor_coeff: f64,

    /// Floor widening coefficient against |option delta|.
    #[serde(default = "default_delta_floor_coeff")]
    pub delta_floor_coeff: f64,

    /// Hard cap as a multiple of base credit.
    #[serde(default = "default_max_credit_mult")]
    pub max_credit_mult: f64,

    /// Smoothing weight of the newest raw credit (lambda).
    #[serde(default = "default_smooth_lambda")]
    pub smooth_lambda: f64,

    /// Portfolio-delta widening: slope per unit of |delta| beyond the grace
    /// band, and the cap on the resulting factor.
    #[serde(default = "default_global_widen_slope")]
    pub global_widen_slope: f64,
    #[serde(default = "default_global_widen_grace")]
    pub global_widen_grace: f64,
    #[serde(default = "default_global_widen_cap")]
    pub global_widen_cap: f64,

    /// Per-option widening against signed directional exposure.
    #[serde(default = "default_exposure_widen_slope")]
    pub exposure_widen_slope: f64,
    #[serde(default = "default_exposure_widen_cap")]
    pub exposure_widen_cap: f64,
}

fn default_base_credit() -> f64 {
    0.10
}
fn default_stock_spread_mult() -> f64 {
    0.6
}
fn default_option_spread_mult() -> f64 {
    1.6
}
fn default_stock_spread_add() -> f64 {
    0.06
}
fn default_option_spread_add() -> f64 {
    0.22
}
fn default_floor_fraction() -> f64 {
    0.6
}
fn default_expiry_floor_coeff() -> f64 {
    0.04
}
fn default_delta_floor_coeff() -> f64 {
    0.04
}
fn default_max_credit_mult() -> f64 {
    5.0
}
fn default_smooth_lambda() -> f64 {
    0.25
}
fn default_global_widen_slope() -> f64 {
    0.02
}
fn default_global_widen_grace() -> f64 {
    10.0
}
fn default_global_widen_cap() -> f64 {
    1.25
}
fn default_exposure_widen_slope() -> f64 {
    0.002
}
fn default_exposure_widen_cap() -> f64 {
    0.15
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            base_credit: default_base_credit(),
            stock_spread_mult: default_stock_spread_mult(),
            option_spread_mult: default_option_spread_mult(),
            stock_spread_add: default_stock_spread_add(),
            option_spread_add: default_option_spread_add(),
            floor_fraction: default_floor_fraction(),
            expiry_floor_coeff: default_expiry_floor_coeff(),
            delta_floor_coeff: default_delta_floor_coeff(),
            max_credit_mult: default_max_credit_mult(),
            smooth_lambda: default_smooth_lambda(),
            global_widen_slope: default_global_widen_slope(),
            global_widen_grace: default_global_widen_grace(),
            global_widen_cap: default_global_widen_cap(),
            exposure_widen_slope: default_exposure_widen_slope(),
            exposure_widen_cap: default_exposure_widen_cap(),
        }
    }
}

/// Dynamic volume knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Base lot size before scaling.
    #[serde(default = "default_base_volume")]
    pub base_volume: f64,

    /// Hard cap on the quoted lot size.
    #[serde(default = "default_max_quote_volume")]
    pub max_quote_volume: i64,

    /// Soft limit on aggregate portfolio |delta|; risk factors shrink as it
    /// is approached.
    #[serde(default = "default_soft_delta_limit")]
    pub soft_delta_limit: f64,

    /// Floor on each shrinking factor.
    #[serde(default = "default_min_factor")]
    pub min_factor: f64,

    /// Relative spread assumed when the option book is unavailable.
    #[serde(default = "default_fallback_rel_spread")]
    pub fallback_rel_spread: f64,

    /// Safety buffer on the worst-case one-sided-fill delta cap.
    #[serde(default = "default_delta_buffer")]
    pub delta_buffer: f64,

    /// |delta| floor in the worst-case cap, so far-OTM options cannot ask
    /// for unbounded size.
    #[serde(default = "default_min_abs_delta")]
    pub min_abs_delta: f64,
}

fn default_base_volume() -> f64 {
    3.0
}
fn default_max_quote_volume() -> i64 {
    20
}
fn default_soft_delta_limit() -> f64 {
    100.0
}
fn default_min_factor() -> f64 {
    0.30
}
fn default_fallback_rel_spread() -> f64 {
    0.05
}
fn default_delta_buffer() -> f64 {
    0.5
}
fn default_min_abs_delta() -> f64 {
    0.05
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            base_volume: default_base_volume(),
            max_quote_volume: default_max_quote_volume(),
            soft_delta_limit: default_soft_delta_limit(),
            min_factor: default_min_factor(),
            fallback_rel_spread: default_fallback_rel_spread(),
            delta_buffer: default_delta_buffer(),
            min_abs_delta: default_min_abs_delta(),
        }
    }
}

/// Quoting configuration for one underlying and its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoterConfig {
    /// Exchange tick size.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,

    /// Hard position limit per instrument, in lots.
    #[serde(default = "default_position_limit")]
    pub position_limit: i64,

    #[serde(default)]
    pub credit: CreditConfig,

    #[serde(default)]
    pub volume: VolumeConfig,
}

fn default_tick_size() -> Decimal {
    Decimal::new(10, 2) // 0.10
}
fn default_position_limit() -> i64 {
    100
}

impl Default for QuoterConfig {
    fn default() -> Self {
        Self {
            tick_size: default_tick_size(),
            position_limit: default_position_limit(),
            credit: CreditConfig::default(),
            volume: VolumeConfig::default(),
        }
    }
}
