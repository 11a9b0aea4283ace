//! Dynamic volume engine.
//!
//! Chooses the symmetric quote size for one option this cycle: five bounded
//! scaling factors multiply a base size, then a worst-case-fill delta cap
//! and the position headroom clamp the result. The quote refresher
//! re-checks headroom independently and may still zero out one side.

use crate::config::VolumeConfig;

/// Inputs to one volume computation.
#[derive(Debug, Clone, Default)]
pub struct VolumeInputs {
    /// Option relative spread; `None` when the book is unavailable.
    pub option_rel_spread: Option<f64>,
    /// Smaller of top-of-book bid/ask depth; 0 when the book is unavailable.
    pub top_depth: i64,
    /// Aggregate portfolio delta at cycle start.
    pub total_delta: f64,
    /// Current underlying position.
    pub stock_position: i64,
    /// Current position in this option.
    pub option_position: i64,
    /// This option's delta; `None` skips the worst-case-fill cap.
    pub option_delta: Option<f64>,
}

/// Compute the lot size to quote on each side of one option.
///
/// Always at least 1; the refresher's own headroom check is what takes a
/// side to zero.
pub fn compute_volume(config: &VolumeConfig, position_limit: i64, inputs: &VolumeInputs) -> i64 {
    // Liquidity: tighter option book, larger size.
    let rel_spread = inputs
        .option_rel_spread
        .unwrap_or(config.fallback_rel_spread);
    let liquidity = (0.5 + 0.2 / rel_spread.max(0.002)).clamp(0.6, 3.0);

    // Depth: more size resting at the touch, larger size.
    let depth = 0.5 + (inputs.top_depth as f64 / 5.0).min(2.0);

    // Risk budget: shrink as |delta| approaches the soft limit.
    let soft = config.soft_delta_limit;
    let portfolio = ((soft - inputs.total_delta.abs()) / soft).max(config.min_factor);

    // Headroom in the underlying (hedge capacity) and in this option.
    let limit = position_limit as f64;
    let stock_headroom = (limit - (inputs.stock_position.abs() as f64)).max(0.0);
    let stock = (stock_headroom / limit).max(config.min_factor);
    let instrument =
        ((limit - (inputs.option_position.abs() as f64)) / limit).max(config.min_factor);

    let raw = config.base_volume * liquidity * depth * portfolio * stock * instrument;
    let mut volume = (raw.round() as i64).clamp(1, config.max_quote_volume);

    // Worst-case one-sided fill must not push |delta| past the soft limit,
    // with a safety buffer.
    if let Some(delta) = inputs.option_delta {
        let headroom = (soft - inputs.total_delta.abs()).max(0.0);
        let allowed = (config.delta_buffer * headroom / delta.abs().max(config.min_abs_delta))
            .floor() as i64;
        volume = volume.min(allowed).max(1);
    }

    let max_buy = position_limit - inputs.option_position;
    let max_sell = position_limit + inputs.option_position;
    volume
        .min(max_buy)
        .min(max_sell)
        .min(config.max_quote_volume)
        .max(1)
}
