//! Outbound order pacing.
//!
//! The venue rate-limits order submissions; the loop guards against that
//! with a minimum gap between consecutive submissions and a hard cap on
//! submissions per cycle. Both are configuration knobs; the quoter and
//! hedger ask the pacer before every insert.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::warn;

/// Pacing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacerConfig {
    /// Minimum gap between consecutive order submissions, in milliseconds.
    #[serde(default = "default_min_order_gap_ms")]
    pub min_order_gap_ms: u64,
    /// Maximum order submissions per control-loop cycle.
    #[serde(default = "default_max_orders_per_cycle")]
    pub max_orders_per_cycle: u32,
}

fn default_min_order_gap_ms() -> u64 {
    12
}

fn default_max_orders_per_cycle() -> u32 {
    64
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            min_order_gap_ms: default_min_order_gap_ms(),
            max_orders_per_cycle: default_max_orders_per_cycle(),
        }
    }
}

/// Submission throttle. Owned by the driver, reset once per cycle.
#[derive(Debug)]
pub struct Pacer {
    config: PacerConfig,
    last_submission: Option<Instant>,
    submitted_this_cycle: u32,
}

impl Pacer {
    pub fn new(config: PacerConfig) -> Self {
        Self {
            config,
            last_submission: None,
            submitted_this_cycle: 0,
        }
    }

    /// Start a new control-loop cycle: the per-cycle counter resets, the
    /// inter-order gap does not.
    pub fn begin_cycle(&mut self) {
        self.submitted_this_cycle = 0;
    }

    /// Ask permission to submit one order. Sleeps out the remaining gap if
    /// needed. Returns `false` (and the caller skips the order) once the
    /// per-cycle cap is reached.
    pub fn admit(&mut self) -> bool {
        if self.submitted_this_cycle >= self.config.max_orders_per_cycle {
            warn!(
                cap = self.config.max_orders_per_cycle,
                "Per-cycle order cap reached; skipping submission"
            );
            return false;
        }

        let gap = Duration::from_millis(self.config.min_order_gap_ms);
        if let Some(last) = self.last_submission {
            let elapsed = last.elapsed();
            if elapsed < gap {
                std::thread::sleep(gap - elapsed);
            }
        }

        self.last_submission = Some(Instant::now());
        self.submitted_this_cycle += 1;
        true
    }
}
