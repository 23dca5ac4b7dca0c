//! Persisted emission trackers owned by the emission engine.

use crate::time::BlockTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four scalar fields the engine reads and rewrites each block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionState {
    /// Block time of the last release (or paused) block.
    pub last_release_timestamp: BlockTime,
    /// Block time of the last dilution, or of the last paused block.
    pub last_dilution_timestamp: BlockTime,
    /// Annual emission target in token units per year.
    pub annual_provisions: Decimal,
    /// Mirror of the effective release rate after dilution write-back.
    pub release_rate: Decimal,
}

impl EmissionState {
    /// State at chain start: both trackers point at the genesis time.
    pub fn genesis(start: BlockTime, annual_provisions: Decimal, release_rate: Decimal) -> Self {
        Self {
            last_release_timestamp: start,
            last_dilution_timestamp: start,
            annual_provisions,
            release_rate,
        }
    }

    /// Move both trackers to `now` without touching provisions or rate.
    pub fn reset_trackers(&mut self, now: BlockTime) {
        self.last_release_timestamp = now;
        self.last_dilution_timestamp = now;
    }
}
