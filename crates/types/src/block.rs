//! Per-block inputs and outputs of the emission hook.

use crate::amount::{Denom, TokenAmount};
use crate::time::BlockTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Block being processed, supplied by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: u64,
    pub time: BlockTime,
}

impl BlockContext {
    pub fn new(height: u64, time: BlockTime) -> Self {
        Self { height, time }
    }
}

/// Which branch the engine took for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionStatus {
    /// Block time did not advance past the last release; nothing changed.
    Stalled,
    /// Release disabled; trackers moved forward, nothing emitted.
    Paused,
    /// Release ran. `diluted` is set when the rate decayed this block.
    Released { diluted: bool },
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionOutcome {
    pub emitted: TokenAmount,
    pub release_rate: Decimal,
    pub status: EmissionStatus,
}

impl EmissionOutcome {
    pub fn diluted(&self) -> bool {
        matches!(self.status, EmissionStatus::Released { diluted: true })
    }
}

/// Observability record published after a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub height: u64,
    pub block_time: BlockTime,
    pub release_rate: Decimal,
    pub annual_provisions: Decimal,
    pub emitted_amount: TokenAmount,
    pub denom: Denom,
    pub diluted: bool,
}
