//! Block production loop driving the emission hook.

use anyhow::{Context, Result};
use mint_economics::{EmissionEngine, EventSink};
use mint_storage::{BlockOverlay, KvStore, Storage};
use mint_types::{BlockContext, BlockTime, EmissionOutcome};
use std::time::Duration;
use tracing::{debug, error};

/// Source of block timestamps.
#[derive(Debug, Clone, Copy)]
pub enum BlockClock {
    /// `anchor + (height - anchor_height) × interval`; replays identically.
    Simulated {
        anchor: BlockTime,
        anchor_height: u64,
        interval: Duration,
    },
    Wall,
}

impl BlockClock {
    pub fn simulated(anchor: BlockTime, anchor_height: u64, interval: Duration) -> Self {
        BlockClock::Simulated {
            anchor,
            anchor_height,
            interval,
        }
    }

    pub fn time_for(&self, height: u64) -> BlockTime {
        match *self {
            BlockClock::Simulated {
                anchor,
                anchor_height,
                interval,
            } => {
                let blocks = u32::try_from(height.saturating_sub(anchor_height)).unwrap_or(u32::MAX);
                anchor.saturating_add(interval.saturating_mul(blocks))
            }
            BlockClock::Wall => BlockTime::now(),
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, BlockClock::Simulated { .. })
    }
}

pub struct BlockProducer<'a, S: KvStore + ?Sized, E: EventSink> {
    storage: &'a S,
    engine: EmissionEngine<E>,
    clock: BlockClock,
    next_height: u64,
}

impl<'a, S: KvStore + ?Sized, E: EventSink> BlockProducer<'a, S, E> {
    pub fn new(storage: &'a S, engine: EmissionEngine<E>, clock: BlockClock) -> Result<Self> {
        let latest = storage.get_latest_height()?;
        Ok(Self {
            storage,
            engine,
            clock,
            next_height: latest + 1,
        })
    }

    pub fn clock(&self) -> &BlockClock {
        &self.clock
    }

    pub fn next_height(&self) -> u64 {
        self.next_height
    }

    /// Run the emission hook for the next height and commit the block.
    ///
    /// On any failure the block's overlay is dropped, so nothing from the
    /// failed block reaches storage.
    pub fn produce_block(&mut self) -> Result<EmissionOutcome> {
        let height = self.next_height;
        let block = BlockContext::new(height, self.clock.time_for(height));

        let overlay = BlockOverlay::new(self.storage);
        let outcome = match self.engine.run(&overlay, block) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    target: "mint",
                    height,
                    block_time = %block.time,
                    error = %err,
                    "Emission hook failed; halting block production"
                );
                return Err(err).with_context(|| format!("block {height} failed"));
            }
        };
        overlay.set_latest_height(height)?;
        let writes = overlay
            .commit()
            .with_context(|| format!("failed to commit block {height}"))?;

        debug!(
            target: "mint",
            height,
            writes,
            emitted = outcome.emitted,
            "Committed block"
        );
        self.next_height += 1;
        Ok(outcome)
    }
}
