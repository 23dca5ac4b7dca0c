//! The per-block emission hook.
//!
//! [`EmissionEngine::run`] is called by the host exactly once per block,
//! before any transaction processing, against the block's write overlay.
//! Every effect it has (pool transfer, dilution write-back, tracker update)
//! lands in that overlay and is committed with the rest of the block.

use crate::emission::{annualized_share, block_provision, dilute_rate};
use crate::errors::EmissionError;
use crate::events::{EventSink, TracingEventSink};
use mint_storage::Storage;
use mint_treasury::{fee_collector_account, ModuleRewardPool, RewardPool};
use mint_types::{
    AccountName, BlockContext, EmissionOutcome, EmissionParams, EmissionRecord, EmissionState,
    EmissionStatus,
};
use tracing::{debug, info, warn};

pub struct EmissionEngine<E: EventSink = TracingEventSink> {
    sink: E,
    destination: AccountName,
}

impl Default for EmissionEngine<TracingEventSink> {
    fn default() -> Self {
        Self::new(TracingEventSink)
    }
}

impl<E: EventSink> EmissionEngine<E> {
    /// Engine paying into the fee collector module account.
    pub fn new(sink: E) -> Self {
        Self {
            sink,
            destination: fee_collector_account(),
        }
    }

    pub fn with_destination(mut self, destination: AccountName) -> Self {
        self.destination = destination;
        self
    }

    pub fn destination(&self) -> &AccountName {
        &self.destination
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Run the hook using the reward pool module account held in `store`.
    pub fn run<S: Storage + ?Sized>(
        &self,
        store: &S,
        block: BlockContext,
    ) -> Result<EmissionOutcome, EmissionError> {
        let pool = ModuleRewardPool::new(store);
        self.run_with_pool(store, &pool, block)
    }

    /// Run the hook against an explicit reward pool.
    pub fn run_with_pool<S, P>(
        &self,
        store: &S,
        pool: &P,
        block: BlockContext,
    ) -> Result<EmissionOutcome, EmissionError>
    where
        S: Storage + ?Sized,
        P: RewardPool + ?Sized,
    {
        let mut params = store
            .get_params()?
            .ok_or(EmissionError::MissingRecord("params"))?;
        let mut state = store
            .get_emission_state()?
            .ok_or(EmissionError::MissingRecord("emission state"))?;
        let remaining = pool.remaining(&params.reward_denom)?;

        let elapsed = block.time.micros_since(state.last_release_timestamp);
        if elapsed <= 0 {
            if elapsed < 0 {
                warn!(
                    target: "mint",
                    height = block.height,
                    block_time = %block.time,
                    last_release = %state.last_release_timestamp,
                    "Block time precedes last release; skipping emission"
                );
            }
            return Ok(EmissionOutcome {
                emitted: 0,
                release_rate: params.release_rate,
                status: EmissionStatus::Stalled,
            });
        }

        if !params.release_enabled {
            state.reset_trackers(block.time);
            store.set_emission_state(&state)?;
            debug!(
                target: "mint",
                height = block.height,
                "Release disabled; trackers advanced"
            );
            return Ok(EmissionOutcome {
                emitted: 0,
                release_rate: params.release_rate,
                status: EmissionStatus::Paused,
            });
        }

        let share = annualized_share(state.annual_provisions, elapsed);
        let emitted = block_provision(share, remaining);
        if emitted < share {
            debug!(
                target: "mint",
                height = block.height,
                share,
                remaining,
                "Reward pool caps the provision"
            );
        }
        if emitted > 0 {
            pool.transfer(&params.reward_denom, emitted, &self.destination)?;
        }

        let diluted = self.maybe_dilute(store, &mut params, &mut state, block)?;

        state.last_release_timestamp = block.time;
        store.set_emission_state(&state)?;

        self.sink.emit(&EmissionRecord {
            height: block.height,
            block_time: block.time,
            release_rate: params.release_rate,
            annual_provisions: state.annual_provisions,
            emitted_amount: emitted,
            denom: params.reward_denom.clone(),
            diluted,
        });

        Ok(EmissionOutcome {
            emitted,
            release_rate: params.release_rate,
            status: EmissionStatus::Released { diluted },
        })
    }

    fn maybe_dilute<S: Storage + ?Sized>(
        &self,
        store: &S,
        params: &mut EmissionParams,
        state: &mut EmissionState,
        block: BlockContext,
    ) -> Result<bool, EmissionError> {
        if !block
            .time
            .has_elapsed(state.last_dilution_timestamp, params.dilution_period)
        {
            return Ok(false);
        }

        let prior = params.release_rate;
        let diluted = dilute_rate(prior, params.dilution_rate);
        params.release_rate = diluted;
        state.release_rate = diluted;
        state.last_dilution_timestamp = block.time;
        store.set_params(params)?;

        info!(
            target: "mint",
            height = block.height,
            prior_rate = %prior,
            new_rate = %diluted,
            dilution_rate = %params.dilution_rate,
            "Diluted release rate"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEventSink;
    use mint_storage::MemoryStorage;
    use mint_types::{BlockTime, Decimal, Denom, MICROS_PER_SEC};
    use std::time::Duration;

    const GENESIS: BlockTime = BlockTime::from_secs(1_700_000_000);
    const DAY: i64 = 86_400;

    fn setup(pool: u128, params: EmissionParams) -> MemoryStorage {
        let store = MemoryStorage::new();
        store.set_params(&params).unwrap();
        store
            .set_emission_state(&EmissionState::genesis(
                GENESIS,
                Decimal::from(1_000_000),
                params.release_rate,
            ))
            .unwrap();
        ModuleRewardPool::new(&store)
            .fund(&params.reward_denom, pool)
            .unwrap();
        store
    }

    fn at(secs_after_genesis: i64, height: u64) -> BlockContext {
        BlockContext::new(
            height,
            BlockTime::from_micros(GENESIS.as_micros() + secs_after_genesis * MICROS_PER_SEC),
        )
    }

    fn umint() -> Denom {
        Denom::new("umint").unwrap()
    }

    #[test]
    fn one_day_release() {
        let store = setup(10_000, EmissionParams::default());
        let sink = RecordingEventSink::new();
        let engine = EmissionEngine::new(sink.clone());

        let outcome = engine.run(&store, at(DAY, 1)).unwrap();
        assert_eq!(outcome.emitted, 2_739);
        assert_eq!(outcome.status, EmissionStatus::Released { diluted: false });
        assert_eq!(
            store.get_balance(&fee_collector_account(), &umint()).unwrap(),
            2_739
        );
        assert_eq!(ModuleRewardPool::new(&store).remaining(&umint()).unwrap(), 7_261);

        let state = store.get_emission_state().unwrap().unwrap();
        assert_eq!(state.last_release_timestamp, at(DAY, 1).time);
        assert_eq!(state.last_dilution_timestamp, GENESIS);

        let record = sink.last().unwrap();
        assert_eq!(record.emitted_amount, 2_739);
        assert_eq!(record.height, 1);
    }

    #[test]
    fn pool_limits_release() {
        let store = setup(1_000, EmissionParams::default());
        let outcome = EmissionEngine::new(TracingEventSink).run(&store, at(DAY, 1)).unwrap();
        assert_eq!(outcome.emitted, 1_000);
        assert_eq!(ModuleRewardPool::new(&store).remaining(&umint()).unwrap(), 0);
    }

    #[test]
    fn dilution_after_period() {
        let params = EmissionParams {
            dilution_rate: Decimal::new(50, 2),
            dilution_period: Duration::from_secs(DAY as u64),
            ..EmissionParams::default()
        };
        let store = setup(10_000, params);
        let outcome = EmissionEngine::new(TracingEventSink).run(&store, at(DAY, 1)).unwrap();

        assert!(outcome.diluted());
        assert_eq!(outcome.release_rate, Decimal::new(5, 2));
        assert_eq!(
            store.get_params().unwrap().unwrap().release_rate,
            Decimal::new(5, 2)
        );
        let state = store.get_emission_state().unwrap().unwrap();
        assert_eq!(state.release_rate, Decimal::new(5, 2));
        assert_eq!(state.last_dilution_timestamp, at(DAY, 1).time);
        assert_eq!(state.annual_provisions, Decimal::from(1_000_000));
    }

    #[test]
    fn repeated_time_is_a_noop() {
        let store = setup(10_000, EmissionParams::default());
        let engine = EmissionEngine::new(TracingEventSink);
        engine.run(&store, at(DAY, 1)).unwrap();
        let before = store.snapshot();

        let outcome = engine.run(&store, at(DAY, 2)).unwrap();
        assert_eq!(outcome.emitted, 0);
        assert_eq!(outcome.status, EmissionStatus::Stalled);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn backwards_clock_is_a_noop() {
        let store = setup(10_000, EmissionParams::default());
        let before = store.snapshot();
        let outcome = EmissionEngine::new(TracingEventSink).run(&store, at(-60, 1)).unwrap();
        assert_eq!(outcome.status, EmissionStatus::Stalled);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn disabled_release_resets_trackers() {
        let params = EmissionParams {
            release_enabled: false,
            ..EmissionParams::default()
        };
        let store = setup(10_000, params);
        let sink = RecordingEventSink::new();
        let engine = EmissionEngine::new(sink.clone());

        let outcome = engine.run(&store, at(DAY, 1)).unwrap();
        assert_eq!(outcome.status, EmissionStatus::Paused);
        assert_eq!(outcome.emitted, 0);
        assert!(sink.is_empty());

        let state = store.get_emission_state().unwrap().unwrap();
        assert_eq!(state.last_release_timestamp, at(DAY, 1).time);
        assert_eq!(state.last_dilution_timestamp, at(DAY, 1).time);
        assert_eq!(ModuleRewardPool::new(&store).remaining(&umint()).unwrap(), 10_000);
    }

    #[test]
    fn missing_genesis_is_fatal() {
        let store = MemoryStorage::new();
        let err = EmissionEngine::new(TracingEventSink).run(&store, at(DAY, 1)).unwrap_err();
        assert!(matches!(err, EmissionError::MissingRecord("params")));
    }

    #[test]
    fn custom_destination_receives_emission() {
        let store = setup(10_000, EmissionParams::default());
        let community = AccountName::new("community_pool").unwrap();
        let engine = EmissionEngine::new(TracingEventSink).with_destination(community.clone());
        engine.run(&store, at(DAY, 1)).unwrap();
        assert_eq!(store.get_balance(&community, &umint()).unwrap(), 2_739);
    }
}
