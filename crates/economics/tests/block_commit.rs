use mint_economics::{
    emission_status, init_genesis, EmissionEngine, EmissionError, GenesisState,
    RecordingEventSink, TracingEventSink,
};
use mint_storage::{keys, BlockOverlay, KvStore, MemoryStorage, SledStorage, Storage, StorageError, WriteBatch};
use mint_types::{BlockContext, BlockTime, Decimal, EmissionStatus, MICROS_PER_SEC};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

const GENESIS_SECS: i64 = 1_700_000_000;
const DAY: i64 = 86_400;

fn genesis() -> GenesisState {
    let mut genesis = GenesisState::new(BlockTime::from_secs(GENESIS_SECS), 10_000);
    genesis.annual_provisions = Some(Decimal::from(1_000_000));
    genesis
}

fn block(height: u64, offset_secs: i64) -> BlockContext {
    BlockContext::new(
        height,
        BlockTime::from_micros((GENESIS_SECS + offset_secs) * MICROS_PER_SEC),
    )
}

/// Memory store that can be told to fail reads of one key or every write.
#[derive(Default)]
struct FaultyStore {
    inner: MemoryStorage,
    failing_read: parking_lot::Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl FaultyStore {
    fn fail_reads_of(&self, key: &[u8]) {
        *self.failing_read.lock() = Some(key.to_vec());
    }

    fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

impl KvStore for FaultyStore {
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        if self.failing_read.lock().as_deref() == Some(key) {
            return Err(StorageError::Unavailable(format!(
                "injected read failure on {}",
                keys::display(key)
            )));
        }
        self.inner.get_raw(key)
    }

    fn apply_batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.inner.apply_batch(batch)
    }
}

#[test]
fn same_block_time_twice_is_a_noop() {
    let store = MemoryStorage::new();
    init_genesis(&store, &genesis()).unwrap();
    let engine = EmissionEngine::new(TracingEventSink);

    let first = engine.run(&store, block(1, DAY)).unwrap();
    assert_eq!(first.emitted, 2_739);
    let after_first = store.snapshot();

    let second = engine.run(&store, block(2, DAY)).unwrap();
    assert_eq!(second.emitted, 0);
    assert_eq!(second.status, EmissionStatus::Stalled);
    assert_eq!(store.snapshot(), after_first);
}

#[test]
fn read_failure_is_fatal_for_every_record() {
    let balance_key = keys::balance(
        &mint_treasury::reward_pool_account(),
        &mint_types::Denom::new("umint").unwrap(),
    );
    for key in [keys::PARAMS.to_vec(), keys::EMISSION_STATE.to_vec(), balance_key] {
        let store = FaultyStore::default();
        init_genesis(&store, &genesis()).unwrap();
        let before = store.inner.snapshot();
        store.fail_reads_of(&key);

        let err = EmissionEngine::new(TracingEventSink)
            .run(&store, block(1, DAY))
            .unwrap_err();
        assert!(
            matches!(err, EmissionError::Storage(StorageError::Unavailable(_))),
            "{}: {err}",
            keys::display(&key)
        );
        assert_eq!(store.inner.snapshot(), before);
    }
}

#[test]
fn write_failure_is_fatal_and_nothing_persists() {
    let store = FaultyStore::default();
    init_genesis(&store, &genesis()).unwrap();
    let before = store.inner.snapshot();
    store.fail_writes();

    let err = EmissionEngine::new(TracingEventSink)
        .run(&store, block(1, DAY))
        .unwrap_err();
    assert!(matches!(err, EmissionError::Storage(_)));
    assert_eq!(store.inner.snapshot(), before);
}

#[test]
fn failed_commit_leaves_backend_untouched() {
    let store = FaultyStore::default();
    init_genesis(&store, &genesis()).unwrap();
    let before = store.inner.snapshot();

    let overlay = BlockOverlay::new(&store);
    let outcome = EmissionEngine::new(TracingEventSink)
        .run(&overlay, block(1, DAY))
        .unwrap();
    assert_eq!(outcome.emitted, 2_739);
    overlay.set_latest_height(1).unwrap();

    store.fail_writes();
    assert!(overlay.commit().is_err());
    assert_eq!(store.inner.snapshot(), before);
}

#[test]
fn aborted_block_rolls_back_engine_effects() {
    let store = MemoryStorage::new();
    init_genesis(&store, &genesis()).unwrap();
    let before = store.snapshot();
    let engine = EmissionEngine::new(RecordingEventSink::new());

    {
        let overlay = BlockOverlay::new(&store);
        engine.run(&overlay, block(1, DAY)).unwrap();
        assert!(overlay.pending_writes() >= 3);
        // Host aborts the block: overlay dropped without commit.
    }
    assert_eq!(store.snapshot(), before);

    // The aborted block's time window is still owed to the next block.
    let overlay = BlockOverlay::new(&store);
    let outcome = engine.run(&overlay, block(1, DAY)).unwrap();
    overlay.commit().unwrap();
    assert_eq!(outcome.emitted, 2_739);
    assert_eq!(engine.sink().len(), 2);
}

#[test]
fn sled_chain_resumes_after_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mint.db");
    let engine = EmissionEngine::new(TracingEventSink);

    {
        let storage = SledStorage::open(&path).unwrap();
        let overlay = BlockOverlay::new(&storage);
        init_genesis(&overlay, &genesis()).unwrap();
        overlay.commit().unwrap();

        for height in 1..=3 {
            let overlay = BlockOverlay::new(&storage);
            engine
                .run(&overlay, block(height, height as i64 * DAY))
                .unwrap();
            overlay.set_latest_height(height).unwrap();
            overlay.commit().unwrap();
        }
        storage.flush().unwrap();
    }

    let storage = SledStorage::open(&path).unwrap();
    let report = emission_status(&storage).unwrap();
    assert_eq!(report.latest_height, 3);
    assert_eq!(report.fee_collector_balance, 3 * 2_739);
    assert_eq!(report.reward_pool_remaining, 10_000 - 3 * 2_739);

    // Pool nearly drained: the fourth day is capped.
    let overlay = BlockOverlay::new(&storage);
    let outcome = engine.run(&overlay, block(4, 4 * DAY)).unwrap();
    overlay.commit().unwrap();
    assert_eq!(outcome.emitted, 10_000 - 3 * 2_739);
}
