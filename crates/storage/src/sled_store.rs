use crate::{KvStore, StorageError, WriteBatch};
use sled::{Db, Tree};
use std::path::Path;
use tracing::{debug, info};

const STATE_TREE: &str = "state";

/// Sled-backed implementation. All module state lives in one tree so that a
/// block commit is a single atomic `apply_batch`.
pub struct SledStorage {
    db: Db,
    state: Tree,
}

impl SledStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref())?;
        let storage = Self::from_db(db)?;
        info!(
            target: "storage",
            path = %path.as_ref().display(),
            entries = storage.state.len(),
            "Opened sled storage"
        );
        Ok(storage)
    }

    /// Throwaway database removed on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StorageError> {
        let state = db.open_tree(STATE_TREE)?;
        Ok(Self { db, state })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        let bytes = self.db.flush()?;
        debug!(target: "storage", bytes, "Flushed sled storage");
        Ok(())
    }
}

impl KvStore for SledStorage {
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.state.get(key)?.map(|v| v.to_vec()))
    }

    fn apply_batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut sled_batch = sled::Batch::default();
        for (key, value) in batch.into_ops() {
            match value {
                Some(value) => sled_batch.insert(key, value),
                None => sled_batch.remove(key),
            }
        }
        self.state.apply_batch(sled_batch)?;
        Ok(())
    }
}
