//! Block-scoped write buffer.
//!
//! A [`BlockOverlay`] wraps a backend for the duration of one block. Reads see
//! the block's own pending writes first, then the backend. Nothing reaches the
//! backend until [`BlockOverlay::commit`], which hands every pending write to
//! the backend as a single atomic batch. Dropping the overlay discards them.

use crate::{keys, KvStore, StorageError, WriteBatch};
use parking_lot::Mutex;
use tracing::debug;

pub struct BlockOverlay<'a, S: KvStore + ?Sized> {
    backend: &'a S,
    pending: Mutex<WriteBatch>,
}

impl<'a, S: KvStore + ?Sized> BlockOverlay<'a, S> {
    pub fn new(backend: &'a S) -> Self {
        Self {
            backend,
            pending: Mutex::new(WriteBatch::new()),
        }
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.lock().len()
    }

    /// Keys written so far, in key order.
    pub fn pending_keys(&self) -> Vec<String> {
        self.pending
            .lock()
            .iter()
            .map(|(key, _)| keys::display(key))
            .collect()
    }

    /// Apply all pending writes to the backend atomically.
    pub fn commit(self) -> Result<usize, StorageError> {
        let batch = self.pending.into_inner();
        let writes = batch.len();
        if writes > 0 {
            self.backend.apply_batch(batch)?;
        }
        debug!(target: "storage", writes, "Committed block overlay");
        Ok(writes)
    }

    /// Drop all pending writes.
    pub fn discard(self) -> usize {
        let writes = self.pending.into_inner().len();
        debug!(target: "storage", writes, "Discarded block overlay");
        writes
    }
}

impl<S: KvStore + ?Sized> KvStore for BlockOverlay<'_, S> {
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        if let Some(pending) = self.pending.lock().lookup(key) {
            return Ok(pending.cloned());
        }
        self.backend.get_raw(key)
    }

    fn apply_batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        self.pending.lock().merge(batch);
        Ok(())
    }
}
