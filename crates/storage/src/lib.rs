//! Mint Storage
//!
//! Byte-level key/value backends (`MemoryStorage`, `SledStorage`), a typed
//! [`Storage`] view over any of them, and the [`BlockOverlay`] used by hosts to
//! commit one block's writes atomically.
//!
//! Every read or write failure surfaces as [`StorageError`]. Callers on the
//! block path treat it as fatal: a value is never substituted with a default.

use mint_types::{AccountName, Denom, EmissionParams, EmissionState, TokenAmount};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod memory;
pub mod overlay;
pub mod sled_store;

pub use memory::MemoryStorage;
pub use overlay::BlockOverlay;
pub use sled_store::SledStorage;

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupted value under {key}: {reason}")]
    Corrupted { key: String, reason: String },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Key layout. Emission state lives under the module-private `mint/` prefix.
pub mod keys {
    use mint_types::{AccountName, Denom};

    pub const PARAMS: &[u8] = b"mint/params";
    pub const EMISSION_STATE: &[u8] = b"mint/state";
    pub const LATEST_HEIGHT: &[u8] = b"meta/latest_height";

    const BALANCE_PREFIX: &str = "bank/balance/";

    /// `bank/balance/<account>\0<denom>`. Neither account names nor denoms
    /// can contain NUL.
    pub fn balance(account: &AccountName, denom: &Denom) -> Vec<u8> {
        let mut key = Vec::with_capacity(BALANCE_PREFIX.len() + 64);
        key.extend_from_slice(BALANCE_PREFIX.as_bytes());
        key.extend_from_slice(account.as_str().as_bytes());
        key.push(0);
        key.extend_from_slice(denom.as_str().as_bytes());
        key
    }

    pub fn display(key: &[u8]) -> String {
        String::from_utf8_lossy(key).replace('\0', "/")
    }
}

/// Ordered set of pending writes. `None` deletes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.ops.insert(key.into(), Some(value));
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.insert(key.into(), None);
    }

    /// Pending state for `key`: `Some(None)` means deleted in this batch.
    pub fn lookup(&self, key: &[u8]) -> Option<Option<&Vec<u8>>> {
        self.ops.get(key).map(Option::as_ref)
    }

    /// Later writes win.
    pub fn merge(&mut self, other: WriteBatch) {
        self.ops.extend(other.ops);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &Option<Vec<u8>>)> {
        self.ops.iter()
    }

    pub fn into_ops(self) -> impl Iterator<Item = (Vec<u8>, Option<Vec<u8>>)> {
        self.ops.into_iter()
    }
}

/// Raw byte store. Implementations must apply a batch atomically.
pub trait KvStore {
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;
    fn apply_batch(&self, batch: WriteBatch) -> Result<(), StorageError>;

    fn put_raw(&self, key: &[u8], value: Vec<u8>) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        batch.put(key, value);
        self.apply_batch(batch)
    }
}

/// Typed accessors used by the emission engine, treasury and hosts.
pub trait Storage {
    fn get_params(&self) -> Result<Option<EmissionParams>, StorageError>;
    fn set_params(&self, params: &EmissionParams) -> Result<(), StorageError>;

    fn get_emission_state(&self) -> Result<Option<EmissionState>, StorageError>;
    fn set_emission_state(&self, state: &EmissionState) -> Result<(), StorageError>;

    /// Missing balances read as zero.
    fn get_balance(&self, account: &AccountName, denom: &Denom)
        -> Result<TokenAmount, StorageError>;
    fn set_balance(
        &self,
        account: &AccountName,
        denom: &Denom,
        amount: TokenAmount,
    ) -> Result<(), StorageError>;

    /// Height of the last committed block, zero before the first block.
    fn get_latest_height(&self) -> Result<u64, StorageError>;
    fn set_latest_height(&self, height: u64) -> Result<(), StorageError>;
}

impl<T: KvStore + ?Sized> Storage for T {
    fn get_params(&self) -> Result<Option<EmissionParams>, StorageError> {
        get_json(self, keys::PARAMS)
    }

    fn set_params(&self, params: &EmissionParams) -> Result<(), StorageError> {
        put_json(self, keys::PARAMS, params)
    }

    fn get_emission_state(&self) -> Result<Option<EmissionState>, StorageError> {
        get_json(self, keys::EMISSION_STATE)
    }

    fn set_emission_state(&self, state: &EmissionState) -> Result<(), StorageError> {
        put_json(self, keys::EMISSION_STATE, state)
    }

    fn get_balance(&self, account: &AccountName, denom: &Denom) -> Result<TokenAmount, StorageError> {
        let key = keys::balance(account, denom);
        match self.get_raw(&key)? {
            Some(bytes) => decode_fixed::<16>(&key, &bytes).map(TokenAmount::from_be_bytes),
            None => Ok(0),
        }
    }

    fn set_balance(
        &self,
        account: &AccountName,
        denom: &Denom,
        amount: TokenAmount,
    ) -> Result<(), StorageError> {
        self.put_raw(&keys::balance(account, denom), amount.to_be_bytes().to_vec())
    }

    fn get_latest_height(&self) -> Result<u64, StorageError> {
        match self.get_raw(keys::LATEST_HEIGHT)? {
            Some(bytes) => decode_fixed::<8>(keys::LATEST_HEIGHT, &bytes).map(u64::from_be_bytes),
            None => Ok(0),
        }
    }

    fn set_latest_height(&self, height: u64) -> Result<(), StorageError> {
        self.put_raw(keys::LATEST_HEIGHT, height.to_be_bytes().to_vec())
    }
}

fn get_json<S, T>(store: &S, key: &[u8]) -> Result<Option<T>, StorageError>
where
    S: KvStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .get_raw(key)?
        .map(|v| serde_json::from_slice(&v))
        .transpose()
        .map_err(Into::into)
}

fn put_json<S, T>(store: &S, key: &[u8], value: &T) -> Result<(), StorageError>
where
    S: KvStore + ?Sized,
    T: Serialize,
{
    store.put_raw(key, serde_json::to_vec(value)?)
}

fn decode_fixed<const N: usize>(key: &[u8], bytes: &[u8]) -> Result<[u8; N], StorageError> {
    bytes.try_into().map_err(|_| StorageError::Corrupted {
        key: keys::display(key),
        reason: format!("expected {N} bytes, found {}", bytes.len()),
    })
}
