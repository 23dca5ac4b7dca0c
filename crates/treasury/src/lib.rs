//! Mint Treasury
//!
//! Minimal balance/transfer ledger over the persisted store, the module
//! accounts used by the emission hook, and the reward pool interface the
//! engine pays block provisions from.

pub mod account_ledger;
pub mod reward_pool;

pub use account_ledger::{
    fee_collector_account, reward_pool_account, AccountLedger, StoreLedger, TransferError,
    FEE_COLLECTOR, REWARD_POOL,
};
pub use reward_pool::{ModuleRewardPool, RewardPool, RewardPoolSnapshot};
