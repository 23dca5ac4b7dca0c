//! Reward Pool Module
//!
//! Escrow balance from which the emission engine pays each block's
//! provision. The pool is a module account in the ledger; the engine only
//! sees the [`RewardPool`] interface.

use crate::account_ledger::{
    fee_collector_account, reward_pool_account, AccountLedger, StoreLedger, TransferError,
};
use mint_storage::{Storage, StorageError};
use mint_types::{AccountName, Denom, TokenAmount};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Source of emitted rewards.
pub trait RewardPool {
    /// Balance still available for emission.
    fn remaining(&self, denom: &Denom) -> Result<TokenAmount, StorageError>;

    /// Pay `amount` out of the pool to `destination`.
    fn transfer(
        &self,
        denom: &Denom,
        amount: TokenAmount,
        destination: &AccountName,
    ) -> Result<(), TransferError>;
}

/// Reward pool backed by a module account in an [`AccountLedger`].
pub struct ModuleRewardPool<L: AccountLedger> {
    ledger: L,
    account: AccountName,
}

impl<'a, S: Storage + ?Sized> ModuleRewardPool<StoreLedger<'a, S>> {
    /// Pool held by the default `reward_pool` module account.
    pub fn new(store: &'a S) -> Self {
        Self::with_ledger(StoreLedger::new(store), reward_pool_account())
    }
}

impl<L: AccountLedger> ModuleRewardPool<L> {
    pub fn with_ledger(ledger: L, account: AccountName) -> Self {
        Self { ledger, account }
    }

    pub fn account(&self) -> &AccountName {
        &self.account
    }

    /// Add newly escrowed supply to the pool (genesis funding).
    pub fn fund(&self, denom: &Denom, amount: TokenAmount) -> Result<(), TransferError> {
        self.ledger.credit(&self.account, denom, amount)?;
        info!(
            target: "treasury",
            account = %self.account, %denom, amount,
            "Funded reward pool"
        );
        Ok(())
    }

    pub fn snapshot(&self, denom: &Denom) -> Result<RewardPoolSnapshot, StorageError> {
        let sink = fee_collector_account();
        Ok(RewardPoolSnapshot {
            denom: denom.clone(),
            remaining: self.ledger.balance(&self.account, denom)?,
            distributed: self.ledger.balance(&sink, denom)?,
        })
    }
}

impl<L: AccountLedger> RewardPool for ModuleRewardPool<L> {
    fn remaining(&self, denom: &Denom) -> Result<TokenAmount, StorageError> {
        self.ledger.balance(&self.account, denom)
    }

    fn transfer(
        &self,
        denom: &Denom,
        amount: TokenAmount,
        destination: &AccountName,
    ) -> Result<(), TransferError> {
        self.ledger
            .transfer(&self.account, destination, denom, amount)?;
        debug!(
            target: "treasury",
            %denom, amount, %destination,
            "Paid block provision from reward pool"
        );
        Ok(())
    }
}

/// Pool balance versus what has reached the fee collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPoolSnapshot {
    pub denom: Denom,
    pub remaining: TokenAmount,
    pub distributed: TokenAmount,
}
