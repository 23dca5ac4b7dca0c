//! Account ledger interface for reward distribution
//!
//! Provides a minimal, deterministic balance/transfer interface over the
//! persisted store. Module accounts (the reward pool escrow and the fee
//! collector) are plain named accounts in the same ledger.

use mint_storage::{Storage, StorageError};
use mint_types::{AccountName, Denom, TokenAmount};
use thiserror::Error;
use tracing::debug;

/// Escrow account holding the distributable reward supply.
pub const REWARD_POOL: &str = "reward_pool";

/// Fee/distribution sink that receives emitted rewards.
pub const FEE_COLLECTOR: &str = "fee_collector";

pub fn reward_pool_account() -> AccountName {
    AccountName::module(REWARD_POOL)
}

pub fn fee_collector_account() -> AccountName {
    AccountName::module(FEE_COLLECTOR)
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("insufficient funds in {account}: requested {requested}{denom}, available {available}{denom}")]
    InsufficientFunds {
        account: AccountName,
        denom: Denom,
        requested: TokenAmount,
        available: TokenAmount,
    },
    #[error("balance overflow crediting {account} with {amount}{denom}")]
    Overflow {
        account: AccountName,
        denom: Denom,
        amount: TokenAmount,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Interface for account ledger operations.
pub trait AccountLedger {
    fn balance(&self, account: &AccountName, denom: &Denom) -> Result<TokenAmount, StorageError>;

    fn credit(
        &self,
        account: &AccountName,
        denom: &Denom,
        amount: TokenAmount,
    ) -> Result<(), TransferError>;

    fn debit(
        &self,
        account: &AccountName,
        denom: &Denom,
        amount: TokenAmount,
    ) -> Result<(), TransferError>;

    /// Move `amount` between two accounts. The debit is checked first, so an
    /// insufficient balance leaves both accounts untouched.
    fn transfer(
        &self,
        from: &AccountName,
        to: &AccountName,
        denom: &Denom,
        amount: TokenAmount,
    ) -> Result<(), TransferError> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let to_balance = self.balance(to, denom)?;
        if to_balance.checked_add(amount).is_none() {
            return Err(TransferError::Overflow {
                account: to.clone(),
                denom: denom.clone(),
                amount,
            });
        }
        self.debit(from, denom, amount)?;
        self.credit(to, denom, amount)?;
        debug!(
            target: "treasury",
            %from, %to, %denom, amount,
            "Transferred between accounts"
        );
        Ok(())
    }
}

/// Ledger over any [`Storage`] (a committed backend or a block overlay).
pub struct StoreLedger<'a, S: Storage + ?Sized> {
    store: &'a S,
}

impl<'a, S: Storage + ?Sized> StoreLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: Storage + ?Sized> AccountLedger for StoreLedger<'_, S> {
    fn balance(&self, account: &AccountName, denom: &Denom) -> Result<TokenAmount, StorageError> {
        self.store.get_balance(account, denom)
    }

    fn credit(
        &self,
        account: &AccountName,
        denom: &Denom,
        amount: TokenAmount,
    ) -> Result<(), TransferError> {
        let current = self.store.get_balance(account, denom)?;
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow {
                account: account.clone(),
                denom: denom.clone(),
                amount,
            })?;
        self.store.set_balance(account, denom, updated)?;
        Ok(())
    }

    fn debit(
        &self,
        account: &AccountName,
        denom: &Denom,
        amount: TokenAmount,
    ) -> Result<(), TransferError> {
        let current = self.store.get_balance(account, denom)?;
        if current < amount {
            return Err(TransferError::InsufficientFunds {
                account: account.clone(),
                denom: denom.clone(),
                requested: amount,
                available: current,
            });
        }
        self.store.set_balance(account, denom, current - amount)?;
        Ok(())
    }
}
