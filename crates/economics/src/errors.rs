use mint_storage::StorageError;
use mint_treasury::TransferError;
use mint_types::{BlockTime, ParamsError, TokenAmount};
use thiserror::Error;

/// Failures that abort a block. Every variant is fatal to block production.
#[derive(Debug, Error)]
pub enum EmissionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0} record is missing; genesis has not been initialized")]
    MissingRecord(&'static str),

    /// The pool paid less than it reported as remaining within one block.
    #[error("reward pool ledger is inconsistent: {0}")]
    LedgerInconsistent(TransferError),
}

impl From<TransferError> for EmissionError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Storage(storage) => EmissionError::Storage(storage),
            other => EmissionError::LedgerInconsistent(other),
        }
    }
}

/// Errors raised while importing or updating module state outside the block path.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("reward pool funding failed: {0}")]
    Funding(#[from] TransferError),

    #[error("genesis already initialized")]
    AlreadyInitialized,

    #[error("{0} record is missing; genesis has not been initialized")]
    NotInitialized(&'static str),

    #[error("annual provisions must be non-negative, got {0}")]
    NegativeProvisions(rust_decimal::Decimal),

    #[error("release rate {release_rate} × funding {funding} does not fit a decimal; set annual_provisions explicitly")]
    ProvisionsOverflow {
        release_rate: rust_decimal::Decimal,
        funding: TokenAmount,
    },

    #[error("last dilution time {last_dilution} is after start time {start}")]
    DilutionAfterStart {
        last_dilution: BlockTime,
        start: BlockTime,
    },
}

/// Rejections on the governance parameter write path. Nothing is written
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum ParamUpdateError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0} record is missing; genesis has not been initialized")]
    NotInitialized(&'static str),
}
