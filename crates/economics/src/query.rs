//! Read-only queries over committed mint state.

use crate::errors::GenesisError;
use mint_storage::Storage;
use mint_treasury::{fee_collector_account, reward_pool_account};
use mint_types::{EmissionParams, EmissionState, TokenAmount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionStatusReport {
    pub latest_height: u64,
    pub params: EmissionParams,
    pub state: EmissionState,
    pub reward_pool_remaining: TokenAmount,
    pub fee_collector_balance: TokenAmount,
}

pub fn emission_status<S: Storage + ?Sized>(
    store: &S,
) -> Result<EmissionStatusReport, GenesisError> {
    let params = store
        .get_params()?
        .ok_or(GenesisError::NotInitialized("params"))?;
    let state = store
        .get_emission_state()?
        .ok_or(GenesisError::NotInitialized("emission state"))?;
    let denom = &params.reward_denom;

    Ok(EmissionStatusReport {
        latest_height: store.get_latest_height()?,
        reward_pool_remaining: store.get_balance(&reward_pool_account(), denom)?,
        fee_collector_balance: store.get_balance(&fee_collector_account(), denom)?,
        params,
        state,
    })
}
