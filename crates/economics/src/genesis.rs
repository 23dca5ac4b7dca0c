//! Genesis import and export for the mint module.

use crate::errors::GenesisError;
use mint_storage::Storage;
use mint_treasury::{ModuleRewardPool, RewardPool};
use mint_types::{BlockTime, Decimal, EmissionParams, EmissionState, TokenAmount};
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub params: EmissionParams,
    /// Annual emission target. Derived as `release_rate × reward_pool_funding`
    /// when absent.
    #[serde(default)]
    pub annual_provisions: Option<Decimal>,
    pub start_time: BlockTime,
    /// Start of the current dilution period. Defaults to `start_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dilution_time: Option<BlockTime>,
    /// Tokens escrowed in the reward pool at chain start.
    #[serde(default)]
    pub reward_pool_funding: TokenAmount,
}

impl GenesisState {
    pub fn new(start_time: BlockTime, reward_pool_funding: TokenAmount) -> Self {
        Self {
            params: EmissionParams::default(),
            annual_provisions: None,
            start_time,
            last_dilution_time: None,
            reward_pool_funding,
        }
    }

    /// The configured annual provisions, or `release_rate × reward_pool_funding`.
    pub fn effective_annual_provisions(&self) -> Result<Decimal, GenesisError> {
        if let Some(provisions) = self.annual_provisions {
            return Ok(provisions);
        }
        let release_rate = self.params.release_rate;
        Decimal::from_u128(self.reward_pool_funding)
            .and_then(|funding| release_rate.checked_mul(funding))
            .ok_or(GenesisError::ProvisionsOverflow {
                release_rate,
                funding: self.reward_pool_funding,
            })
    }

    pub fn dilution_start(&self) -> BlockTime {
        self.last_dilution_time.unwrap_or(self.start_time)
    }
}

/// Write params, the emission trackers and the pool funding into `store`.
pub fn init_genesis<S: Storage + ?Sized>(
    store: &S,
    genesis: &GenesisState,
) -> Result<EmissionState, GenesisError> {
    genesis.params.validate()?;
    if store.get_params()?.is_some() || store.get_emission_state()?.is_some() {
        return Err(GenesisError::AlreadyInitialized);
    }

    let annual_provisions = genesis.effective_annual_provisions()?;
    if annual_provisions.is_sign_negative() {
        return Err(GenesisError::NegativeProvisions(annual_provisions));
    }
    let last_dilution = genesis.dilution_start();
    if last_dilution > genesis.start_time {
        return Err(GenesisError::DilutionAfterStart {
            last_dilution,
            start: genesis.start_time,
        });
    }

    let mut state = EmissionState::genesis(
        genesis.start_time,
        annual_provisions,
        genesis.params.release_rate,
    );
    state.last_dilution_timestamp = last_dilution;
    store.set_params(&genesis.params)?;
    store.set_emission_state(&state)?;
    if genesis.reward_pool_funding > 0 {
        ModuleRewardPool::new(store).fund(&genesis.params.reward_denom, genesis.reward_pool_funding)?;
    }

    info!(
        target: "mint",
        start_time = %genesis.start_time,
        annual_provisions = %annual_provisions,
        release_rate = %genesis.params.release_rate,
        funding = genesis.reward_pool_funding,
        "Initialized mint genesis"
    );
    Ok(state)
}

/// Current module state in genesis form.
///
/// `start_time` is the last release timestamp, `last_dilution_time` the last
/// dilution timestamp and the funding is the pool's remaining balance, so
/// importing the export resumes emission and dilution where they left off.
pub fn export_genesis<S: Storage + ?Sized>(store: &S) -> Result<GenesisState, GenesisError> {
    let params = store
        .get_params()?
        .ok_or(GenesisError::NotInitialized("params"))?;
    let state = store
        .get_emission_state()?
        .ok_or(GenesisError::NotInitialized("emission state"))?;
    let remaining = ModuleRewardPool::new(store).remaining(&params.reward_denom)?;

    Ok(GenesisState {
        params,
        annual_provisions: Some(state.annual_provisions),
        start_time: state.last_release_timestamp,
        last_dilution_time: Some(state.last_dilution_timestamp),
        reward_pool_funding: remaining,
    })
}
