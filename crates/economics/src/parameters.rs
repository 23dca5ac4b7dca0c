//! Emission parameter management and governance integration
//!
//! This is the only write path for [`EmissionParams`] outside genesis and the
//! engine's dilution write-back. Values are validated here so the engine can
//! read them without re-checking. The voting workflow that decides *whether*
//! a change is applied lives outside this crate.

use crate::errors::ParamUpdateError;
use mint_storage::Storage;
use mint_types::{validate_unit_rate, Decimal, Denom, EmissionParams, ParamsError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Names accepted by [`ParameterManager::apply_param_change`].
pub const PARAMETER_NAMES: [&str; 5] = [
    "release_enabled",
    "release_rate",
    "dilution_rate",
    "dilution_period_secs",
    "reward_denom",
];

/// Applied parameter change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamChange {
    pub name: String,
    pub previous: String,
    pub value: String,
}

/// Governance-side parameter manager. Keeps the history of changes it applied.
#[derive(Debug, Default)]
pub struct ParameterManager {
    history: Vec<ParamChange>,
}

impl ParameterManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ParamChange] {
        &self.history
    }

    /// Replace the whole parameter set.
    ///
    /// The release rate is mirrored into the emission state in the same
    /// write so the two never disagree.
    pub fn update_params<S: Storage + ?Sized>(
        &mut self,
        store: &S,
        params: EmissionParams,
    ) -> Result<(), ParamUpdateError> {
        params.validate()?;
        let mut state = store
            .get_emission_state()?
            .ok_or(ParamUpdateError::NotInitialized("emission state"))?;

        state.release_rate = params.release_rate;
        store.set_params(&params)?;
        store.set_emission_state(&state)?;

        info!(
            target: "mint",
            release_enabled = params.release_enabled,
            release_rate = %params.release_rate,
            dilution_rate = %params.dilution_rate,
            dilution_period_secs = params.dilution_period.as_secs(),
            reward_denom = %params.reward_denom,
            "Updated emission parameters"
        );
        Ok(())
    }

    /// Parse, validate and persist a single named parameter.
    pub fn apply_param_change<S: Storage + ?Sized>(
        &mut self,
        store: &S,
        name: &str,
        value: &str,
    ) -> Result<ParamChange, ParamUpdateError> {
        let current = store
            .get_params()?
            .ok_or(ParamUpdateError::NotInitialized("params"))?;
        let previous = parameter_value(&current, name)?;
        let updated = parse_param_change(current, name, value)?;
        let applied = parameter_value(&updated, name)?;

        self.update_params(store, updated)?;

        let change = ParamChange {
            name: name.to_string(),
            previous,
            value: applied,
        };
        self.history.push(change.clone());
        Ok(change)
    }
}

/// Apply `name = value` to `params` without touching storage.
pub fn parse_param_change(
    mut params: EmissionParams,
    name: &str,
    value: &str,
) -> Result<EmissionParams, ParamsError> {
    let value = value.trim();
    match name {
        "release_enabled" => {
            params.release_enabled = value.parse().map_err(|e: std::str::ParseBoolError| {
                unparsable("release_enabled", value, e)
            })?;
        }
        "release_rate" => {
            let rate = parse_decimal("release_rate", value)?;
            validate_unit_rate("release_rate", rate)?;
            params.release_rate = rate;
        }
        "dilution_rate" => {
            let rate = parse_decimal("dilution_rate", value)?;
            validate_unit_rate("dilution_rate", rate)?;
            params.dilution_rate = rate;
        }
        "dilution_period_secs" => {
            let secs: u64 = value
                .parse()
                .map_err(|e: std::num::ParseIntError| unparsable("dilution_period_secs", value, e))?;
            params.dilution_period = Duration::from_secs(secs);
        }
        "reward_denom" => {
            params.reward_denom = Denom::new(value)?;
        }
        other => return Err(ParamsError::UnknownParameter(other.to_string())),
    }
    Ok(params)
}

/// Current value of a named parameter, formatted the way it is parsed.
pub fn parameter_value(params: &EmissionParams, name: &str) -> Result<String, ParamsError> {
    Ok(match name {
        "release_enabled" => params.release_enabled.to_string(),
        "release_rate" => params.release_rate.to_string(),
        "dilution_rate" => params.dilution_rate.to_string(),
        "dilution_period_secs" => params.dilution_period.as_secs().to_string(),
        "reward_denom" => params.reward_denom.to_string(),
        other => return Err(ParamsError::UnknownParameter(other.to_string())),
    })
}

fn parse_decimal(name: &'static str, value: &str) -> Result<Decimal, ParamsError> {
    Decimal::from_str(value).map_err(|e| unparsable(name, value, e))
}

fn unparsable(name: &'static str, value: &str, reason: impl ToString) -> ParamsError {
    ParamsError::Unparsable {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mint_storage::MemoryStorage;
    use mint_types::{BlockTime, EmissionState};

    fn initialized() -> MemoryStorage {
        let store = MemoryStorage::new();
        let params = EmissionParams::default();
        store.set_params(&params).unwrap();
        store
            .set_emission_state(&EmissionState::genesis(
                BlockTime::from_secs(0),
                Decimal::from(1_000),
                params.release_rate,
            ))
            .unwrap();
        store
    }

    #[test]
    fn release_rate_change_mirrors_into_state() {
        let store = initialized();
        let mut manager = ParameterManager::new();

        let change = manager
            .apply_param_change(&store, "release_rate", "0.25")
            .unwrap();
        assert_eq!(change.previous, "0.10");
        assert_eq!(change.value, "0.25");

        assert_eq!(
            store.get_params().unwrap().unwrap().release_rate,
            Decimal::new(25, 2)
        );
        assert_eq!(
            store.get_emission_state().unwrap().unwrap().release_rate,
            Decimal::new(25, 2)
        );
        assert_eq!(manager.history().len(), 1);
    }

    #[test]
    fn out_of_range_rate_writes_nothing() {
        let store = initialized();
        let before = store.snapshot();
        let mut manager = ParameterManager::new();

        let err = manager
            .apply_param_change(&store, "dilution_rate", "1.2")
            .unwrap_err();
        assert!(matches!(
            err,
            ParamUpdateError::Params(ParamsError::RateOutOfRange {
                name: "dilution_rate",
                ..
            })
        ));
        assert_eq!(store.snapshot(), before);
        assert!(manager.history().is_empty());
    }

    #[test]
    fn unknown_and_unparsable_values_are_rejected() {
        let params = EmissionParams::default();
        assert!(matches!(
            parse_param_change(params.clone(), "inflation_max", "1"),
            Err(ParamsError::UnknownParameter(_))
        ));
        assert!(matches!(
            parse_param_change(params.clone(), "release_enabled", "maybe"),
            Err(ParamsError::Unparsable { .. })
        ));
        assert!(matches!(
            parse_param_change(params.clone(), "dilution_period_secs", "-1"),
            Err(ParamsError::Unparsable { .. })
        ));
        assert!(matches!(
            parse_param_change(params, "reward_denom", "9coin"),
            Err(ParamsError::Denom(_))
        ));
    }

    #[test]
    fn every_named_parameter_round_trips() {
        let params = EmissionParams::default();
        for name in PARAMETER_NAMES {
            let value = parameter_value(&params, name).unwrap();
            let parsed = parse_param_change(params.clone(), name, &value).unwrap();
            assert_eq!(parsed, params, "{name}");
        }
    }

    #[test]
    fn uninitialized_store_is_rejected() {
        let store = MemoryStorage::new();
        let err = ParameterManager::new()
            .apply_param_change(&store, "release_enabled", "false")
            .unwrap_err();
        assert!(matches!(err, ParamUpdateError::NotInitialized("params")));
    }

    #[test]
    fn period_and_toggle_changes() {
        let store = initialized();
        let mut manager = ParameterManager::new();
        manager
            .apply_param_change(&store, "dilution_period_secs", "86400")
            .unwrap();
        manager
            .apply_param_change(&store, "release_enabled", "false")
            .unwrap();

        let params = store.get_params().unwrap().unwrap();
        assert_eq!(params.dilution_period, Duration::from_secs(86_400));
        assert!(!params.release_enabled);
    }
}
