use crate::amount::{Denom, DenomError};
use crate::time::ONE_YEAR;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default reward token.
pub const DEFAULT_REWARD_DENOM: &str = "umint";

/// Rejections raised on the parameter write path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: Decimal },
    #[error("invalid reward denom: {0}")]
    Denom(#[from] DenomError),
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("cannot parse {name} from {value:?}: {reason}")]
    Unparsable {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Governance-controlled emission parameters.
///
/// Validated once when written. The engine reads them as-is and absorbs any
/// out-of-range rate by clamping, so a bad value here can never halt a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionParams {
    /// When false, blocks advance the release trackers without emitting.
    pub release_enabled: bool,
    /// Effective release rate in `[0, 1]`. Dilution writes the decayed value back.
    pub release_rate: Decimal,
    /// Fraction of the release rate removed at each dilution, in `[0, 1]`.
    pub dilution_rate: Decimal,
    /// Minimum time between two dilutions.
    pub dilution_period: Duration,
    /// Token emitted from the reward pool.
    pub reward_denom: Denom,
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            release_enabled: true,
            // 10%
            release_rate: Decimal::new(10, 2),
            // decay by 10% each period
            dilution_rate: Decimal::new(10, 2),
            dilution_period: ONE_YEAR,
            reward_denom: Denom(DEFAULT_REWARD_DENOM.to_string()),
        }
    }
}

impl EmissionParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        validate_unit_rate("release_rate", self.release_rate)?;
        validate_unit_rate("dilution_rate", self.dilution_rate)?;
        Denom::new(self.reward_denom.as_str())?;
        Ok(())
    }
}

pub fn validate_unit_rate(name: &'static str, value: Decimal) -> Result<(), ParamsError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ParamsError::RateOutOfRange { name, value });
    }
    Ok(())
}
