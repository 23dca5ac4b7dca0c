//! Mint Types
//!
//! Shared data model for the per-block emission engine: block time, token
//! amounts and denoms, governance parameters, the persisted emission trackers
//! and the per-block outcome/record types.
//!
//! All rates are `rust_decimal::Decimal`; no floating point is used anywhere
//! in a consensus path.

pub mod amount;
pub mod block;
pub mod emission_state;
pub mod params;
pub mod time;

pub use amount::*;
pub use block::*;
pub use emission_state::*;
pub use params::*;
pub use time::*;

pub use rust_decimal::Decimal;
