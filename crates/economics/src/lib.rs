//! Mint Economics
//!
//! The per-block emission hook: pro-rated release from the reward pool,
//! periodic dilution of the release rate, and the surrounding module plumbing
//! (genesis import/export, the governance parameter write path, queries and
//! event sinks).
//!
//! The engine is deterministic. It uses fixed-point decimals with truncation
//! toward zero and never consults a clock of its own; block time comes from
//! the host.

pub mod emission;
pub mod engine;
pub mod errors;
pub mod events;
pub mod genesis;
pub mod parameters;
pub mod query;

pub use emission::{annualized_share, block_provision, dilute_rate};
pub use engine::EmissionEngine;
pub use errors::{EmissionError, GenesisError, ParamUpdateError};
pub use events::{EventSink, MetricsEventSink, RecordingEventSink, SinkSet, TracingEventSink};
pub use genesis::{export_genesis, init_genesis, GenesisState};
pub use parameters::{
    parameter_value, parse_param_change, ParamChange, ParameterManager, PARAMETER_NAMES,
};
pub use query::{emission_status, EmissionStatusReport};

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
