use anyhow::{Context, Result};
use config::{Config, File as ConfigFile};
use mint_economics::GenesisState;
use mint_types::{BlockTime, Decimal, Denom, EmissionParams};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/mint.toml";
const DEFAULT_DATA_DIR: &str = "./data/mint";

/// Node configuration: optional TOML file, then `MINT_*` environment
/// variables, then command line overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_path: Option<PathBuf>,

    // Storage
    pub data_dir: PathBuf,
    pub db_path: PathBuf,

    // Block production
    pub block_interval: Duration,

    // Observability
    pub prometheus_enabled: bool,

    // Logging
    pub log_level: String,
    pub log_format: String,

    pub genesis: GenesisConfig,
}

/// Genesis values used by `init` when no genesis file is given.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    pub start_time: Option<BlockTime>,
    pub reward_pool_funding: u128,
    pub annual_provisions: Option<Decimal>,
    pub params: EmissionParams,
}

impl GenesisConfig {
    /// Genesis state anchored at the configured start time, or at `now`.
    pub fn to_genesis(&self, now: BlockTime) -> GenesisState {
        GenesisState {
            params: self.params.clone(),
            annual_provisions: self.annual_provisions,
            start_time: self.start_time.unwrap_or(now),
            last_dilution_time: None,
            reward_pool_funding: self.reward_pool_funding,
        }
    }
}

impl AppConfig {
    pub fn load(config_path_override: Option<&str>) -> Result<Self> {
        let resolved_path = if let Some(path) = config_path_override {
            let path = PathBuf::from(path);
            if !path.exists() {
                anyhow::bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            Some(path)
        } else {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            path.exists().then_some(path)
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(config::Environment::with_prefix("MINT"));
        let config = builder.build()?;

        let data_dir = get_string_value(&config, &["DATA_DIR", "storage.data_dir"])
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let db_path = get_string_value(&config, &["DB_PATH", "storage.db_path"])
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("db"));

        let block_interval_ms: u64 =
            get_string_value(&config, &["BLOCK_INTERVAL_MS", "node.block_interval_ms"])
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("block_interval_ms must be an integer")?;

        Ok(Self {
            config_path: resolved_path,
            data_dir,
            db_path,
            block_interval: Duration::from_millis(block_interval_ms),
            prometheus_enabled: get_bool_value(
                &config,
                &["PROMETHEUS_ENABLED", "metrics.enabled"],
                true,
            ),
            log_level: get_string_value(&config, &["LOG_LEVEL", "log.level"])
                .unwrap_or_else(|| "info".to_string()),
            log_format: get_string_value(&config, &["LOG_FORMAT", "log.format"])
                .unwrap_or_else(|| "pretty".to_string()),
            genesis: load_genesis(&config)?,
        })
    }

    pub fn set_data_dir(&mut self, data_dir: &Path) {
        self.data_dir = data_dir.to_path_buf();
        self.db_path = data_dir.join("db");
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.data_dir.join("metrics.prom")
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            anyhow::bail!("DATA_DIR must not be empty");
        }
        if self.db_path.as_os_str().is_empty() {
            anyhow::bail!("DB_PATH must not be empty");
        }
        if self.block_interval.is_zero() {
            anyhow::bail!("BLOCK_INTERVAL_MS must be greater than zero");
        }
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                self.log_format
            );
        }
        self.genesis
            .params
            .validate()
            .context("invalid genesis parameters")?;
        Ok(())
    }
}

fn load_genesis(config: &Config) -> Result<GenesisConfig> {
    let defaults = EmissionParams::default();

    let start_time = get_string_value(config, &["GENESIS_START_TIME", "genesis.start_time"])
        .map(|value| BlockTime::from_str(&value))
        .transpose()
        .context("genesis.start_time must be an RFC 3339 timestamp")?;
    let reward_pool_funding = get_string_value(
        config,
        &["GENESIS_REWARD_POOL_FUNDING", "genesis.reward_pool_funding"],
    )
    .unwrap_or_else(|| "1000000000000".to_string())
    .parse()
    .context("genesis.reward_pool_funding must be a non-negative integer")?;
    let annual_provisions = get_string_value(
        config,
        &["GENESIS_ANNUAL_PROVISIONS", "genesis.annual_provisions"],
    )
    .map(|value| Decimal::from_str(&value))
    .transpose()
    .context("genesis.annual_provisions must be a decimal")?;

    let params = EmissionParams {
        release_enabled: get_bool_value(
            config,
            &["GENESIS_RELEASE_ENABLED", "genesis.release_enabled"],
            defaults.release_enabled,
        ),
        release_rate: get_decimal_value(
            config,
            &["GENESIS_RELEASE_RATE", "genesis.release_rate"],
            defaults.release_rate,
        )?,
        dilution_rate: get_decimal_value(
            config,
            &["GENESIS_DILUTION_RATE", "genesis.dilution_rate"],
            defaults.dilution_rate,
        )?,
        dilution_period: match get_string_value(
            config,
            &["GENESIS_DILUTION_PERIOD_SECS", "genesis.dilution_period_secs"],
        ) {
            Some(value) => Duration::from_secs(
                value
                    .parse()
                    .context("genesis.dilution_period_secs must be an integer")?,
            ),
            None => defaults.dilution_period,
        },
        reward_denom: match get_string_value(
            config,
            &["GENESIS_REWARD_DENOM", "genesis.reward_denom"],
        ) {
            Some(value) => Denom::new(value)?,
            None => defaults.reward_denom,
        },
    };

    Ok(GenesisConfig {
        start_time,
        reward_pool_funding,
        annual_provisions,
        params,
    })
}

fn get_string_value(config: &Config, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        config
            .get_string(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

fn get_bool_value(config: &Config, keys: &[&str], default: bool) -> bool {
    for key in keys {
        if let Ok(value) = config.get_bool(key) {
            return value;
        }
        if let Ok(raw) = config.get_string(key) {
            if let Ok(parsed) = raw.parse::<bool>() {
                return parsed;
            }
        }
    }
    default
}

fn get_decimal_value(config: &Config, keys: &[&str], default: Decimal) -> Result<Decimal> {
    match get_string_value(config, keys) {
        Some(value) => Decimal::from_str(&value)
            .with_context(|| format!("{} must be a decimal, got '{value}'", keys[keys.len() - 1])),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mint.toml");
        fs::write(
            &path,
            r#"
[storage]
data_dir = "/tmp/mint-test"

[node]
block_interval_ms = 250

[log]
format = "json"

[genesis]
start_time = "2024-01-01T00:00:00Z"
reward_pool_funding = "10000"
annual_provisions = "1000000"
dilution_rate = "0.5"
dilution_period_secs = 86400
reward_denom = "ustake"
"#,
        )
        .unwrap();

        let config = AppConfig::load(path.to_str()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/mint-test"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/mint-test/db"));
        assert_eq!(config.block_interval, Duration::from_millis(250));
        assert_eq!(config.log_format, "json");

        let genesis = config.genesis.to_genesis(BlockTime::UNIX_EPOCH);
        assert_eq!(
            genesis.start_time,
            BlockTime::from_str("2024-01-01T00:00:00Z").unwrap()
        );
        assert_eq!(genesis.reward_pool_funding, 10_000);
        assert_eq!(genesis.annual_provisions, Some(Decimal::from(1_000_000)));
        assert_eq!(genesis.params.dilution_rate, Decimal::new(5, 1));
        assert_eq!(genesis.params.dilution_period, Duration::from_secs(86_400));
        assert_eq!(genesis.params.reward_denom.as_str(), "ustake");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load(Some("/nonexistent/mint.toml")).is_err());
    }

    #[test]
    fn invalid_genesis_rate_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mint.toml");
        fs::write(&path, "[genesis]\nrelease_rate = \"1.5\"\n").unwrap();

        let config = AppConfig::load(path.to_str()).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn start_time_defaults_to_now() {
        let genesis = GenesisConfig {
            start_time: None,
            reward_pool_funding: 0,
            annual_provisions: None,
            params: EmissionParams::default(),
        };
        let now = BlockTime::from_secs(42);
        assert_eq!(genesis.to_genesis(now).start_time, now);
    }
}
