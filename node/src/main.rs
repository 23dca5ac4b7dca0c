use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use mint_economics::{
    emission_status, export_genesis, init_genesis, EmissionEngine, GenesisState,
    MetricsEventSink, ParameterManager, SinkSet, TracingEventSink, PARAMETER_NAMES,
};
use mint_storage::{BlockOverlay, SledStorage};
use mint_types::BlockTime;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod producer;
mod version;

use config::AppConfig;
use producer::{BlockClock, BlockProducer};
use version::{git_commit_hash, MINT_VERSION};

fn cli() -> Command {
    Command::new("mint-node")
        .version(MINT_VERSION)
        .about("Mint module host: runs the emission hook once per block")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Data directory")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Override the log level")
                .global(true),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .value_parser(["pretty", "json"])
                .help("Select log output format")
                .global(true),
        )
        .arg(
            Arg::new("disable-metrics")
                .long("disable-metrics")
                .action(ArgAction::SetTrue)
                .help("Disable the Prometheus recorder")
                .global(true),
        )
        .subcommand(
            Command::new("init")
                .about("Write genesis state into the database")
                .arg(
                    Arg::new("genesis")
                        .long("genesis")
                        .value_name("FILE")
                        .help("Genesis JSON file; defaults to the [genesis] config section"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Produce blocks, running the emission hook for each")
                .arg(
                    Arg::new("blocks")
                        .short('n')
                        .long("blocks")
                        .value_name("COUNT")
                        .value_parser(value_parser!(u64))
                        .help("Stop after this many blocks; runs until Ctrl-C otherwise"),
                )
                .arg(
                    Arg::new("wall-clock")
                        .long("wall-clock")
                        .action(ArgAction::SetTrue)
                        .help("Stamp blocks with the system clock instead of the simulated clock"),
                ),
        )
        .subcommand(Command::new("status").about("Print emission status as JSON"))
        .subcommand(Command::new("export-genesis").about("Print current state as genesis JSON"))
        .subcommand(
            Command::new("set-param")
                .about("Apply a governance parameter change")
                .arg(
                    Arg::new("name")
                        .required(true)
                        .value_parser(PARAMETER_NAMES)
                        .help("Parameter name"),
                )
                .arg(Arg::new("value").required(true).help("New value")),
        )
}

fn load_config(matches: &ArgMatches) -> Result<AppConfig> {
    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = AppConfig::load(config_path)?;

    if let Some(data_dir) = matches.get_one::<String>("data-dir") {
        config.set_data_dir(Path::new(data_dir));
    }
    if let Some(log_level) = matches.get_one::<String>("log-level") {
        config.log_level = log_level.clone();
    }
    if let Some(log_format) = matches.get_one::<String>("log-format") {
        config.log_format = log_format.clone();
    }
    if matches.get_flag("disable-metrics") {
        config.prometheus_enabled = false;
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    Ok(())
}

fn init_metrics(config: &AppConfig) -> Option<PrometheusHandle> {
    if !config.prometheus_enabled {
        info!("Prometheus metrics recorder disabled via configuration");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder registered");
            MetricsEventSink::describe();
            Some(handle)
        }
        Err(err) => {
            warn!("Failed to install Prometheus metrics recorder: {}", err);
            None
        }
    }
}

fn open_storage(config: &AppConfig) -> Result<SledStorage> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    SledStorage::open(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(config: &AppConfig, matches: &ArgMatches) -> Result<()> {
    let genesis = match matches.get_one::<String>("genesis") {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read genesis file {path}"))?;
            serde_json::from_str::<GenesisState>(&raw)
                .with_context(|| format!("invalid genesis file {path}"))?
        }
        None => config.genesis.to_genesis(BlockTime::now()),
    };

    let storage = open_storage(config)?;
    let overlay = BlockOverlay::new(&storage);
    let state = init_genesis(&overlay, &genesis)?;
    overlay.commit()?;
    storage.flush()?;

    info!(
        db = %config.db_path.display(),
        start_time = %state.last_release_timestamp,
        "Genesis written"
    );
    print_json(&genesis)
}

async fn cmd_run(config: &AppConfig, matches: &ArgMatches) -> Result<()> {
    let storage = open_storage(config)?;
    let status = emission_status(&storage)
        .context("database has no mint state; run `mint-node init` first")?;
    let metrics = init_metrics(config);

    let clock = if matches.get_flag("wall-clock") {
        BlockClock::Wall
    } else {
        BlockClock::simulated(
            status.state.last_release_timestamp,
            status.latest_height,
            config.block_interval,
        )
    };
    let mut sinks = SinkSet::new().with(TracingEventSink);
    if metrics.is_some() {
        sinks.push(MetricsEventSink);
    }
    let limit = matches.get_one::<u64>("blocks").copied();

    info!(
        version = MINT_VERSION,
        commit = git_commit_hash(),
        latest_height = status.latest_height,
        pool_remaining = status.reward_pool_remaining,
        release_rate = %status.params.release_rate,
        simulated_clock = clock.is_simulated(),
        "Starting block production"
    );

    let mut producer = BlockProducer::new(&storage, EmissionEngine::new(sinks), clock)?;
    let result = produce_blocks(&mut producer, config, limit).await;

    storage.flush()?;
    if let Some(handle) = metrics {
        write_metrics(&handle, &config.metrics_path());
    }
    result?;

    info!(
        latest_height = producer.next_height() - 1,
        "Block production stopped"
    );
    Ok(())
}

async fn produce_blocks(
    producer: &mut BlockProducer<'_, SledStorage, SinkSet>,
    config: &AppConfig,
    limit: Option<u64>,
) -> Result<()> {
    // A bounded simulated run needs no pacing.
    let paced = limit.is_none() || !producer.clock().is_simulated();
    let mut ticker = tokio::time::interval(config.block_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut produced = 0u64;
    while limit.map_or(true, |limit| produced < limit) {
        if paced {
            tokio::select! {
                _ = ticker.tick() => {}
                signal = &mut shutdown => {
                    signal?;
                    info!("Received Ctrl-C; stopping");
                    break;
                }
            }
        }
        producer.produce_block()?;
        produced += 1;
    }
    Ok(())
}

fn write_metrics(handle: &PrometheusHandle, path: &Path) {
    match fs::write(path, handle.render()) {
        Ok(()) => info!(path = %path.display(), "Wrote metrics snapshot"),
        Err(err) => warn!(path = %path.display(), "Failed to write metrics snapshot: {}", err),
    }
}

fn cmd_status(config: &AppConfig) -> Result<()> {
    let storage = open_storage(config)?;
    print_json(&emission_status(&storage)?)
}

fn cmd_export_genesis(config: &AppConfig) -> Result<()> {
    let storage = open_storage(config)?;
    print_json(&export_genesis(&storage)?)
}

fn cmd_set_param(config: &AppConfig, matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("missing parameter name"))?;
    let value = matches
        .get_one::<String>("value")
        .ok_or_else(|| anyhow!("missing parameter value"))?;

    let storage = open_storage(config)?;
    let overlay = BlockOverlay::new(&storage);
    let change = ParameterManager::new().apply_param_change(&overlay, name, value)?;
    overlay.commit()?;
    storage.flush()?;

    info!(
        name = %change.name,
        previous = %change.previous,
        value = %change.value,
        "Applied parameter change"
    );
    print_json(&change)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_logging(&config)?;

    if let Some(path) = &config.config_path {
        info!(path = %path.display(), "Loaded configuration file");
    }

    match matches.subcommand() {
        Some(("init", sub)) => cmd_init(&config, sub),
        Some(("run", sub)) => cmd_run(&config, sub).await,
        Some(("status", _)) => cmd_status(&config),
        Some(("export-genesis", _)) => cmd_export_genesis(&config),
        Some(("set-param", sub)) => cmd_set_param(&config, sub),
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
        None => Err(anyhow!("no command given")),
    }
}
