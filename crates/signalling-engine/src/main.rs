//! Experiment runner binary for the signalling game simulation.
//!
//! Loads the configuration, runs either a single experiment or the
//! configured decision-rule comparison, and writes the report as JSON on
//! stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Resolve the config path: first argument, then `SIGNALLING_CONFIG`,
//!    then `signalling-config.yaml`
//! 2. Load and validate configuration (defaults when the file is missing)
//! 3. Initialize structured logging at the configured level unless
//!    `RUST_LOG` overrides it
//! 4. Run the experiment or comparison
//! 5. Print the report

mod error;

use std::path::{Path, PathBuf};

use signalling_core::config::SimulationConfig;
use signalling_core::experiment::{compare_decision_rules, run_experiment};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const DEFAULT_CONFIG: &str = "signalling-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is unusable, a run fails, or the
/// report cannot be serialised.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    let (config, loaded) = load_config(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("signalling-engine starting");
    if loaded {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        signallers = config.population.signallers,
        responders = config.population.responders,
        rounds = config.population.rounds,
        matching = config.matching.name(),
        "Configuration resolved"
    );

    let json = run(&config)?;
    println!("{json}");

    info!("signalling-engine finished");
    Ok(())
}

/// Run whatever the configuration asks for and render the report.
fn run(config: &SimulationConfig) -> Result<String, EngineError> {
    if config.comparison.is_empty() {
        let report = run_experiment(config)?;
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        let reports = compare_decision_rules(config, &config.comparison)?;
        info!(arms = reports.len(), "Comparison complete");
        Ok(serde_json::to_string_pretty(&reports)?)
    }
}

fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("SIGNALLING_CONFIG"))
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from)
}

/// Load and validate configuration from `path`, falling back to defaults
/// when the file does not exist. The flag reports whether a file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    let (config, loaded) = if path.exists() {
        (SimulationConfig::from_file(path)?, true)
    } else {
        (SimulationConfig::default(), false)
    };
    config.validate()?;
    Ok((config, loaded))
}
