//! # Redact-Chain Simulator
//!
//! Runs one simulation and prints the run report as JSON on stdout.
//!
//! ```text
//! node-runtime [config.json]
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`RUST_LOG`, default `info`)
//! 2. Load configuration (file, then `RC_SEED` / `RC_END_TIME` overrides)
//! 3. Build genesis and wire subsystems
//! 4. Run the scheduler to the end time
//! 5. Print the report; fail if any chain lost integrity

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::{load_config, Simulation};

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Redact-Chain Simulator v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    // Load configuration
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(path.as_deref())?;
    info!(
        seed = config.seed,
        nodes = config.nodes.len(),
        end_time = config.end_time,
        "Configuration loaded"
    );

    let mut simulation = Simulation::new(config).context("Failed to build simulation")?;
    let report = simulation.run().context("Simulation halted")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.integrity_ok() {
        bail!("Chain integrity check failed on at least one node");
    }
    Ok(())
}
