use clap::Parser;
use logging::log;
use network::{SimConfig, Simulator};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Discrete-event simulator of a peer-to-peer proof-of-work network.
#[derive(Debug, Parser)]
struct Cli {
    /// Path to the simulation's TOML configuration file.
    config_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = SimConfig::load(&cli.config_path)?;
    logging::init(config.simulation.debug);

    let seed = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0);
    log::info!("starting simulation with seed {seed}");

    let mut sim = Simulator::new(&config, seed)?;
    sim.run();

    network::write_all(&config.simulation.output_dir, sim.nodes())?;
    log::info!("wrote results to {}", config.simulation.output_dir);
    Ok(())
}
