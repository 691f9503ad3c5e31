use serde::Deserialize;

/// Configuration, read once at startup (spec §6). One sub-struct per flat
/// group so field names match the spec's keys exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub node: NodeConfig,
    pub transaction: TransactionConfig,
    pub network: NetworkConfig,
    pub mining: MiningConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub total_nodes: usize,
    pub execution_time: u64,
    pub percent_slow_nodes: f64,
    pub percent_low_cpu_nodes: f64,
    pub output_dir: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
}

fn default_initial_balance() -> f64 {
    1000.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub min_neighbors: usize,
    pub max_neighbors: usize,
    pub adversary_one_mining_power: f64,
    pub adversary_two_mining_power: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionConfig {
    pub size: usize,
    pub mean_interarrival_time_sec: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub min_light_prop_delay: f64,
    pub max_light_prop_delay: f64,
    pub slow_node_link_speed: f64,
    pub fast_node_link_speed: f64,
    pub queuing_delay_constant: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiningConfig {
    pub mean_mining_time_sec: u64,
    pub mining_reward: f64,
    pub max_txn_in_block: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("could not parse configuration file {path} as TOML: {reason}")]
    Parse { path: String, reason: String },
    #[error("simulation.total_nodes must be at least 3, got {0}")]
    TooFewNodes(usize),
}

impl SimConfig {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: SimConfig = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if config.simulation.total_nodes < 3 {
            return Err(ConfigError::TooFewNodes(config.simulation.total_nodes));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [simulation]
        total_nodes = 10
        execution_time = 200
        percent_slow_nodes = 30.0
        percent_low_cpu_nodes = 40.0
        output_dir = "out"
        debug = false
        initial_balance = 1000.0

        [node]
        min_neighbors = 3
        max_neighbors = 6
        adversary_one_mining_power = 10.0
        adversary_two_mining_power = 10.0

        [transaction]
        size = 500
        mean_interarrival_time_sec = 5

        [network]
        min_light_prop_delay = 0.01
        max_light_prop_delay = 0.5
        slow_node_link_speed = 100.0
        fast_node_link_speed = 1000.0
        queuing_delay_constant = 96.0

        [mining]
        mean_mining_time_sec = 10
        mining_reward = 50
        max_txn_in_block = 5
    "#;

    #[test]
    fn parses_a_complete_config() {
        let config: SimConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.simulation.total_nodes, 10);
        assert_eq!(config.node.min_neighbors, 3);
        assert_eq!(config.mining.mining_reward, 50.0);
        assert_eq!(config.simulation.initial_balance, 1000.0);
    }

    #[test]
    fn rejects_too_few_nodes() {
        let bad = SAMPLE.replacen("total_nodes = 10", "total_nodes = 2", 1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, bad).unwrap();
        let err = SimConfig::load(&path).unwrap_err();
        assert_eq!(err, ConfigError::TooFewNodes(2));
    }

    #[test]
    fn missing_file_is_a_fatal_io_error() {
        let err = SimConfig::load(std::path::Path::new("/nonexistent/sim.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
