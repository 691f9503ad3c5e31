pub mod config;
pub mod output;
pub mod simulator;
pub mod topology;

pub use config::{ConfigError, SimConfig};
pub use output::{write_all, OutputError};
pub use simulator::Simulator;
pub use topology::SimError;
