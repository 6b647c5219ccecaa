pub mod toml_config;

use clap::Parser;
use serde::{Deserialize, Serialize};

pub use toml_config::{AuthConfig, ProbeConfig, RateLimitConfig, RelayConfig, ServerConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "campus-status")]
#[command(about = "Reports reachability and latency of campus web services")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listening port, overrides PORT and the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// File (or defaults), then environment, then command-line flags.
    pub fn load(&self) -> crate::Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::from_file(path)?,
            None => RelayConfig::default(),
        };
        config.apply_env_overrides()?;

        if let Some(port) = self.port {
            config.server.port = port;
        }
        Ok(config)
    }
}
