pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use adapters::HttpProber;
pub use config::{CliConfig, RelayConfig};
pub use crate::core::{checker::StatusChecker, registry::ServiceRegistry};
pub use domain::model::{ProbeOutcome, ProbeStatus, StatusResult};
pub use utils::error::{RelayError, Result};
