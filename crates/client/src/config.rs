//! Client configuration file.
//!
//! ```toml
//! endpoint = "http://127.0.0.1:8000"
//! timeout = "10s"
//! verify = "expected.json"
//!
//! [workload]
//! total_accounts = 100
//! partition_clients = true
//! num_transactions = 10000
//! selection = "sequence:deposit-checking,balance"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use serde::{Deserialize, Deserializer};
use smallbank_workload::WorkloadConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Full client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the service.
    pub endpoint: String,

    /// Per-request timeout, in humantime format (e.g. "500ms", "10s").
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    /// Verification fixture to check the Initial and Final checkpoints against.
    pub verify: Option<PathBuf>,

    /// Workload parameters.
    pub workload: WorkloadConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            verify: None,
            workload: WorkloadConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}
