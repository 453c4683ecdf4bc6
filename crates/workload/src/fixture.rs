//! Verification fixtures.
//!
//! A fixture is a JSON document with optional expected snapshots for the
//! `Initial` and `Final` checkpoints, and an optional `accounts` count that
//! must agree with the configured number of accounts:
//!
//! ```json
//! {
//!   "accounts": 10,
//!   "Initial": [{ "account": 0, "balance": 2000 }],
//!   "Final": [{ "account": 0, "balance": 1950 }]
//! }
//! ```

use crate::config::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use smallbank_types::Checkpoint;
use std::path::{Path, PathBuf};

/// Expected state for the verification checkpoints of a run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerificationFixture {
    /// Number of accounts the fixture was written for.
    #[serde(default)]
    pub accounts: Option<u64>,

    /// Expected state right after account creation.
    #[serde(default, rename = "Initial", alias = "initial")]
    pub initial: Option<Value>,

    /// Expected state after the transaction body.
    #[serde(default, rename = "Final", alias = "final")]
    pub final_state: Option<Value>,
}

impl VerificationFixture {
    /// Parse a fixture from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, FixtureError> {
        serde_json::from_str(json).map_err(|e| FixtureError::Parse {
            path: None,
            source: e,
        })
    }

    /// Load a fixture from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FixtureError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| FixtureError::Parse {
            path: Some(path.to_path_buf()),
            source: e,
        })
    }

    /// The raw expected state for a checkpoint.
    pub fn expected(&self, checkpoint: Checkpoint) -> Option<&Value> {
        match checkpoint {
            Checkpoint::Initial => self.initial.as_ref(),
            Checkpoint::Final => self.final_state.as_ref(),
        }
    }

    /// Check the fixture was written for the configured number of accounts.
    ///
    /// A disagreement is tolerated in partitioned mode, where each instance
    /// legitimately verifies a subset.
    pub fn check_accounts(&self, total_accounts: u64, partition_clients: bool) -> Result<(), ConfigError> {
        match self.accounts {
            Some(expected) if expected != total_accounts && !partition_clients => {
                Err(ConfigError::FixtureAccountMismatch {
                    expected,
                    configured: total_accounts,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Errors reading a fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read verification file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid verification file: {source}")]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },
}
