//! Account space partitioning.
//!
//! Each client instance owns a contiguous range of account identifiers. With
//! partitioning disabled every instance shares `[0, total_accounts)` and races
//! on the same accounts; with it enabled instance `i` owns
//! `[i * total_accounts, (i + 1) * total_accounts)` and never collides with
//! another instance.

use crate::config::{ConfigError, WorkloadConfig};
use smallbank_types::{AccountRange, ClientId};
use tracing::info;

/// Compute the account range owned by a client instance.
///
/// Fails if a partitioned range would not fit in the identifier space.
pub fn compute_range(
    total_accounts: u64,
    client_id: ClientId,
    partition_clients: bool,
) -> Result<AccountRange, ConfigError> {
    if !partition_clients {
        return Ok(AccountRange::new(0, total_accounts));
    }

    let overflow = || ConfigError::AccountRangeOverflow {
        client_id: client_id.0,
        total_accounts,
    };
    let from = client_id.0.checked_mul(total_accounts).ok_or_else(overflow)?;
    let to = from.checked_add(total_accounts).ok_or_else(overflow)?;
    Ok(AccountRange::new(from, to))
}

/// The account range of this client instance, fixed for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountSpace {
    /// Accounts per client instance.
    total_accounts: u64,

    /// This instance's index.
    client_id: ClientId,

    /// Whether instances own disjoint ranges.
    partition_clients: bool,

    /// The computed range.
    range: AccountRange,
}

impl AccountSpace {
    /// Compute the account space once for this instance.
    pub fn new(
        total_accounts: u64,
        client_id: ClientId,
        partition_clients: bool,
    ) -> Result<Self, ConfigError> {
        let range = compute_range(total_accounts, client_id, partition_clients)?;

        info!(
            total_accounts,
            client = %client_id,
            partition_clients,
            %range,
            "Computed account range"
        );

        Ok(Self {
            total_accounts,
            client_id,
            partition_clients,
            range,
        })
    }

    /// Build from a workload configuration.
    pub fn from_config(config: &WorkloadConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.total_accounts,
            config.client_id,
            config.partition_clients,
        )
    }

    /// The owned account range.
    pub fn range(&self) -> AccountRange {
        self.range
    }

    /// Accounts per client instance.
    pub fn total_accounts(&self) -> u64 {
        self.total_accounts
    }

    /// This instance's index.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Whether instances own disjoint ranges.
    pub fn is_partitioned(&self) -> bool {
        self.partition_clients
    }
}
