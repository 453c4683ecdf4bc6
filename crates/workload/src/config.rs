//! Configuration types for a workload run.

use crate::accounts::compute_range;
use crate::workload::GenerateError;
use rand::Rng;
use serde::Deserialize;
use smallbank_types::{ClientId, TransactionType, UnknownTransactionType};
use std::fmt;
use std::str::FromStr;

/// Configuration for a workload run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Number of accounts owned by each client instance.
    pub total_accounts: u64,

    /// Index of this client instance.
    pub client_id: ClientId,

    /// Give each client instance a disjoint account range.
    pub partition_clients: bool,

    /// Number of transactions to generate and submit.
    pub num_transactions: usize,

    /// Starting checking balance of every created account.
    pub initial_checking_balance: i64,

    /// Starting savings balance of every created account.
    pub initial_savings_balance: i64,

    /// Random seed. A fresh seed is drawn (and logged) when unset.
    pub seed: Option<u64>,

    /// Transaction type selection policy.
    pub selection: SelectionPolicy,

    /// Log every account balance after creation and after the run.
    pub print_accounts: bool,
}

impl WorkloadConfig {
    /// Create a configuration for the given number of accounts.
    pub fn new(total_accounts: u64) -> Self {
        Self {
            total_accounts,
            client_id: ClientId(0),
            partition_clients: false,
            num_transactions: 100,
            initial_checking_balance: 1000,
            initial_savings_balance: 1000,
            seed: None,
            selection: SelectionPolicy::default(),
            print_accounts: false,
        }
    }

    /// Set the client instance index.
    pub fn with_client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    /// Enable or disable client partitioning.
    pub fn with_partition_clients(mut self, partition: bool) -> Self {
        self.partition_clients = partition;
        self
    }

    /// Set the number of transactions.
    pub fn with_num_transactions(mut self, count: usize) -> Self {
        self.num_transactions = count;
        self
    }

    /// Set the starting balances of created accounts.
    pub fn with_initial_balances(mut self, checking: i64, savings: i64) -> Self {
        self.initial_checking_balance = checking;
        self.initial_savings_balance = savings;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the transaction type selection policy.
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Log every account balance around the run.
    pub fn with_print_accounts(mut self, print: bool) -> Self {
        self.print_accounts = print;
        self
    }

    /// Check the configuration before any traffic is generated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_accounts == 0 {
            return Err(ConfigError::NoAccounts);
        }
        if self.selection == SelectionPolicy::Sequence(Vec::new()) {
            return Err(ConfigError::InvalidSelection(
                "sequence must name at least one type".to_string(),
            ));
        }
        if self.total_accounts < 2 && self.selection.may_select(TransactionType::Amalgamate) {
            return Err(ConfigError::AmalgamateNeedsTwoAccounts);
        }
        compute_range(self.total_accounts, self.client_id, self.partition_clients)?;
        Ok(())
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self::new(10)
    }
}

/// How the type of each generated transaction is chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SelectionPolicy {
    /// Uniformly random over all transaction types.
    #[default]
    Uniform,

    /// Always the same type.
    Fixed(TransactionType),

    /// Cycle through the listed types by sequence index.
    Sequence(Vec<TransactionType>),
}

impl SelectionPolicy {
    /// Whether this policy can ever pick `tx_type`.
    pub fn may_select(&self, tx_type: TransactionType) -> bool {
        match self {
            SelectionPolicy::Uniform => true,
            SelectionPolicy::Fixed(fixed) => *fixed == tx_type,
            SelectionPolicy::Sequence(types) => types.contains(&tx_type),
        }
    }

    /// Choose the type of the transaction at `sequence_index`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        sequence_index: usize,
        rng: &mut R,
    ) -> Result<TransactionType, GenerateError> {
        match self {
            SelectionPolicy::Uniform => {
                let index = rng.gen_range(0..TransactionType::COUNT);
                Ok(TransactionType::from_index(index)?)
            }
            SelectionPolicy::Fixed(tx_type) => Ok(*tx_type),
            SelectionPolicy::Sequence(types) => {
                if types.is_empty() {
                    return Err(GenerateError::EmptySequence);
                }
                Ok(types[sequence_index % types.len()])
            }
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = ConfigError;

    /// Accepts `uniform` (or `random`), `fixed:<type>`, `sequence:<type>,<type>,...`
    /// or a bare type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |e: UnknownTransactionType| ConfigError::InvalidSelection(e.to_string());

        if matches!(s.to_lowercase().as_str(), "uniform" | "random") {
            return Ok(SelectionPolicy::Uniform);
        }

        if let Some(name) = s.strip_prefix("fixed:") {
            return name.parse().map(SelectionPolicy::Fixed).map_err(invalid);
        }

        if let Some(list) = s.strip_prefix("sequence:") {
            let types = list
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(str::parse)
                .collect::<Result<Vec<TransactionType>, _>>()
                .map_err(invalid)?;
            if types.is_empty() {
                return Err(ConfigError::InvalidSelection(
                    "sequence must name at least one type".to_string(),
                ));
            }
            return Ok(SelectionPolicy::Sequence(types));
        }

        s.parse()
            .map(SelectionPolicy::Fixed)
            .map_err(|_| ConfigError::InvalidSelection(format!("Unknown selection policy: {}", s)))
    }
}

impl TryFrom<String> for SelectionPolicy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Uniform => f.write_str("uniform"),
            SelectionPolicy::Fixed(tx_type) => write!(f, "fixed:{}", tx_type),
            SelectionPolicy::Sequence(types) => {
                let names: Vec<_> = types.iter().map(|t| t.name()).collect();
                write!(f, "sequence:{}", names.join(","))
            }
        }
    }
}

/// Configuration problems, all detected before any traffic is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("At least one account is required")]
    NoAccounts,

    #[error("Amalgamate needs at least two accounts per client")]
    AmalgamateNeedsTwoAccounts,

    #[error("Invalid selection policy: {0}")]
    InvalidSelection(String),

    #[error("Account range of client {client_id} with {total_accounts} accounts per client overflows the account space")]
    AccountRangeOverflow { client_id: u64, total_accounts: u64 },

    #[error(
        "Verification file is only applicable for {expected} accounts, but currently have {configured}"
    )]
    FixtureAccountMismatch { expected: u64, configured: u64 },
}
