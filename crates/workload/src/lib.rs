//! SmallBank Workload Engine
//!
//! The workload model and verification engine of the SmallBank driver. It
//! decides which accounts a client owns, which transactions to send, how to
//! read the service's answers, and whether balances came out as expected.
//!
//! # Architecture
//!
//! - **Account Space**: contiguous account range per client, shared or partitioned
//! - **Provisioning**: one batch-creation request for the owned range
//! - **Workload Generation**: typed transactions with a pluggable type selection policy
//! - **Classification**: accepted, recognised business rejection, or fatal
//! - **Verification**: balance reconciliation against fixture checkpoints
//!
//! All network I/O goes through [`smallbank_core::Transport`].
//!
//! # Example
//!
//! ```ignore
//! use smallbank_workload::{Runner, SelectionPolicy, WorkloadConfig};
//!
//! let config = WorkloadConfig::new(10)
//!     .with_num_transactions(1000)
//!     .with_selection(SelectionPolicy::Uniform)
//!     .with_seed(12345);
//!
//! let report = Runner::new(config, transport)?.run()?;
//! report.print();
//! ```

pub mod accounts;
pub mod classify;
pub mod config;
pub mod fixture;
pub mod metrics;
pub mod provision;
pub mod runner;
pub mod verify;
pub mod workload;

pub use accounts::{compute_range, AccountSpace};
pub use classify::{Classification, RejectionKind, RejectionPolicy, ResponseClassifier};
pub use config::{ConfigError, SelectionPolicy, WorkloadConfig};
pub use fixture::{FixtureError, VerificationFixture};
pub use metrics::{MetricsCollector, RunReport};
pub use provision::{build_creation_request, CreationRequest};
pub use runner::{RunError, Runner};
pub use verify::{StateVerifier, VerifyError};
pub use workload::{GenerateError, TransactionGenerator};
