//! SmallBank Client
//!
//! Drives a SmallBank workload against a running service over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Print the batch-creation payload for a client's accounts
//! smallbank-client provision --accounts 100 --client-id 2 --pc
//!
//! # Run 10k transactions against a local node
//! smallbank-client run --endpoint http://127.0.0.1:8000 \
//!     --accounts 100 --transactions 10000 --selection uniform
//! ```

pub mod client;
pub mod config;

pub use client::HttpTransport;
pub use config::{ClientConfig, ConfigFileError};
