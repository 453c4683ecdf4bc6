//! Core types for the SmallBank workload driver.
//!
//! This crate holds the data model shared by the workload engine, the HTTP
//! client and the test helpers: account identifiers and ranges, transaction
//! types and their payload schemas, raw responses, and verification
//! expectations.

mod identifiers;
pub mod payload;
mod response;
mod state;
mod transaction;

pub use identifiers::{AccountId, AccountRange, ClientId};
pub use payload::{
    AccountPayload, AmalgamatePayload, BalanceResponse, CreateAccountsPayload, PayloadError,
    TransactionPayload,
};
pub use response::Response;
pub use state::{Checkpoint, ExpectedBalance};
pub use transaction::{
    Transaction, TransactionRequest, TransactionType, UnknownTransactionType, BALANCE_METHOD,
    CREATE_BATCH_METHOD,
};
