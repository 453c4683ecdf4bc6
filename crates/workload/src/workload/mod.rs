//! Workload generation.
//!
//! Transactions are generated as one batch before any of them is submitted.

mod generator;

pub use generator::{
    GenerateError, TransactionGenerator, DEPOSIT_AMOUNT, SAVINGS_DELTA, WRITE_CHECK_AMOUNT,
};
