//! Core abstractions for the SmallBank workload driver.
//!
//! The workload engine is synchronous business logic; everything that blocks
//! on the network sits behind [`Transport`].

mod traits;

pub use traits::{Transport, TransportError};
