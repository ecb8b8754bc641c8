//! # tvm-fixtures
//!
//! JSON fixture runner for the transient VM.
//!
//! A fixture describes accounts, a sequence of transactions with expected
//! receipts, and the persistent storage expected afterwards. Every case
//! runs against a fresh [`tvm_executor::TransactionExecutor`], so the
//! transient store is exercised across real transaction boundaries.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod runner;
mod types;

pub use error::{FixtureError, FixtureResult};
pub use runner::{FileResults, FixtureRunner, TestStats};
pub use types::*;
