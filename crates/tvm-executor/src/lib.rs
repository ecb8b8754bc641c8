//! # tvm-executor
//!
//! Runs message-call transactions against an in-memory world state.
//!
//! The executor is the [`tvm_evm::Host`] for every frame of a transaction,
//! driven by [`tvm_evm::execute_call`]. It checkpoints persistent and transient state on entry to each call,
//! rolls both back when the call fails, and empties transient storage once
//! the transaction is over.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod executor;
pub mod state;

pub use config::ExecutorConfig;
pub use error::{ExecutionError, ExecutionResult};
pub use executor::{CallCheckpoint, Receipt, Transaction, TransactionExecutor};
pub use state::{StateCheckpoint, WorldState};
