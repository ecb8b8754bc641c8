//! # tvm-evm
//!
//! Contract interpreter with transaction-scoped transient storage.
//!
//! This crate provides:
//! - The TLOAD/TSTORE instructions and the journaled [`TransientStorage`]
//! - A dispatch loop over a small instruction subset
//! - The [`Host`] seam through which frames reach storage and nested calls
//! - [`execute_call`], which runs a call tree without native recursion
//! - Gas metering

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call;
pub mod config;
pub mod error;
pub mod frame;
pub mod gas;
pub mod host;
pub mod instructions;
pub mod interpreter;
pub mod journal;
pub mod memory;
pub mod opcode;
pub mod stack;
pub mod transient;

pub use call::execute_call;
pub use config::EvmConfig;
pub use error::{EvmError, EvmResult, ExecutionResult};
pub use frame::{CallContext, Frame};
pub use gas::GasMeter;
pub use host::{CallInputs, CallKind, CallOutcome, EnteredCall, Host};
pub use interpreter::{Interpreter, InterpreterAction};
pub use journal::{Checkpoint, JournaledMap};
pub use opcode::Opcode;
pub use transient::TransientStorage;
