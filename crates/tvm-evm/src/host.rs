//! Host interface: state the interpreter reads and writes through its caller

use crate::error::ExecutionResult;
use tvm_primitives::{Address, Depth, Gas, H256};

/// Kind of message call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Regular call, runs the target's code against the target's state
    Call,
    /// Runs the target's code against the caller's state, context kept
    DelegateCall,
    /// Regular call with state mutation forbidden for the whole subtree
    StaticCall,
}

/// Everything the host needs to run a nested call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInputs {
    /// Kind of call
    pub kind: CallKind,
    /// Caller seen by the callee
    pub caller: Address,
    /// Account whose storage the callee operates on
    pub address: Address,
    /// Account whose code runs
    pub code_address: Address,
    /// Value seen by the callee
    pub value: u128,
    /// Whether value is actually moved from `caller` to `address`
    pub transfers_value: bool,
    /// Call data
    pub input: Vec<u8>,
    /// Gas forwarded to the callee
    pub gas_limit: Gas,
    /// Whether the callee runs static
    pub is_static: bool,
    /// Depth of the callee frame
    pub depth: Depth,
}

/// Result of a nested call as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    /// Whether the callee completed without failure
    pub success: bool,
    /// Gas the callee did not use
    pub gas_left: Gas,
    /// Return or revert data
    pub output: Vec<u8>,
}

impl CallOutcome {
    /// A call that failed before entering the callee. The forwarded gas is
    /// handed back untouched.
    pub fn not_entered(gas_limit: Gas) -> Self {
        Self {
            success: false,
            gas_left: gas_limit,
            output: Vec::new(),
        }
    }
}

impl From<ExecutionResult> for CallOutcome {
    fn from(result: ExecutionResult) -> Self {
        Self {
            success: result.success,
            gas_left: result.gas_left,
            output: result.output,
        }
    }
}

/// A call the host agreed to run
#[derive(Debug)]
pub struct EnteredCall<C> {
    /// Code of `code_address`
    pub code: Vec<u8>,
    /// Handed back to [`Host::exit_call`] when the callee finishes
    pub checkpoint: C,
}

/// State access the interpreter delegates to its embedder.
///
/// The host owns persistent and transient storage for the running
/// transaction. Every storage key is partitioned by the executing frame's
/// own address.
///
/// Nested calls are bracketed by [`Host::enter_call`] and
/// [`Host::exit_call`], strictly innermost-first.
pub trait Host {
    /// Rollback handle for one open call
    type Checkpoint;

    /// Read a persistent storage slot
    fn sload(&mut self, address: Address, slot: H256) -> H256;

    /// Write a persistent storage slot
    fn sstore(&mut self, address: Address, slot: H256, value: H256);

    /// Read a transient storage slot; absent slots read zero
    fn tload(&mut self, address: Address, slot: H256) -> H256;

    /// Write a transient storage slot
    fn tstore(&mut self, address: Address, slot: H256, value: H256);

    /// Open a call: checkpoint state and move value. Returns the callee's
    /// code, or the outcome of a call that fails without being entered.
    fn enter_call(&mut self, inputs: &CallInputs)
        -> Result<EnteredCall<Self::Checkpoint>, CallOutcome>;

    /// Close the innermost open call, keeping its changes if `result` is a
    /// success and undoing them otherwise
    fn exit_call(&mut self, checkpoint: Self::Checkpoint, result: &ExecutionResult);
}
