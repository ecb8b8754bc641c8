//! EVM error types

use thiserror::Error;

/// Frame-terminating execution errors.
///
/// Every variant aborts the current message call. The enclosing call's
/// failure handling (the host) reverts the journaled stores back to the
/// snapshot taken when the call was entered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max {0})")]
    StackOverflow(usize),

    /// State-mutating instruction executed under a static call
    #[error("write in static context")]
    WriteInStaticContext,

    /// Invalid jump destination
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Invalid or unsupported opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// Memory offset or size does not fit the address space
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// Call depth exceeded
    #[error("call depth exceeded (max {0})")]
    CallDepthExceeded(usize),

    /// Explicit REVERT with return data
    #[error("execution reverted")]
    Revert(Vec<u8>),
}

impl EvmError {
    /// Whether the frame keeps its unused gas when halting with this error
    pub fn preserves_gas(&self) -> bool {
        matches!(self, EvmError::Revert(_))
    }
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;

/// Outcome of running one frame to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Gas used by the frame
    pub gas_used: u64,
    /// Gas left for the caller
    pub gas_left: u64,
    /// Return data (or revert data)
    pub output: Vec<u8>,
    /// Halting error, `None` on success
    pub error: Option<EvmError>,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(gas_used: u64, gas_left: u64, output: Vec<u8>) -> Self {
        Self {
            success: true,
            gas_used,
            gas_left,
            output,
            error: None,
        }
    }

    /// Create an exceptional-halt result; all gas is consumed
    pub fn failure(gas_limit: u64, error: EvmError) -> Self {
        Self {
            success: false,
            gas_used: gas_limit,
            gas_left: 0,
            output: Vec::new(),
            error: Some(error),
        }
    }

    /// Create a revert result; unused gas is handed back
    pub fn revert(gas_used: u64, gas_left: u64, output: Vec<u8>) -> Self {
        Self {
            success: false,
            gas_used,
            gas_left,
            error: Some(EvmError::Revert(output.clone())),
            output,
        }
    }
}
