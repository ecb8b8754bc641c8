//! Transaction execution error types

use thiserror::Error;

/// Transaction validation errors.
///
/// A transaction that fails validation is rejected before any state is
/// touched. Failures inside the call tree are not errors: they produce an
/// unsuccessful receipt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Gas limit below the intrinsic transaction cost
    #[error("intrinsic gas too low: required {required}, provided {provided}")]
    IntrinsicGas {
        /// Intrinsic cost
        required: u64,
        /// Transaction gas limit
        provided: u64,
    },

    /// Gas limit above the block gas limit
    #[error("gas limit exceeded: limit {limit}, provided {provided}")]
    GasLimitExceeded {
        /// Block gas limit
        limit: u64,
        /// Transaction gas limit
        provided: u64,
    },

    /// Sender cannot cover the transferred value
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Value to transfer
        required: u128,
        /// Sender balance
        available: u128,
    },
}

/// Result type for execution operations
pub type ExecutionResult<T> = Result<T, ExecutionError>;
