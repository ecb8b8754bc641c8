//! Interpreter configuration

use crate::gas::cost;
use serde::{Deserialize, Serialize};

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmConfig {
    /// Whether TLOAD/TSTORE are defined. When disabled both decode as
    /// undefined instructions.
    #[serde(default = "default_transient_storage")]
    pub transient_storage: bool,
    /// Maximum message-call nesting depth
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Operand stack capacity per frame
    #[serde(default = "default_stack_limit")]
    pub stack_limit: usize,
}

fn default_transient_storage() -> bool {
    true
}

fn default_max_call_depth() -> usize {
    cost::MAX_CALL_DEPTH
}

fn default_stack_limit() -> usize {
    cost::MAX_STACK_SIZE
}

impl Default for EvmConfig {
    fn default() -> Self {
        Self {
            transient_storage: default_transient_storage(),
            max_call_depth: default_max_call_depth(),
            stack_limit: default_stack_limit(),
        }
    }
}

impl EvmConfig {
    /// Configuration for a fork without transient storage
    pub fn without_transient_storage() -> Self {
        Self {
            transient_storage: false,
            ..Self::default()
        }
    }
}
