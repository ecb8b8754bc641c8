//! Executor configuration

use serde::{Deserialize, Serialize};
use tvm_evm::gas::cost;
use tvm_evm::EvmConfig;

/// Transaction executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Interpreter configuration
    #[serde(default)]
    pub evm: EvmConfig,
    /// Intrinsic gas charged to every transaction
    #[serde(default = "default_tx_base_gas")]
    pub tx_base_gas: u64,
    /// Largest gas limit a single transaction may carry
    #[serde(default = "default_block_gas_limit")]
    pub block_gas_limit: u64,
}

fn default_tx_base_gas() -> u64 {
    cost::TX
}

fn default_block_gas_limit() -> u64 {
    30_000_000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            evm: EvmConfig::default(),
            tx_base_gas: default_tx_base_gas(),
            block_gas_limit: default_block_gas_limit(),
        }
    }
}
