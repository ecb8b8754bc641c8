//! Transaction executor implementation

use crate::config::ExecutorConfig;
use crate::error::{ExecutionError, ExecutionResult};
use crate::state::{StateCheckpoint, WorldState};
use tracing::debug;
use tvm_evm::{
    execute_call, CallInputs, CallKind, CallOutcome, Checkpoint, EnteredCall, Host,
    TransientStorage,
};
use tvm_primitives::{Address, Depth, H256};

/// A message-call transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Value transferred
    pub value: u128,
    /// Call data
    pub data: Vec<u8>,
    /// Gas limit, intrinsic cost included
    pub gas_limit: u64,
}

/// Outcome of an executed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Whether the top-level call succeeded
    pub success: bool,
    /// Gas used, intrinsic cost included
    pub gas_used: u64,
    /// Return or revert data of the top-level call
    pub output: Vec<u8>,
}

/// Rollback point across persistent and transient state, held for one open
/// call
#[derive(Debug, Clone, Copy)]
pub struct CallCheckpoint {
    state: StateCheckpoint,
    transient: Checkpoint,
    address: Address,
    depth: Depth,
}

/// Transaction executor.
///
/// Owns the persistent world state, which survives across transactions, and
/// one transient store, which is emptied after every transaction whatever
/// its outcome. Each executor value runs one transaction at a time.
pub struct TransactionExecutor {
    /// Persistent state
    state: WorldState,
    /// Transient state of the running transaction
    transient: TransientStorage,
    /// Configuration
    config: ExecutorConfig,
}

impl TransactionExecutor {
    /// Create executor over empty state
    pub fn new(config: ExecutorConfig) -> Self {
        Self::with_state(WorldState::new(), config)
    }

    /// Create with pre-existing state
    pub fn with_state(state: WorldState, config: ExecutorConfig) -> Self {
        Self {
            state,
            transient: TransientStorage::new(),
            config,
        }
    }

    /// Execute a single transaction
    pub fn execute(&mut self, tx: &Transaction) -> ExecutionResult<Receipt> {
        if tx.gas_limit < self.config.tx_base_gas {
            return Err(ExecutionError::IntrinsicGas {
                required: self.config.tx_base_gas,
                provided: tx.gas_limit,
            });
        }
        if tx.gas_limit > self.config.block_gas_limit {
            return Err(ExecutionError::GasLimitExceeded {
                limit: self.config.block_gas_limit,
                provided: tx.gas_limit,
            });
        }
        let available = self.state.balance(&tx.from);
        if available < tx.value {
            return Err(ExecutionError::InsufficientBalance {
                required: tx.value,
                available,
            });
        }

        debug_assert!(
            self.transient.is_empty() && self.transient.journal_len() == 0,
            "transient storage leaked from a previous transaction"
        );

        let execution_gas = tx.gas_limit - self.config.tx_base_gas;
        let config = self.config.evm.clone();
        let inputs = CallInputs {
            kind: CallKind::Call,
            caller: tx.from,
            address: tx.to,
            code_address: tx.to,
            value: tx.value,
            transfers_value: true,
            input: tx.data.clone(),
            gas_limit: execution_gas,
            is_static: false,
            depth: 0,
        };
        let outcome = execute_call(self, inputs, &config);

        self.transient.clear();

        let receipt = Receipt {
            success: outcome.success,
            gas_used: tx.gas_limit - outcome.gas_left,
            output: outcome.output,
        };
        debug!(
            from = %tx.from,
            to = %tx.to,
            success = receipt.success,
            gas_used = receipt.gas_used,
            "transaction executed"
        );
        Ok(receipt)
    }

    /// Execute transactions in order, stopping at the first invalid one
    pub fn execute_batch(&mut self, txs: &[Transaction]) -> ExecutionResult<Vec<Receipt>> {
        txs.iter().map(|tx| self.execute(tx)).collect()
    }

    /// Get persistent state
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Get mutable persistent state
    pub fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    /// Take ownership of the persistent state
    pub fn into_state(self) -> WorldState {
        self.state
    }

    /// Transient store of the running transaction
    pub fn transient(&self) -> &TransientStorage {
        &self.transient
    }

    /// Get configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    fn snapshot(&mut self, inputs: &CallInputs) -> CallCheckpoint {
        CallCheckpoint {
            state: self.state.snapshot(),
            transient: self.transient.snapshot(),
            address: inputs.address,
            depth: inputs.depth,
        }
    }

    fn revert(&mut self, checkpoint: CallCheckpoint) {
        self.transient.revert(checkpoint.transient);
        self.state.revert(checkpoint.state);
    }

    fn commit(&mut self, checkpoint: CallCheckpoint) {
        self.transient.commit(checkpoint.transient);
        self.state.commit(checkpoint.state);
    }
}

impl Host for TransactionExecutor {
    type Checkpoint = CallCheckpoint;
    fn sload(&mut self, address: Address, slot: H256) -> H256 {
        self.state.get_storage(&address, &slot)
    }

    fn sstore(&mut self, address: Address, slot: H256, value: H256) {
        self.state.set_storage(address, slot, value);
    }

    fn tload(&mut self, address: Address, slot: H256) -> H256 {
        self.transient.get(address, slot)
    }

    fn tstore(&mut self, address: Address, slot: H256, value: H256) {
        self.transient.set(address, slot, value);
    }

    fn enter_call(&mut self, inputs: &CallInputs) -> Result<EnteredCall<CallCheckpoint>, CallOutcome> {
        let checkpoint = self.snapshot(inputs);

        if inputs.transfers_value
            && !self
                .state
                .transfer(inputs.caller, inputs.address, inputs.value)
        {
            debug!(
                caller = %inputs.caller,
                value = inputs.value,
                "call rejected: insufficient balance"
            );
            self.revert(checkpoint);
            return Err(CallOutcome::not_entered(inputs.gas_limit));
        }

        debug!(
            kind = ?inputs.kind,
            address = %inputs.address,
            depth = inputs.depth,
            gas = inputs.gas_limit,
            is_static = inputs.is_static,
            "call entered"
        );

        Ok(EnteredCall {
            code: self.state.code(&inputs.code_address).to_vec(),
            checkpoint,
        })
    }

    fn exit_call(&mut self, checkpoint: CallCheckpoint, result: &tvm_evm::ExecutionResult) {
        if result.success {
            self.commit(checkpoint);
        } else {
            self.revert(checkpoint);
        }

        debug!(
            address = %checkpoint.address,
            depth = checkpoint.depth,
            success = result.success,
            gas_used = result.gas_used,
            error = ?result.error,
            "call exited"
        );
    }
}
