//! Call context and execution frame

use crate::error::{EvmError, EvmResult};
use crate::gas::{memory_gas, GasMeter};
use crate::memory::Memory;
use crate::stack::{word_is_zero, word_to_usize, Stack, Word};
use tvm_primitives::{Address, Depth, Gas};

/// Call context information
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Account whose storage partitions the frame reads and writes
    pub address: Address,
    /// Caller address
    pub caller: Address,
    /// Call value in wei
    pub value: u128,
    /// Call data
    pub data: Vec<u8>,
    /// Gas limit
    pub gas: Gas,
    /// Whether this is a static call (no state modifications)
    pub is_static: bool,
    /// Call depth
    pub depth: Depth,
}

impl CallContext {
    /// Create a new call context
    pub fn new(address: Address, caller: Address, value: u128, data: Vec<u8>, gas: Gas) -> Self {
        Self {
            address,
            caller,
            value,
            data,
            gas,
            is_static: false,
            depth: 0,
        }
    }

    /// Create a static call context
    pub fn new_static(address: Address, caller: Address, data: Vec<u8>, gas: Gas) -> Self {
        Self {
            address,
            caller,
            value: 0,
            data,
            gas,
            is_static: true,
            depth: 0,
        }
    }

    /// Set the call depth
    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }
}

/// Execution state of one message call.
///
/// Created on call entry and dropped on return. The context fields are
/// fixed for the frame's life; pc, stack, memory and gas belong to the
/// frame alone.
#[derive(Debug)]
pub struct Frame {
    /// Program counter
    pub pc: usize,
    /// Operand stack
    pub stack: Stack,
    /// Memory
    pub memory: Memory,
    /// Gas meter
    pub gas: GasMeter,
    /// Output of the most recent child call
    pub return_data: Vec<u8>,
    context: CallContext,
}

impl Frame {
    /// Create a frame with the default stack capacity
    pub fn new(context: CallContext) -> Self {
        Self::with_stack_limit(context, crate::gas::cost::MAX_STACK_SIZE)
    }

    /// Create a frame with a custom stack capacity
    pub fn with_stack_limit(context: CallContext, stack_limit: usize) -> Self {
        Self {
            pc: 0,
            stack: Stack::with_limit(stack_limit),
            memory: Memory::new(),
            gas: GasMeter::new(context.gas),
            return_data: Vec::new(),
            context,
        }
    }

    /// Executing account
    pub fn address(&self) -> Address {
        self.context.address
    }

    /// Caller of this frame
    pub fn caller(&self) -> Address {
        self.context.caller
    }

    /// Value carried by the call
    pub fn value(&self) -> u128 {
        self.context.value
    }

    /// Call data
    pub fn input(&self) -> &[u8] {
        &self.context.data
    }

    /// Whether state mutation is forbidden in this frame
    pub fn is_static(&self) -> bool {
        self.context.is_static
    }

    /// Call depth (0 for the transaction's top-level call)
    pub fn depth(&self) -> Depth {
        self.context.depth
    }

    /// The frame's call context
    pub fn context(&self) -> &CallContext {
        &self.context
    }

    /// Charge for and perform memory expansion over `[offset, offset + size)`
    pub fn expand_memory(&mut self, offset: usize, size: usize) -> EvmResult<()> {
        if size == 0 {
            return Ok(());
        }
        let new_size = self
            .memory
            .required_size(offset, size)
            .ok_or(EvmError::InvalidMemoryAccess)?;
        self.gas.charge(memory_gas(self.memory.size(), new_size))?;
        self.memory.expand(offset, size);
        Ok(())
    }

    /// Convert an `(offset, size)` operand pair into a memory range.
    ///
    /// A zero size never touches memory, so its offset may be any value.
    pub fn memory_range(offset: &Word, size: &Word) -> EvmResult<(usize, usize)> {
        if word_is_zero(size) {
            return Ok((0, 0));
        }
        let offset = word_to_usize(offset).ok_or(EvmError::InvalidMemoryAccess)?;
        let size = word_to_usize(size).ok_or(EvmError::InvalidMemoryAccess)?;
        Ok((offset, size))
    }
}
