//! Bytecode interpreter: one frame's dispatch loop

use crate::config::EvmConfig;
use crate::error::{EvmError, EvmResult, ExecutionResult};
use crate::frame::{CallContext, Frame};
use crate::gas;
use crate::host::{CallInputs, CallKind, CallOutcome, Host};
use crate::instructions;
use crate::opcode::Opcode;
use crate::stack::{self, Word, WORD_ZERO};
use crate::transient;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::trace;

/// Why [`Interpreter::run`] gave control back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpreterAction {
    /// The frame finished
    Return(ExecutionResult),
    /// The frame is suspended on a call instruction. Run the callee and hand
    /// its outcome to [`Interpreter::resume_call`].
    Call(CallInputs),
}

/// Interpreter for a single frame
#[derive(Debug)]
pub struct Interpreter {
    /// Bytecode being executed
    code: Vec<u8>,
    /// Frame state
    frame: Frame,
    /// Active configuration
    config: EvmConfig,
    /// Valid jump destinations
    jump_dests: HashSet<usize>,
    /// Execution stopped
    stopped: bool,
    /// Data passed to RETURN
    output: Vec<u8>,
    /// Return range of the call this frame is suspended on
    pending_call: Option<(usize, usize)>,
    /// Error raised while resuming from a call
    halted: Option<EvmError>,
}

impl Interpreter {
    /// Create an interpreter for `code` running under `context`
    pub fn new(code: Vec<u8>, context: CallContext, config: EvmConfig) -> Self {
        let jump_dests = Self::analyze_jump_dests(&code);
        let frame = Frame::with_stack_limit(context, config.stack_limit);
        Self {
            code,
            frame,
            config,
            jump_dests,
            stopped: false,
            output: Vec::new(),
            pending_call: None,
            halted: None,
        }
    }

    /// Analyze bytecode for valid jump destinations
    fn analyze_jump_dests(code: &[u8]) -> HashSet<usize> {
        let mut dests = HashSet::new();
        let mut i = 0;

        while i < code.len() {
            let opcode = code[i];
            if opcode == Opcode::JUMPDEST as u8 {
                dests.insert(i);
            }
            // Skip PUSH operands
            if (0x60..=0x7F).contains(&opcode) {
                i += (opcode - 0x5F) as usize;
            }
            i += 1;
        }

        dests
    }

    /// Execute until completion, error or a nested call
    pub fn run<H: Host + ?Sized>(&mut self, host: &mut H) -> InterpreterAction {
        if let Some(error) = self.halted.take() {
            return InterpreterAction::Return(self.halt(error));
        }

        while !self.stopped && self.frame.pc < self.code.len() {
            match self.step(host) {
                Ok(None) => {}
                Ok(Some(inputs)) => return InterpreterAction::Call(inputs),
                Err(error) => return InterpreterAction::Return(self.halt(error)),
            }
        }

        // Normal completion (STOP, RETURN, or end of code)
        InterpreterAction::Return(ExecutionResult::success(
            self.frame.gas.used(),
            self.frame.gas.remaining(),
            std::mem::take(&mut self.output),
        ))
    }

    /// Complete the call instruction this frame is suspended on. The next
    /// [`Interpreter::run`] continues after it. Does nothing if no call is
    /// pending.
    pub fn resume_call(&mut self, outcome: CallOutcome) {
        let Some((ret_offset, ret_size)) = self.pending_call.take() else {
            return;
        };
        if let Err(error) = instructions::finish_call(&mut self.frame, ret_offset, ret_size, outcome) {
            self.halted = Some(error);
        }
    }

    fn halt(&mut self, error: EvmError) -> ExecutionResult {
        match error {
            EvmError::Revert(data) => {
                trace!(
                    address = %self.frame.address(),
                    pc = self.frame.pc,
                    "frame reverted"
                );
                ExecutionResult::revert(self.frame.gas.used(), self.frame.gas.remaining(), data)
            }
            error => {
                trace!(
                    address = %self.frame.address(),
                    pc = self.frame.pc,
                    %error,
                    "frame halted"
                );
                ExecutionResult::failure(self.frame.gas.limit(), error)
            }
        }
    }

    /// Execute a single instruction. Returns the callee's inputs when the
    /// instruction suspends the frame on a call.
    pub fn step<H: Host + ?Sized>(&mut self, host: &mut H) -> EvmResult<Option<CallInputs>> {
        if self.frame.pc >= self.code.len() {
            self.stopped = true;
            return Ok(None);
        }

        let opcode_byte = self.code[self.frame.pc];
        let opcode = Opcode::from_byte(opcode_byte)
            .filter(|op| self.config.transient_storage || !op.is_transient())
            .ok_or(EvmError::InvalidOpcode(opcode_byte))?;

        // Check and consume static gas
        self.frame.gas.charge(gas::static_gas(opcode))?;

        self.execute(opcode, host)
    }

    fn execute<H: Host + ?Sized>(
        &mut self,
        opcode: Opcode,
        host: &mut H,
    ) -> EvmResult<Option<CallInputs>> {
        let frame = &mut self.frame;
        match opcode {
            Opcode::STOP => {
                self.stopped = true;
            }

            // Arithmetic
            Opcode::ADD => self.binary_op(stack::word_add)?,
            Opcode::SUB => self.binary_op(stack::word_sub)?,

            // Comparison and bitwise
            Opcode::LT => self.binary_op(|a, b| {
                stack::bool_to_word(stack::word_cmp(a, b) == Ordering::Less)
            })?,
            Opcode::GT => self.binary_op(|a, b| {
                stack::bool_to_word(stack::word_cmp(a, b) == Ordering::Greater)
            })?,
            Opcode::EQ => self.binary_op(|a, b| stack::bool_to_word(a == b))?,
            Opcode::AND => self.binary_op(stack::word_and)?,
            Opcode::OR => self.binary_op(stack::word_or)?,
            Opcode::XOR => self.binary_op(stack::word_xor)?,
            Opcode::ISZERO => {
                let a = frame.stack.pop()?;
                frame.stack.push(stack::bool_to_word(stack::word_is_zero(&a)))?;
                frame.pc += 1;
            }
            Opcode::NOT => {
                let a = frame.stack.pop()?;
                frame.stack.push(stack::word_not(&a))?;
                frame.pc += 1;
            }

            // Environment
            Opcode::ADDRESS => {
                frame.stack.push(frame.address().to_word())?;
                frame.pc += 1;
            }
            Opcode::CALLER => {
                frame.stack.push(frame.caller().to_word())?;
                frame.pc += 1;
            }
            Opcode::CALLVALUE => {
                frame.stack.push(stack::u128_to_word(frame.value()))?;
                frame.pc += 1;
            }
            Opcode::CALLDATALOAD => {
                let offset = stack::word_to_usize(&frame.stack.pop()?).unwrap_or(usize::MAX);
                let input = frame.input();
                let mut word = WORD_ZERO;
                if offset < input.len() {
                    let end = offset.saturating_add(32).min(input.len());
                    word[..end - offset].copy_from_slice(&input[offset..end]);
                }
                frame.stack.push(word)?;
                frame.pc += 1;
            }
            Opcode::CALLDATASIZE => {
                let size = frame.input().len() as u64;
                frame.stack.push(stack::u64_to_word(size))?;
                frame.pc += 1;
            }

            // Stack, memory, flow
            Opcode::POP => {
                frame.stack.pop()?;
                frame.pc += 1;
            }
            Opcode::MLOAD => {
                let offset = stack::word_to_usize(&frame.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                frame.expand_memory(offset, 32)?;
                let value = frame.memory.load(offset);
                frame.stack.push(value)?;
                frame.pc += 1;
            }
            Opcode::MSTORE => {
                let offset = stack::word_to_usize(&frame.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let value = frame.stack.pop()?;
                frame.expand_memory(offset, 32)?;
                frame.memory.store(offset, &value);
                frame.pc += 1;
            }
            Opcode::MSTORE8 => {
                let offset = stack::word_to_usize(&frame.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let value = frame.stack.pop()?;
                frame.expand_memory(offset, 1)?;
                frame.memory.store8(offset, value[31]);
                frame.pc += 1;
            }
            Opcode::SLOAD => instructions::sload(frame, host)?,
            Opcode::SSTORE => instructions::sstore(frame, host)?,
            Opcode::JUMP => {
                let dest = stack::word_to_usize(&frame.stack.pop()?)
                    .ok_or(EvmError::InvalidJump(usize::MAX))?;
                if !self.jump_dests.contains(&dest) {
                    return Err(EvmError::InvalidJump(dest));
                }
                frame.pc = dest;
            }
            Opcode::JUMPI => {
                let dest = stack::word_to_usize(&frame.stack.pop()?)
                    .ok_or(EvmError::InvalidJump(usize::MAX))?;
                let cond = frame.stack.pop()?;
                if stack::word_is_zero(&cond) {
                    frame.pc += 1;
                } else {
                    if !self.jump_dests.contains(&dest) {
                        return Err(EvmError::InvalidJump(dest));
                    }
                    frame.pc = dest;
                }
            }
            Opcode::PC => {
                frame.stack.push(stack::u64_to_word(frame.pc as u64))?;
                frame.pc += 1;
            }
            Opcode::MSIZE => {
                frame.stack.push(stack::u64_to_word(frame.memory.size() as u64))?;
                frame.pc += 1;
            }
            Opcode::GAS => {
                frame.stack.push(stack::u64_to_word(frame.gas.remaining()))?;
                frame.pc += 1;
            }
            Opcode::JUMPDEST => {
                frame.pc += 1;
            }

            // Transient storage
            Opcode::TLOAD => transient::tload(frame, host)?,
            Opcode::TSTORE => transient::tstore(frame, host)?,

            // Push operations
            Opcode::PUSH0 => {
                frame.stack.push(WORD_ZERO)?;
                frame.pc += 1;
            }
            op if op.is_push() => {
                let size = op.push_size();
                let start = frame.pc + 1;
                let end = (start + size).min(self.code.len());
                let mut value = WORD_ZERO;
                // Bytes past the end of code read as zero
                value[32 - size..32 - size + (end - start)].copy_from_slice(&self.code[start..end]);
                frame.stack.push(value)?;
                frame.pc += 1 + size;
            }

            // Dup operations
            op if op.dup_depth() > 0 => {
                frame.stack.dup(op.dup_depth())?;
                frame.pc += 1;
            }

            // Swap operations
            op if op.swap_depth() > 0 => {
                frame.stack.swap(op.swap_depth())?;
                frame.pc += 1;
            }

            // Calls
            Opcode::CALL | Opcode::DELEGATECALL | Opcode::STATICCALL => {
                let kind = match opcode {
                    Opcode::CALL => CallKind::Call,
                    Opcode::DELEGATECALL => CallKind::DelegateCall,
                    _ => CallKind::StaticCall,
                };
                if let Some(pending) = instructions::call(frame, kind, self.config.max_call_depth)? {
                    self.pending_call = Some((pending.ret_offset, pending.ret_size));
                    return Ok(Some(pending.inputs));
                }
            }

            // Return/Revert
            Opcode::RETURN => {
                let data = self.pop_memory_slice()?;
                self.output = data;
                self.stopped = true;
            }
            Opcode::REVERT => {
                let data = self.pop_memory_slice()?;
                return Err(EvmError::Revert(data));
            }
            Opcode::INVALID => {
                return Err(EvmError::InvalidOpcode(0xFE));
            }

            // Covered by the guarded arms above
            _ => {
                return Err(EvmError::InvalidOpcode(opcode as u8));
            }
        }

        Ok(None)
    }

    fn binary_op(&mut self, op: impl FnOnce(&Word, &Word) -> Word) -> EvmResult<()> {
        let a = self.frame.stack.pop()?;
        let b = self.frame.stack.pop()?;
        self.frame.stack.push(op(&a, &b))?;
        self.frame.pc += 1;
        Ok(())
    }

    /// Pop `(offset, size)`, charge expansion and read the range
    fn pop_memory_slice(&mut self) -> EvmResult<Vec<u8>> {
        let offset = self.frame.stack.pop()?;
        let size = self.frame.stack.pop()?;
        let (offset, size) = Frame::memory_range(&offset, &size)?;
        self.frame.expand_memory(offset, size)?;
        Ok(self.frame.memory.load_slice(offset, size))
    }

    /// The frame being executed
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Get remaining gas
    pub fn gas_remaining(&self) -> u64 {
        self.frame.gas.remaining()
    }

    /// Data passed to RETURN so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}
