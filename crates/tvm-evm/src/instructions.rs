//! Persistent storage and message-call instructions.
//!
//! Like TLOAD/TSTORE these carry no static gas: each handler charges its
//! own cost first, then takes its operands, then checks write permission.

use crate::error::{EvmError, EvmResult};
use crate::frame::Frame;
use crate::gas::{cost, max_call_gas};
use crate::host::{CallInputs, CallKind, CallOutcome, Host};
use crate::stack::{bool_to_word, word_is_zero, word_to_u128, word_to_u64};
use tvm_primitives::{Address, H256};

/// SLOAD: push the persistent value of `(frame.address, slot)`
pub fn sload<H: Host + ?Sized>(frame: &mut Frame, host: &mut H) -> EvmResult<()> {
    frame.gas.charge(cost::SLOAD_COLD)?;
    let slot = H256::from_bytes(frame.stack.pop()?);

    let value = host.sload(frame.address(), slot);
    frame.stack.push(value.into_bytes())?;
    frame.pc += 1;
    Ok(())
}

/// SSTORE: write a persistent value, rejected in static frames
pub fn sstore<H: Host + ?Sized>(frame: &mut Frame, host: &mut H) -> EvmResult<()> {
    frame.gas.charge(cost::SSTORE)?;
    let slot = H256::from_bytes(frame.stack.pop()?);
    let value = H256::from_bytes(frame.stack.pop()?);

    if frame.is_static() {
        return Err(EvmError::WriteInStaticContext);
    }

    host.sstore(frame.address(), slot, value);
    frame.pc += 1;
    Ok(())
}

/// A call instruction waiting on its callee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    /// What to run
    pub inputs: CallInputs,
    /// Where the callee's output is copied
    pub ret_offset: usize,
    /// Bytes of output copied at most
    pub ret_size: usize,
}

/// CALL, DELEGATECALL and STATICCALL, first half.
///
/// Charges gas, takes operands and forwards gas to the callee. Returns
/// `None` when the call is refused without entering (depth limit, value
/// beyond u128): 0 has been pushed and the frame moves on. Otherwise the
/// frame stays on this instruction until [`finish_call`].
pub fn call(
    frame: &mut Frame,
    kind: CallKind,
    max_call_depth: usize,
) -> EvmResult<Option<PendingCall>> {
    frame.gas.charge(cost::CALL_WARM)?;

    let requested_gas = word_to_u64(&frame.stack.pop()?).unwrap_or(u64::MAX);
    let target = Address::from_word(&frame.stack.pop()?);
    let value = match kind {
        CallKind::Call => frame.stack.pop()?,
        CallKind::DelegateCall | CallKind::StaticCall => [0u8; 32],
    };
    let args_offset = frame.stack.pop()?;
    let args_size = frame.stack.pop()?;
    let ret_offset = frame.stack.pop()?;
    let ret_size = frame.stack.pop()?;

    if frame.is_static() && !word_is_zero(&value) {
        return Err(EvmError::WriteInStaticContext);
    }

    let (args_offset, args_size) = Frame::memory_range(&args_offset, &args_size)?;
    let (ret_offset, ret_size) = Frame::memory_range(&ret_offset, &ret_size)?;
    frame.expand_memory(args_offset, args_size)?;
    frame.expand_memory(ret_offset, ret_size)?;

    frame.return_data.clear();

    // Values beyond u128 exceed every balance
    let Some(value) = word_to_u128(&value) else {
        frame.stack.push(bool_to_word(false))?;
        frame.pc += 1;
        return Ok(None);
    };
    if frame.depth() >= max_call_depth {
        frame.stack.push(bool_to_word(false))?;
        frame.pc += 1;
        return Ok(None);
    }

    let gas_limit = requested_gas.min(max_call_gas(frame.gas.remaining()));
    frame.gas.charge(gas_limit)?;

    let input = frame.memory.load_slice(args_offset, args_size);
    let inputs = match kind {
        CallKind::Call => CallInputs {
            kind,
            caller: frame.address(),
            address: target,
            code_address: target,
            value,
            transfers_value: true,
            input,
            gas_limit,
            is_static: frame.is_static(),
            depth: frame.depth() + 1,
        },
        CallKind::StaticCall => CallInputs {
            kind,
            caller: frame.address(),
            address: target,
            code_address: target,
            value: 0,
            transfers_value: false,
            input,
            gas_limit,
            is_static: true,
            depth: frame.depth() + 1,
        },
        CallKind::DelegateCall => CallInputs {
            kind,
            caller: frame.caller(),
            address: frame.address(),
            code_address: target,
            value: frame.value(),
            transfers_value: false,
            input,
            gas_limit,
            is_static: frame.is_static(),
            depth: frame.depth() + 1,
        },
    };

    Ok(Some(PendingCall {
        inputs,
        ret_offset,
        ret_size,
    }))
}

/// Second half of a call instruction: take back unused gas, copy the
/// output and push 1 if the callee succeeded, 0 otherwise. A callee failure
/// never fails the calling frame.
pub fn finish_call(
    frame: &mut Frame,
    ret_offset: usize,
    ret_size: usize,
    outcome: CallOutcome,
) -> EvmResult<()> {
    frame.gas.reimburse(outcome.gas_left);

    let copy_len = ret_size.min(outcome.output.len());
    frame
        .memory
        .store_slice(ret_offset, &outcome.output[..copy_len]);
    frame.return_data = outcome.output;

    frame.stack.push(bool_to_word(outcome.success))?;
    frame.pc += 1;
    Ok(())
}
