//! TLOAD/TSTORE behavior across frames, driven through a minimal host that
//! runs nested calls and journals transient storage per call.

use std::collections::HashMap;
use tvm_evm::{
    execute_call, CallContext, CallInputs, CallKind, CallOutcome, Checkpoint, EnteredCall,
    EvmConfig, EvmError, ExecutionResult, Host, Interpreter, InterpreterAction,
    TransientStorage,
};
use tvm_primitives::{Address, Depth, H256};

const A: Address = Address::from_bytes([0xAA; 20]);
const B: Address = Address::from_bytes([0xBB; 20]);
const SENDER: Address = Address::from_bytes([0x01; 20]);

#[derive(Default)]
struct CallingHost {
    code: HashMap<Address, Vec<u8>>,
    transient: TransientStorage,
    config: EvmConfig,
    top_level: Option<ExecutionResult>,
}

impl CallingHost {
    fn with_code(code: &[(Address, Vec<u8>)]) -> Self {
        Self {
            code: code.iter().cloned().collect(),
            ..Default::default()
        }
    }

    /// Run a top-level call the way a transaction would, without clearing
    fn run(&mut self, to: Address, gas: u64, is_static: bool) -> ExecutionResult {
        let inputs = CallInputs {
            kind: if is_static { CallKind::StaticCall } else { CallKind::Call },
            caller: SENDER,
            address: to,
            code_address: to,
            value: 0,
            transfers_value: false,
            input: Vec::new(),
            gas_limit: gas,
            is_static,
            depth: 0,
        };
        let config = self.config.clone();
        execute_call(self, inputs, &config);
        self.top_level.take().expect("top-level call was entered")
    }

    fn end_transaction(&mut self) {
        self.transient.clear();
    }
}

impl Host for CallingHost {
    type Checkpoint = (Depth, Checkpoint);

    fn sload(&mut self, _address: Address, _slot: H256) -> H256 {
        H256::ZERO
    }

    fn sstore(&mut self, _address: Address, _slot: H256, _value: H256) {}

    fn tload(&mut self, address: Address, slot: H256) -> H256 {
        self.transient.get(address, slot)
    }

    fn tstore(&mut self, address: Address, slot: H256, value: H256) {
        self.transient.set(address, slot, value);
    }

    fn enter_call(
        &mut self,
        inputs: &CallInputs,
    ) -> Result<EnteredCall<Self::Checkpoint>, CallOutcome> {
        Ok(EnteredCall {
            code: self.code.get(&inputs.code_address).cloned().unwrap_or_default(),
            checkpoint: (inputs.depth, self.transient.snapshot()),
        })
    }

    fn exit_call(&mut self, (depth, checkpoint): Self::Checkpoint, result: &ExecutionResult) {
        if result.success {
            self.transient.commit(checkpoint);
        } else {
            self.transient.revert(checkpoint);
        }
        if depth == 0 {
            self.top_level = Some(result.clone());
        }
    }
}

// Bytecode helpers

fn push1(v: u8) -> Vec<u8> {
    vec![0x60, v]
}

fn tstore(slot: u8, value: u8) -> Vec<u8> {
    [push1(value), push1(slot), vec![0x5D]].concat()
}

fn tload(slot: u8) -> Vec<u8> {
    [push1(slot), vec![0x5C]].concat()
}

fn push_address(address: Address) -> Vec<u8> {
    let mut code = vec![0x73];
    code.extend_from_slice(address.as_bytes());
    code
}

/// `op` (0xF1 CALL, 0xF4 DELEGATECALL, 0xFA STATICCALL) with no data, all
/// gas forwarded, success flag left on the stack
fn call(op: u8, target: Address) -> Vec<u8> {
    let mut code = vec![0x5F, 0x5F, 0x5F, 0x5F]; // ret size/offset, args size/offset
    if op == 0xF1 {
        code.push(0x5F); // value
    }
    code.extend(push_address(target));
    code.push(0x5A); // GAS
    code.push(op);
    code
}

/// Store the top word at memory 0 and return it
fn return_top() -> Vec<u8> {
    vec![0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3]
}

fn word(v: u64) -> Vec<u8> {
    H256::from_low_u64_be(v).as_bytes().to_vec()
}

#[test]
fn test_unwritten_slot_reads_zero() {
    let code = [tload(7), return_top()].concat();
    let mut host = CallingHost::with_code(&[(A, code)]);
    let result = host.run(A, 100_000, false);
    assert!(result.success);
    assert_eq!(result.output, word(0));
    assert!(host.transient.is_empty());
}

#[test]
fn test_second_write_wins() {
    let code = [tstore(1, 0x11), tstore(1, 0x22), tload(1), return_top()].concat();
    let mut host = CallingHost::with_code(&[(A, code)]);
    let result = host.run(A, 100_000, false);
    assert_eq!(result.output, word(0x22));
}

#[test]
fn test_scenario_write_then_read_then_next_transaction() {
    let writer = [tstore(1, 0x2A), tload(1), return_top()].concat();
    let mut host = CallingHost::with_code(&[(A, writer)]);
    let result = host.run(A, 100_000, false);
    assert_eq!(result.output, word(0x2A));
    host.end_transaction();

    host.code.insert(A, [tload(1), return_top()].concat());
    let result = host.run(A, 100_000, false);
    assert!(result.success);
    assert_eq!(result.output, word(0));
}

#[test]
fn test_failed_delegate_call_rolls_back_shared_slot() {
    // B writes into the delegating account's partition, then aborts
    let b_code = [tstore(1, 0x99), vec![0xFE]].concat();
    let a_code = [
        tstore(1, 0x2A),
        call(0xF4, B),
        vec![0x50], // POP success flag
        tload(1),
        return_top(),
    ]
    .concat();
    let mut host = CallingHost::with_code(&[(A, a_code), (B, b_code)]);
    let result = host.run(A, 1_000_000, false);
    assert!(result.success);
    assert_eq!(result.output, word(0x2A));
}

#[test]
fn test_failed_call_rolls_back_callee_partition() {
    let b_code = [tstore(3, 0x99), vec![0x5F, 0x5F, 0xFD]].concat(); // REVERT(0, 0)
    let a_code = [tstore(1, 0x2A), call(0xF1, B), return_top()].concat();
    let mut host = CallingHost::with_code(&[(A, a_code), (B, b_code)]);
    let result = host.run(A, 1_000_000, false);
    assert!(result.success);
    // Call failed
    assert_eq!(result.output, word(0));
    assert_eq!(host.transient.get(B, H256::from_low_u64_be(3)), H256::ZERO);
    assert_eq!(host.transient.get(A, H256::from_low_u64_be(1)), H256::from_low_u64_be(0x2A));
}

#[test]
fn test_sibling_delegate_calls_keep_first_and_drop_failed_second() {
    const C: Address = Address::from_bytes([0xCC; 20]);
    let b_code = [tstore(1, 5), vec![0x00]].concat();
    let c_code = [tstore(2, 6), vec![0xFE]].concat();
    let a_code = [
        call(0xF4, B),
        vec![0x50],
        call(0xF4, C),
        vec![0x50],
        tload(1),
        vec![0x5F, 0x52], // MSTORE at 0
        tload(2),
        vec![0x60, 0x20, 0x52], // MSTORE at 32
        vec![0x60, 0x40, 0x5F, 0xF3], // RETURN memory[0..64)
    ]
    .concat();
    let mut host = CallingHost::with_code(&[(A, a_code), (B, b_code), (C, c_code)]);
    let result = host.run(A, 1_000_000, false);
    assert!(result.success);
    assert_eq!(result.output, [word(5), word(0)].concat());
    assert_eq!(host.transient.get(A, H256::from_low_u64_be(1)), H256::from_low_u64_be(5));
    assert_eq!(host.transient.get(A, H256::from_low_u64_be(2)), H256::ZERO);
}

#[test]
fn test_self_call_chain_runs_on_small_thread_stack() {
    let code = [tstore(1, 1), call(0xF1, A), vec![0x00]].concat();
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(move || {
            let mut host = CallingHost::with_code(&[(A, code)]);
            let result = host.run(A, u64::MAX / 2, false);
            (result, host.transient.depth())
        })
        .unwrap();
    let (result, open_checkpoints) = handle.join().unwrap();
    assert!(result.success);
    assert_eq!(open_checkpoints, 0);
}

#[test]
fn test_successful_child_write_visible_to_parent() {
    let b_code = tstore(1, 0x55);
    let a_code = [call(0xF4, B), vec![0x50], tload(1), return_top()].concat();
    let mut host = CallingHost::with_code(&[(A, a_code), (B, b_code)]);
    let result = host.run(A, 1_000_000, false);
    assert_eq!(result.output, word(0x55));
}

#[test]
fn test_parent_write_visible_to_descendant() {
    // B returns what it reads from A's partition under DELEGATECALL
    let b_code = [tload(1), return_top()].concat();
    let mut a_code = tstore(1, 0x77);
    // DELEGATECALL with return buffer [0, 32)
    a_code.extend([0x60, 0x20, 0x5F, 0x5F, 0x5F]);
    a_code.extend(push_address(B));
    a_code.extend([0x5A, 0xF4, 0x50]);
    // Return memory[0..32)
    a_code.extend([0x60, 0x20, 0x5F, 0xF3]);
    let mut host = CallingHost::with_code(&[(A, a_code), (B, b_code)]);
    let result = host.run(A, 1_000_000, false);
    assert!(result.success);
    assert_eq!(result.output, word(0x77));
}

#[test]
fn test_static_frame_tstore_charges_exactly_warm_read() {
    // PUSH1 0x2A, PUSH1 1, TSTORE under a static top-level frame
    let code = tstore(1, 0x2A);
    let mut host = CallingHost::with_code(&[(A, code)]);
    let ctx = CallContext::new_static(A, SENDER, Vec::new(), 10_000);
    let mut interp = Interpreter::new(host.code[&A].clone(), ctx, EvmConfig::default());
    let InterpreterAction::Return(result) = interp.run(&mut host) else {
        panic!("no call expected");
    };
    assert_eq!(result.error, Some(EvmError::WriteInStaticContext));
    // Two pushes then exactly one warm read before the failure
    assert_eq!(interp.gas_remaining(), 10_000 - 3 - 3 - 100);
    assert_eq!(host.transient.get(A, H256::from_low_u64_be(1)), H256::ZERO);
}

#[test]
fn test_staticcall_write_fails_and_outer_read_sees_old_value() {
    let b_code = tstore(1, 0x99);
    // A writes its own slot, then STATICCALLs B which tries to write
    let a_code = [tstore(1, 0x2A), call(0xFA, B), return_top()].concat();
    let mut host = CallingHost::with_code(&[(A, a_code), (B, b_code)]);
    let result = host.run(A, 1_000_000, false);
    assert!(result.success);
    assert_eq!(result.output, word(0));
    assert_eq!(host.transient.get(B, H256::from_low_u64_be(1)), H256::ZERO);
    assert_eq!(host.transient.get(A, H256::from_low_u64_be(1)), H256::from_low_u64_be(0x2A));
}

#[test]
fn test_static_flag_reaches_grandchild() {
    // A -STATICCALL-> B -CALL-> C, where C writes
    const C: Address = Address::from_bytes([0xCC; 20]);
    let c_code = tstore(1, 0x01);
    let b_code = [call(0xF1, C), return_top()].concat();
    let a_code = [call(0xFA, B), vec![0x00]].concat();
    let mut host = CallingHost::with_code(&[(A, a_code), (B, b_code), (C, c_code)]);
    let result = host.run(A, 1_000_000, false);
    assert!(result.success);
    assert_eq!(host.transient.get(C, H256::from_low_u64_be(1)), H256::ZERO);
}

#[test]
fn test_tload_cost_is_history_independent() {
    let once = [tload(1), vec![0x00]].concat();
    let after_write = [tstore(1, 5), tload(1), vec![0x00]].concat();
    let mut host = CallingHost::with_code(&[(A, once), (B, after_write)]);
    let first = host.run(A, 100_000, false);
    let second = host.run(A, 100_000, false);
    assert_eq!(first.gas_used, 3 + 100);
    assert_eq!(second.gas_used, first.gas_used);
    let writer = host.run(B, 100_000, false);
    assert_eq!(writer.gas_used, 3 + 3 + 100 + 3 + 100);
}

#[test]
fn test_out_of_gas_before_tstore_leaves_store() {
    // Enough for the pushes but not the warm read
    let code = tstore(1, 0x2A);
    let mut host = CallingHost::with_code(&[(A, code)]);
    let result = host.run(A, 6 + 99, false);
    assert_eq!(result.error, Some(EvmError::OutOfGas));
    assert!(host.transient.is_empty());
}

#[test]
fn test_disabled_transient_storage() {
    let code = [tload(1), return_top()].concat();
    let mut host = CallingHost::with_code(&[(A, code)]);
    host.config = EvmConfig::without_transient_storage();
    let result = host.run(A, 100_000, false);
    assert_eq!(result.error, Some(EvmError::InvalidOpcode(0x5C)));
}
