//! Gas schedule and per-frame gas meter

use crate::error::{EvmError, EvmResult};
use crate::opcode::Opcode;

/// Gas costs for EVM operations
pub mod cost {
    /// Zero gas
    pub const ZERO: u64 = 0;
    /// Base gas
    pub const BASE: u64 = 2;
    /// Very low gas
    pub const VERYLOW: u64 = 3;
    /// Mid gas
    pub const MID: u64 = 8;
    /// High gas
    pub const HIGH: u64 = 10;
    /// Jump dest gas
    pub const JUMPDEST: u64 = 1;

    /// Warm storage access. The single flat price of TLOAD and TSTORE.
    pub const WARM_STORAGE_READ: u64 = 100;
    /// Persistent storage read (no access lists, every read is cold)
    pub const SLOAD_COLD: u64 = 2100;
    /// Persistent storage write (flat, no refunds)
    pub const SSTORE: u64 = 5000;

    /// Call gas (warm)
    pub const CALL_WARM: u64 = 100;

    /// Memory gas per word
    pub const MEMORY: u64 = 3;

    /// Intrinsic transaction gas
    pub const TX: u64 = 21000;

    /// Max call depth
    pub const MAX_CALL_DEPTH: usize = 1024;
    /// Max stack size
    pub const MAX_STACK_SIZE: usize = 1024;
}

/// Static gas charged by the dispatch loop before an instruction runs.
///
/// Storage and call instructions report zero here: their handlers charge
/// their own cost as the first step so that the charge precedes operand
/// and permission checks.
pub fn static_gas(opcode: Opcode) -> u64 {
    match opcode {
        Opcode::STOP | Opcode::RETURN | Opcode::REVERT | Opcode::INVALID => cost::ZERO,

        Opcode::TLOAD | Opcode::TSTORE | Opcode::SLOAD | Opcode::SSTORE => cost::ZERO,
        Opcode::CALL | Opcode::DELEGATECALL | Opcode::STATICCALL => cost::ZERO,

        Opcode::ADDRESS
        | Opcode::CALLER
        | Opcode::CALLVALUE
        | Opcode::CALLDATASIZE
        | Opcode::POP
        | Opcode::PC
        | Opcode::MSIZE
        | Opcode::GAS
        | Opcode::PUSH0 => cost::BASE,

        Opcode::JUMP => cost::MID,
        Opcode::JUMPI => cost::HIGH,
        Opcode::JUMPDEST => cost::JUMPDEST,

        // Arithmetic, comparison, bitwise, memory, PUSHn, DUPn, SWAPn
        _ => cost::VERYLOW,
    }
}

/// Calculate memory expansion cost
pub fn memory_gas(current_size: usize, new_size: usize) -> u64 {
    if new_size <= current_size {
        return 0;
    }
    let new_cost = memory_word_cost(new_size.div_ceil(32));
    let old_cost = memory_word_cost(current_size.div_ceil(32));
    new_cost.saturating_sub(old_cost)
}

fn memory_word_cost(words: usize) -> u64 {
    let words = words as u64;
    cost::MEMORY
        .saturating_mul(words)
        .saturating_add(words.saturating_mul(words) / 512)
}

/// Largest amount of gas a frame may forward to a child call: all but one 64th
pub fn max_call_gas(remaining: u64) -> u64 {
    remaining - remaining / 64
}

/// Remaining execution budget of one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    remaining: u64,
}

impl GasMeter {
    /// Create a meter with the full limit available
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Charge a fixed cost, failing without side effects if it cannot be paid
    pub fn charge(&mut self, amount: u64) -> EvmResult<()> {
        if self.remaining < amount {
            return Err(EvmError::OutOfGas);
        }
        self.remaining -= amount;
        Ok(())
    }

    /// Credit back gas a child call did not use
    pub fn reimburse(&mut self, amount: u64) {
        self.remaining = self.remaining.saturating_add(amount).min(self.limit);
    }

    /// Gas limit of the frame
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Gas still available
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Gas spent so far
    pub fn used(&self) -> u64 {
        self.limit - self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_gas() {
        assert_eq!(static_gas(Opcode::STOP), 0);
        assert_eq!(static_gas(Opcode::ADD), 3);
        assert_eq!(static_gas(Opcode::PUSH1), 3);
        assert_eq!(static_gas(Opcode::DUP16), 3);
        assert_eq!(static_gas(Opcode::SWAP1), 3);
        assert_eq!(static_gas(Opcode::POP), 2);
        assert_eq!(static_gas(Opcode::JUMP), 8);
        assert_eq!(static_gas(Opcode::JUMPI), 10);
        assert_eq!(static_gas(Opcode::JUMPDEST), 1);
    }

    #[test]
    fn test_handler_charged_opcodes_have_no_static_gas() {
        for op in [
            Opcode::TLOAD,
            Opcode::TSTORE,
            Opcode::SLOAD,
            Opcode::SSTORE,
            Opcode::CALL,
            Opcode::DELEGATECALL,
            Opcode::STATICCALL,
        ] {
            assert_eq!(static_gas(op), 0, "{:?}", op);
        }
    }

    #[test]
    fn test_transient_cost_matches_warm_access() {
        assert_eq!(cost::WARM_STORAGE_READ, 100);
        assert!(cost::WARM_STORAGE_READ < cost::SLOAD_COLD);
    }

    #[test]
    fn test_memory_gas() {
        assert_eq!(memory_gas(32, 32), 0);
        assert_eq!(memory_gas(64, 32), 0);
        assert_eq!(memory_gas(0, 32), 3);
        assert_eq!(memory_gas(0, 64), 6);
        // 32 words: 3*32 + 32*32/512 = 98
        assert_eq!(memory_gas(0, 1024), 98);
        assert_eq!(memory_gas(32, 64), memory_gas(0, 64) - memory_gas(0, 32));
    }

    #[test]
    fn test_max_call_gas() {
        assert_eq!(max_call_gas(6400), 6300);
        assert_eq!(max_call_gas(63), 63);
        assert_eq!(max_call_gas(0), 0);
    }

    #[test]
    fn test_gas_meter_charge() {
        let mut meter = GasMeter::new(250);
        meter.charge(100).unwrap();
        meter.charge(100).unwrap();
        assert_eq!(meter.remaining(), 50);
        assert_eq!(meter.used(), 200);
        assert_eq!(meter.charge(100), Err(EvmError::OutOfGas));
        // A failed charge leaves the meter untouched
        assert_eq!(meter.remaining(), 50);
    }

    #[test]
    fn test_gas_meter_exact_charge() {
        let mut meter = GasMeter::new(100);
        meter.charge(100).unwrap();
        assert_eq!(meter.remaining(), 0);
    }

    #[test]
    fn test_gas_meter_reimburse_capped_at_limit() {
        let mut meter = GasMeter::new(1000);
        meter.charge(600).unwrap();
        meter.reimburse(400);
        assert_eq!(meter.remaining(), 800);
        meter.reimburse(10_000);
        assert_eq!(meter.remaining(), 1000);
        assert_eq!(meter.limit(), 1000);
    }
}
