//! EVM operand stack

use crate::error::{EvmError, EvmResult};
use crate::gas::cost::MAX_STACK_SIZE;
use std::cmp::Ordering;

/// 256-bit stack word (big-endian `[u8; 32]`)
pub type Word = [u8; 32];

/// Internal alias for primitive_types::U256 used for arithmetic
type PU256 = primitive_types::U256;

/// Zero word
pub const WORD_ZERO: Word = [0u8; 32];

/// One
pub const WORD_ONE: Word = {
    let mut v = [0u8; 32];
    v[31] = 1;
    v
};

/// EVM stack of 32-byte words with a fixed capacity
#[derive(Clone, Debug)]
pub struct Stack {
    data: Vec<Word>,
    limit: usize,
}

impl Stack {
    /// Create a new empty stack with the default 1024-word capacity
    pub fn new() -> Self {
        Self::with_limit(MAX_STACK_SIZE)
    }

    /// Create a new empty stack with a custom capacity
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::with_capacity(limit.min(MAX_STACK_SIZE)),
            limit,
        }
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: Word) -> EvmResult<()> {
        if self.data.len() >= self.limit {
            return Err(EvmError::StackOverflow(self.limit));
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> EvmResult<Word> {
        self.data.pop().ok_or(EvmError::StackUnderflow)
    }

    /// Peek at a specific depth (0 = top)
    pub fn peek(&self, depth: usize) -> EvmResult<&Word> {
        if depth >= self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        Ok(&self.data[self.data.len() - 1 - depth])
    }

    /// Swap top with item at depth (1 = swap with second item)
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth >= self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        let len = self.data.len();
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Duplicate item at depth to top (1 = dup top)
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth > self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        let value = self.data[self.data.len() - depth];
        self.push(value)
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Capacity of this stack
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

// Word helpers

/// Convert u64 to a word
pub fn u64_to_word(value: u64) -> Word {
    let mut result = WORD_ZERO;
    result[24..32].copy_from_slice(&value.to_be_bytes());
    result
}

/// Try to convert a word to u64 (None on overflow)
pub fn word_to_u64(value: &Word) -> Option<u64> {
    if value[0..24].iter().any(|&b| b != 0) {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&value[24..32]);
    Some(u64::from_be_bytes(bytes))
}

/// Try to convert a word to u128 (None on overflow)
pub fn word_to_u128(value: &Word) -> Option<u128> {
    if value[0..16].iter().any(|&b| b != 0) {
        return None;
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&value[16..32]);
    Some(u128::from_be_bytes(bytes))
}

/// Convert u128 to a word
pub fn u128_to_word(value: u128) -> Word {
    let mut result = WORD_ZERO;
    result[16..32].copy_from_slice(&value.to_be_bytes());
    result
}

/// Try to convert a word to usize (None on overflow)
pub fn word_to_usize(value: &Word) -> Option<usize> {
    word_to_u64(value).and_then(|v| usize::try_from(v).ok())
}

/// Check if a word is zero
pub fn word_is_zero(value: &Word) -> bool {
    value.iter().all(|&b| b == 0)
}

/// Boolean to word (1 or 0)
pub fn bool_to_word(value: bool) -> Word {
    if value {
        WORD_ONE
    } else {
        WORD_ZERO
    }
}

fn to_pu256(v: &Word) -> PU256 {
    PU256::from_big_endian(v)
}

fn from_pu256(v: PU256) -> Word {
    let mut result = WORD_ZERO;
    v.to_big_endian(&mut result);
    result
}

/// Wrapping 256-bit addition
pub fn word_add(a: &Word, b: &Word) -> Word {
    from_pu256(to_pu256(a).overflowing_add(to_pu256(b)).0)
}

/// Wrapping 256-bit subtraction
pub fn word_sub(a: &Word, b: &Word) -> Word {
    from_pu256(to_pu256(a).overflowing_sub(to_pu256(b)).0)
}

/// Unsigned comparison (big-endian byte order is numeric order)
pub fn word_cmp(a: &Word, b: &Word) -> Ordering {
    a.cmp(b)
}

/// Bitwise AND
pub fn word_and(a: &Word, b: &Word) -> Word {
    std::array::from_fn(|i| a[i] & b[i])
}

/// Bitwise OR
pub fn word_or(a: &Word, b: &Word) -> Word {
    std::array::from_fn(|i| a[i] | b[i])
}

/// Bitwise XOR
pub fn word_xor(a: &Word, b: &Word) -> Word {
    std::array::from_fn(|i| a[i] ^ b[i])
}

/// Bitwise NOT
pub fn word_not(a: &Word) -> Word {
    std::array::from_fn(|i| !a[i])
}
