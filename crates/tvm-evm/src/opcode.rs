//! Opcode definitions for the supported instruction subset

macro_rules! opcodes {
    ($($name:ident = $byte:literal),* $(,)?) => {
        /// Supported opcodes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        #[allow(missing_docs)]
        pub enum Opcode {
            $($name = $byte,)*
        }

        impl Opcode {
            /// Try to convert from byte
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Self::$name),)*
                    _ => None,
                }
            }

            /// Mnemonic of the opcode
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }
    };
}

opcodes! {
    // Stop and arithmetic
    STOP = 0x00,
    ADD = 0x01,
    SUB = 0x03,

    // Comparison and bitwise logic
    LT = 0x10,
    GT = 0x11,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,

    // Environmental information
    ADDRESS = 0x30,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,

    // Stack, memory, storage and flow
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5A,
    JUMPDEST = 0x5B,
    TLOAD = 0x5C,
    TSTORE = 0x5D,
    PUSH0 = 0x5F,

    PUSH1 = 0x60, PUSH2 = 0x61, PUSH3 = 0x62, PUSH4 = 0x63,
    PUSH5 = 0x64, PUSH6 = 0x65, PUSH7 = 0x66, PUSH8 = 0x67,
    PUSH9 = 0x68, PUSH10 = 0x69, PUSH11 = 0x6A, PUSH12 = 0x6B,
    PUSH13 = 0x6C, PUSH14 = 0x6D, PUSH15 = 0x6E, PUSH16 = 0x6F,
    PUSH17 = 0x70, PUSH18 = 0x71, PUSH19 = 0x72, PUSH20 = 0x73,
    PUSH21 = 0x74, PUSH22 = 0x75, PUSH23 = 0x76, PUSH24 = 0x77,
    PUSH25 = 0x78, PUSH26 = 0x79, PUSH27 = 0x7A, PUSH28 = 0x7B,
    PUSH29 = 0x7C, PUSH30 = 0x7D, PUSH31 = 0x7E, PUSH32 = 0x7F,

    DUP1 = 0x80, DUP2 = 0x81, DUP3 = 0x82, DUP4 = 0x83,
    DUP5 = 0x84, DUP6 = 0x85, DUP7 = 0x86, DUP8 = 0x87,
    DUP9 = 0x88, DUP10 = 0x89, DUP11 = 0x8A, DUP12 = 0x8B,
    DUP13 = 0x8C, DUP14 = 0x8D, DUP15 = 0x8E, DUP16 = 0x8F,

    SWAP1 = 0x90, SWAP2 = 0x91, SWAP3 = 0x92, SWAP4 = 0x93,
    SWAP5 = 0x94, SWAP6 = 0x95, SWAP7 = 0x96, SWAP8 = 0x97,
    SWAP9 = 0x98, SWAP10 = 0x99, SWAP11 = 0x9A, SWAP12 = 0x9B,
    SWAP13 = 0x9C, SWAP14 = 0x9D, SWAP15 = 0x9E, SWAP16 = 0x9F,

    // System
    CALL = 0xF1,
    RETURN = 0xF3,
    DELEGATECALL = 0xF4,
    STATICCALL = 0xFA,
    REVERT = 0xFD,
    INVALID = 0xFE,
}

impl Opcode {
    /// Get PUSH operand size (1-32 for PUSH1-PUSH32, 0 otherwise)
    pub fn push_size(self) -> usize {
        let byte = self as u8;
        if (0x60..=0x7F).contains(&byte) {
            (byte - 0x5F) as usize
        } else {
            0
        }
    }

    /// Check if this is a PUSH opcode (PUSH0 included)
    pub fn is_push(self) -> bool {
        let byte = self as u8;
        (0x5F..=0x7F).contains(&byte)
    }

    /// Get DUP depth (1-16 for DUP1-DUP16, 0 otherwise)
    pub fn dup_depth(self) -> usize {
        let byte = self as u8;
        if (0x80..=0x8F).contains(&byte) {
            (byte - 0x7F) as usize
        } else {
            0
        }
    }

    /// Get SWAP depth (1-16 for SWAP1-SWAP16, 0 otherwise)
    pub fn swap_depth(self) -> usize {
        let byte = self as u8;
        if (0x90..=0x9F).contains(&byte) {
            (byte - 0x8F) as usize
        } else {
            0
        }
    }

    /// Whether the opcode touches transient storage
    pub fn is_transient(self) -> bool {
        matches!(self, Self::TLOAD | Self::TSTORE)
    }
}
