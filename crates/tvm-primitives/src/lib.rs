//! # tvm-primitives
//!
//! Fixed-size byte types used throughout the transient VM workspace.
//!
//! Accounts are identified by a 20-byte [`Address`]; storage slots and
//! storage values (persistent and transient alike) are 32-byte big-endian
//! [`H256`] words.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

/// Gas type
pub type Gas = u64;

/// Call depth type
pub type Depth = usize;

/// Strip an optional `0x`/`0X` prefix from a hex string
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
