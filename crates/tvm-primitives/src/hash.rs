//! 32-byte big-endian word (storage slots and values)

use crate::strip_hex_prefix;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Word parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid word length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        got: usize,
    },
}

/// 256-bit word (32 bytes, big-endian)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct H256([u8; 32]);

impl H256 {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero word
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Create from a u64, big-endian in the low 8 bytes
    pub const fn from_low_u64_be(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        let be = value.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = be[i];
            i += 1;
        }
        H256(bytes)
    }

    /// Create from slice of exactly 32 bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self, HashError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| HashError::InvalidLength {
            expected: Self::LEN,
            got: slice.len(),
        })?;
        Ok(H256(bytes))
    }

    /// Parse a full 32-byte hex string
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(strip_hex_prefix(s))
            .map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Parse a hex quantity of up to 32 bytes, left-padding with zeros.
    ///
    /// Accepts odd-length input (`0x2a`, `0x1`), the form used by test
    /// fixtures for small slot numbers and values.
    pub fn from_quantity(s: &str) -> Result<Self, HashError> {
        let digits = strip_hex_prefix(s);
        let padded;
        let digits = if digits.len() % 2 == 1 {
            padded = format!("0{digits}");
            padded.as_str()
        } else {
            digits
        };
        let bytes = hex::decode(digits).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        if bytes.len() > Self::LEN {
            return Err(HashError::InvalidLength {
                expected: Self::LEN,
                got: bytes.len(),
            });
        }
        let mut word = [0u8; 32];
        word[Self::LEN - bytes.len()..].copy_from_slice(&bytes);
        Ok(H256(word))
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Consume into the inner byte array
    pub fn into_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for H256 {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_quantity(s)
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl From<H256> for [u8; 32] {
    fn from(word: H256) -> Self {
        word.0
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for H256 {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for H256 {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            H256::from_quantity(&s).map_err(D::Error::custom)
        }
    }
}
