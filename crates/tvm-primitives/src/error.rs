//! Common error type for primitive parsing

use crate::address::AddressError;
use crate::hash::HashError;
use thiserror::Error;

/// Primitive parsing error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Word error
    #[error("word error: {0}")]
    Hash(#[from] HashError),
}
