use thiserror::Error;

use crate::uint::{UInt160, UInt256};

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("var-int is not minimally encoded")]
    NonCanonicalVarInt,
    #[error("length {len} exceeds maximum {max}")]
    LengthExceeded { len: u64, max: u64 },
    #[error("{0} trailing bytes after object")]
    TrailingBytes(usize),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("previous block {0} not found in snapshot")]
    UnknownPreviousBlock(UInt256),
    #[error("witness count mismatch: expected {expected}, got {actual}")]
    WitnessCountMismatch { expected: usize, actual: usize },
    #[error("witness {index} verifies {actual}, expected {expected}")]
    WitnessScriptMismatch { index: usize, expected: UInt160, actual: UInt160 },
    #[error("contract {0} not found in snapshot")]
    ContractNotFound(UInt160),
    #[error("hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("serde-json: {0}")]
    Json(#[from] serde_json::Error),
}

impl PayloadError {
    pub fn format(msg: impl Into<String>) -> Self {
        PayloadError::InvalidFormat(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PayloadError>;
