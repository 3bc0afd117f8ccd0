use thiserror::Error;

use crate::item::StackItemType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Bounded integer does not fit the 32-byte representation.
    #[error("construction: integer of {size} bytes exceeds the {max}-byte limit")]
    Construction { size: usize, max: usize },
    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error("type mismatch: cannot convert {from:?} to {to:?}")]
    TypeMismatch { from: StackItemType, to: StackItemType },
    #[error("index {index} out of range for container of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid limits: {0}")]
    InvalidLimits(String),
}

impl VmError {
    pub fn limit(msg: impl Into<String>) -> Self {
        VmError::ResourceLimitExceeded(msg.into())
    }

    /// True for failures caused by a budget or tracker refusal.
    pub fn is_resource_limit(&self) -> bool {
        matches!(self, VmError::ResourceLimitExceeded(_))
    }
}

pub type Result<T> = std::result::Result<T, VmError>;
