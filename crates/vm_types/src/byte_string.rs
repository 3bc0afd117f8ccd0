//! Immutable byte-string leaf with bounded comparison.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::{Result, VmError};
use crate::integer::{Integer, MAX_INTEGER_SIZE};
use crate::item::StackItemType;
use crate::limits::ExecutionEngineLimits;

/// Immutable byte sequence. Clones share the buffer.
#[derive(Clone)]
pub struct ByteString(Rc<[u8]>);

impl ByteString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Rc::from(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ptr_eq(&self, other: &ByteString) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// True iff any byte is non-zero. Only defined up to the integer width.
    pub fn get_boolean(&self) -> Result<bool> {
        if self.len() > MAX_INTEGER_SIZE {
            return Err(VmError::TypeMismatch { from: StackItemType::ByteString, to: StackItemType::Boolean });
        }
        Ok(self.0.iter().any(|b| *b != 0))
    }

    pub fn to_integer(&self) -> Result<Integer> {
        Integer::from_bytes(&self.0)
    }

    /// Content equality, refusing inputs above `max_comparable_size`.
    pub fn equals_bounded(&self, other: &ByteString, limits: &ExecutionEngineLimits) -> Result<bool> {
        if self.ptr_eq(other) {
            return Ok(true);
        }
        let max = limits.max_comparable_size as usize;
        if self.len() > max || other.len() > max {
            tracing::debug!(left = self.len(), right = other.len(), max, "byte string too large to compare");
            return Err(VmError::limit(format!(
                "byte string of {} bytes exceeds comparable size {max}",
                self.len().max(other.len())
            )));
        }
        Ok(self.0 == other.0)
    }
}

impl Hash for ByteString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteString(0x{})", hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!ByteString::new(vec![]).get_boolean().unwrap());
        assert!(!ByteString::new(vec![0, 0]).get_boolean().unwrap());
        assert!(ByteString::new(vec![0, 1]).get_boolean().unwrap());
        assert!(ByteString::new(vec![1u8; 32]).get_boolean().unwrap());
        assert!(matches!(
            ByteString::new(vec![1u8; 33]).get_boolean(),
            Err(VmError::TypeMismatch { from: StackItemType::ByteString, to: StackItemType::Boolean })
        ));
    }

    #[test]
    fn comparable_size_is_enforced() {
        let limits = ExecutionEngineLimits::new(16, 4).unwrap();
        let a = ByteString::new(b"abcd".to_vec());
        let b = ByteString::new(b"abcd".to_vec());
        assert!(a.equals_bounded(&b, &limits).unwrap());
        let big = ByteString::new(b"abcde".to_vec());
        assert!(big.equals_bounded(&a, &limits).unwrap_err().is_resource_limit());
        // same buffer short-circuits before the size check
        assert!(big.equals_bounded(&big.clone(), &limits).unwrap());
    }

    #[test]
    fn integer_round_trip() {
        let i = ByteString::new(vec![0x80]).to_integer().unwrap();
        assert_eq!(i, Integer::from(-128i32));
    }
}
