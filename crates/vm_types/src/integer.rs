//! Bounded integer: arbitrary precision, at most 32 bytes of two's complement.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use num_bigint::{BigInt, Sign};
use num_traits::Zero;

use crate::error::{Result, VmError};

/// Integer values wider than this many bytes are rejected.
pub const MAX_INTEGER_SIZE: usize = 32;

/// Immutable integer value. Clones share the underlying big integer.
#[derive(Clone)]
pub struct Integer {
    value: Rc<BigInt>,
    size: u8,
}

/// Minimal two's-complement byte count; zero has size 0.
fn min_byte_count(value: &BigInt) -> usize {
    if value.is_zero() {
        return 0;
    }
    let bits = match value.sign() {
        // -2^(8k-1) still fits in k bytes, so measure |v| - 1.
        Sign::Minus => (value.magnitude().clone() - 1u32).bits(),
        _ => value.magnitude().bits(),
    };
    (bits / 8 + 1) as usize
}

impl Integer {
    pub fn new(value: BigInt) -> Result<Self> {
        let size = min_byte_count(&value);
        if size > MAX_INTEGER_SIZE {
            tracing::debug!(size, "integer construction rejected");
            return Err(VmError::Construction { size, max: MAX_INTEGER_SIZE });
        }
        Ok(Self { value: Rc::new(value), size: size as u8 })
    }

    pub fn zero() -> Self {
        Self { value: Rc::new(BigInt::zero()), size: 0 }
    }

    /// Parse the little-endian two's-complement form. Empty input is zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_INTEGER_SIZE {
            return Err(VmError::Construction { size: bytes.len(), max: MAX_INTEGER_SIZE });
        }
        Self::new(BigInt::from_signed_bytes_le(bytes))
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }

    /// Minimal byte count of the two's-complement form; 0 for zero.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn get_boolean(&self) -> bool {
        !self.is_zero()
    }

    /// Canonical little-endian two's-complement bytes. Zero is the empty slice.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            Vec::new()
        } else {
            self.value.to_signed_bytes_le()
        }
    }

    /// Same allocation, not just same value.
    pub fn ptr_eq(&self, other: &Integer) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

// Every native width fits in 9 bytes, so these never fail.
macro_rules! impl_from_native {
    ($($t:ty),*) => {$(
        impl From<$t> for Integer {
            fn from(v: $t) -> Self {
                let value = BigInt::from(v);
                let size = min_byte_count(&value) as u8;
                Integer { value: Rc::new(value), size }
            }
        }
    )*};
}

impl_from_native!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);

impl TryFrom<BigInt> for Integer {
    type Error = VmError;

    fn try_from(value: BigInt) -> Result<Self> {
        Integer::new(value)
    }
}

impl From<Integer> for BigInt {
    fn from(i: Integer) -> Self {
        Rc::try_unwrap(i.value).unwrap_or_else(|rc| (*rc).clone())
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.value == other.value
    }
}

impl Eq for Integer {}

impl Hash for Integer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self.value)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
