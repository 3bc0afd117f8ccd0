//! The polymorphic VM value.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::byte_string::ByteString;
use crate::compound::{Array, Compound, CompoundCell};
use crate::error::{Result, VmError};
use crate::integer::Integer;
use crate::limits::ExecutionEngineLimits;
use crate::pointer::Pointer;
use crate::structure::Struct;

/// One-byte type tag, stable across nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StackItemType {
    Any = 0x00,
    Pointer = 0x10,
    Boolean = 0x20,
    Integer = 0x21,
    ByteString = 0x28,
    Array = 0x40,
    Struct = 0x41,
}

impl StackItemType {
    pub fn is_primitive(self) -> bool {
        !self.is_compound()
    }

    pub fn is_compound(self) -> bool {
        matches!(self, Self::Array | Self::Struct)
    }
}

impl TryFrom<u8> for StackItemType {
    type Error = u8;

    fn try_from(b: u8) -> std::result::Result<Self, u8> {
        Ok(match b {
            0x00 => Self::Any,
            0x10 => Self::Pointer,
            0x20 => Self::Boolean,
            0x21 => Self::Integer,
            0x28 => Self::ByteString,
            0x40 => Self::Array,
            0x41 => Self::Struct,
            other => return Err(other),
        })
    }
}

#[derive(Clone, Debug)]
pub enum StackItem {
    Null,
    Boolean(bool),
    Integer(Integer),
    ByteString(ByteString),
    Pointer(Pointer),
    Array(Array),
    Struct(Struct),
}

impl StackItem {
    pub fn item_type(&self) -> StackItemType {
        match self {
            StackItem::Null => StackItemType::Any,
            StackItem::Boolean(_) => StackItemType::Boolean,
            StackItem::Integer(_) => StackItemType::Integer,
            StackItem::ByteString(_) => StackItemType::ByteString,
            StackItem::Pointer(_) => StackItemType::Pointer,
            StackItem::Array(_) => StackItemType::Array,
            StackItem::Struct(_) => StackItemType::Struct,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, StackItem::Array(_) | StackItem::Struct(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StackItem::Null)
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            StackItem::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            StackItem::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn compound_cell(&self) -> Option<&Rc<CompoundCell>> {
        match self {
            StackItem::Array(a) => Some(a.cell()),
            StackItem::Struct(s) => Some(s.cell()),
            _ => None,
        }
    }

    pub fn get_boolean(&self) -> Result<bool> {
        match self {
            StackItem::Null => Ok(false),
            StackItem::Boolean(b) => Ok(*b),
            StackItem::Integer(i) => Ok(i.get_boolean()),
            StackItem::ByteString(b) => b.get_boolean(),
            StackItem::Pointer(p) => Ok(p.get_boolean()),
            StackItem::Array(_) | StackItem::Struct(_) => Ok(true),
        }
    }

    pub fn get_integer(&self) -> Result<Integer> {
        match self {
            StackItem::Integer(i) => Ok(i.clone()),
            StackItem::Boolean(b) => Ok(Integer::from(u8::from(*b))),
            StackItem::ByteString(b) => b.to_integer(),
            other => Err(VmError::TypeMismatch { from: other.item_type(), to: StackItemType::Integer }),
        }
    }

    /// Identity test. Compounds, integers and byte strings compare handles;
    /// null and booleans are singletons; pointers compare (script, position).
    pub fn same_ref(&self, other: &StackItem) -> bool {
        match (self, other) {
            (StackItem::Null, StackItem::Null) => true,
            (StackItem::Boolean(a), StackItem::Boolean(b)) => a == b,
            (StackItem::Integer(a), StackItem::Integer(b)) => a.ptr_eq(b),
            (StackItem::ByteString(a), StackItem::ByteString(b)) => a.ptr_eq(b),
            (StackItem::Pointer(a), StackItem::Pointer(b)) => a == b,
            _ => match (self.compound_cell(), other.compound_cell()) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            },
        }
    }

    /// Equality for everything except structs; arrays compare by identity.
    pub(crate) fn leaf_equals(&self, other: &StackItem, limits: &ExecutionEngineLimits) -> Result<bool> {
        Ok(match (self, other) {
            (StackItem::Null, StackItem::Null) => true,
            (StackItem::Boolean(a), StackItem::Boolean(b)) => a == b,
            (StackItem::Integer(a), StackItem::Integer(b)) => a == b,
            (StackItem::ByteString(a), StackItem::ByteString(b)) => a.equals_bounded(b, limits)?,
            (StackItem::Pointer(a), StackItem::Pointer(b)) => a == b,
            (StackItem::Array(a), StackItem::Array(b)) => a == b,
            (StackItem::Struct(_), _) | (_, StackItem::Struct(_)) => {
                return Err(VmError::UnsupportedOperation("struct equality requires a bounded comparison"))
            }
            _ => false,
        })
    }

    /// Default equality. Refuses a struct on either side, including a
    /// non-struct receiver given a struct argument; use `equals` for those.
    pub fn try_eq(&self, other: &StackItem) -> Result<bool> {
        if let StackItem::Struct(_) = self {
            return Err(VmError::UnsupportedOperation("struct equality requires a bounded comparison"));
        }
        self.leaf_equals(other, &ExecutionEngineLimits::default())
    }

    /// Equality under execution limits; structs use the bounded walk.
    pub fn equals(&self, other: &StackItem, limits: &ExecutionEngineLimits) -> Result<bool> {
        match self {
            StackItem::Struct(s) => s.equals_bounded(other, limits),
            _ if matches!(other, StackItem::Struct(_)) => Ok(false),
            _ => self.leaf_equals(other, limits),
        }
    }

    pub fn convert_to(&self, to: StackItemType) -> Result<StackItem> {
        let from = self.item_type();
        if from == to {
            return Ok(self.clone());
        }
        let mismatch = || VmError::TypeMismatch { from, to };
        match (self, to) {
            (StackItem::Integer(i), StackItemType::Boolean) => Ok(StackItem::Boolean(i.get_boolean())),
            (StackItem::Integer(i), StackItemType::ByteString) => Ok(StackItem::ByteString(ByteString::new(i.to_bytes()))),
            (StackItem::Boolean(b), StackItemType::Integer) => Ok(StackItem::Integer(Integer::from(u8::from(*b)))),
            (StackItem::Boolean(b), StackItemType::ByteString) => Ok(StackItem::ByteString(ByteString::new(vec![u8::from(*b)]))),
            (StackItem::ByteString(b), StackItemType::Boolean) => Ok(StackItem::Boolean(b.get_boolean()?)),
            (StackItem::ByteString(b), StackItemType::Integer) => Ok(StackItem::Integer(b.to_integer()?)),
            (StackItem::Pointer(_), StackItemType::Boolean) => Ok(StackItem::Boolean(true)),
            (StackItem::Struct(s), StackItemType::Array) => Ok(StackItem::Array(s.to_array()?)),
            _ => Err(mismatch()),
        }
    }
}

impl From<Integer> for StackItem {
    fn from(i: Integer) -> Self {
        StackItem::Integer(i)
    }
}

impl From<bool> for StackItem {
    fn from(b: bool) -> Self {
        StackItem::Boolean(b)
    }
}

impl From<ByteString> for StackItem {
    fn from(b: ByteString) -> Self {
        StackItem::ByteString(b)
    }
}

impl From<Pointer> for StackItem {
    fn from(p: Pointer) -> Self {
        StackItem::Pointer(p)
    }
}

impl From<Array> for StackItem {
    fn from(a: Array) -> Self {
        StackItem::Array(a)
    }
}

impl From<Struct> for StackItem {
    fn from(s: Struct) -> Self {
        StackItem::Struct(s)
    }
}
