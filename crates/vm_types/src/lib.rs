//! Value model for a deterministic stack VM running untrusted contract code.
//!
//! - Primitive values: bounded integers (at most 32 bytes), code pointers,
//!   booleans, byte strings and null. Immutable, compared by content.
//! - Compound values: `Array` (reference equality) and `Struct` (value copy
//!   and value comparison through bounded walks), both registered with a
//!   per-execution `ResourceTracker`.
//! - Every operation whose cost depends on graph shape is charged against
//!   `ExecutionEngineLimits` and fails fast with `VmError::ResourceLimitExceeded`.

pub mod byte_string;
pub mod compound;
pub mod error;
pub mod integer;
pub mod item;
pub mod limits;
pub mod pointer;
pub mod scope;
pub mod structure;
pub mod tracker;

pub use byte_string::ByteString;
pub use compound::{Array, Compound};
pub use error::{Result, VmError};
pub use integer::{Integer, MAX_INTEGER_SIZE};
pub use item::{StackItem, StackItemType};
pub use limits::ExecutionEngineLimits;
pub use pointer::{Pointer, Script};
pub use scope::ExecutionScope;
pub use structure::Struct;
pub use tracker::ResourceTracker;
