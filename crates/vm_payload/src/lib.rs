//! Verifiable network payloads.
//!
//! # Layout
//!
//! ```text
//! [ unsigned part ][ witness section ]
//!        │
//!        └── SHA-256 ──► hash (object identity)
//! ```
//!
//! Witnesses are proofs over the unsigned part. They are serialized after it
//! and never feed into the hash, so a relayed object keeps its identity no
//! matter how its witnesses are re-encoded.

pub mod error;
pub mod extensible;
pub mod header;
pub mod io;
pub mod snapshot;
pub mod uint;
pub mod verifiable;
pub mod witness;

pub use error::{PayloadError, Result};
pub use extensible::ExtensiblePayload;
pub use header::Header;
pub use io::{BinaryReader, BinaryWriter, Serializable};
pub use snapshot::{block_key, contract_key, DataCache, MemorySnapshot, StorageKey};
pub use uint::{UInt160, UInt256};
pub use verifiable::{verify_witness_bindings, Inventory, InventoryType, Verifiable};
pub use witness::Witness;
