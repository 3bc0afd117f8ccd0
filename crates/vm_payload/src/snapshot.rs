//! Read-only view of chain state used during script-hash resolution.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::uint::{UInt160, UInt256};

/// Storage id of the contract registry.
pub const CONTRACT_MANAGEMENT_ID: i32 = -1;
/// Storage id of the ledger.
pub const LEDGER_ID: i32 = -4;
pub const PREFIX_CONTRACT: u8 = 8;
pub const PREFIX_BLOCK: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey {
    pub id: i32,
    pub key: Vec<u8>,
}

impl StorageKey {
    pub fn new(id: i32, prefix: u8, suffix: &[u8]) -> Self {
        let mut key = Vec::with_capacity(1 + suffix.len());
        key.push(prefix);
        key.extend_from_slice(suffix);
        Self { id, key }
    }
}

pub fn contract_key(hash: &UInt160) -> StorageKey {
    StorageKey::new(CONTRACT_MANAGEMENT_ID, PREFIX_CONTRACT, hash.as_le_bytes())
}

pub fn block_key(hash: &UInt256) -> StorageKey {
    StorageKey::new(LEDGER_ID, PREFIX_BLOCK, hash.as_le_bytes())
}

/// No mutation is reachable through this trait.
pub trait DataCache {
    fn get(&self, key: &StorageKey) -> Option<Vec<u8>>;

    fn contains(&self, key: &StorageKey) -> bool {
        self.get(key).is_some()
    }

    /// Entries of contract `id` whose key starts with `prefix`, in key order.
    fn find(&self, id: i32, prefix: &[u8]) -> Vec<(StorageKey, Vec<u8>)>;
}

/// In-memory snapshot for tests and offline tooling.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshot {
    entries: BTreeMap<StorageKey, Vec<u8>>,
}

#[derive(Deserialize)]
struct SnapshotFile {
    entries: Vec<SnapshotEntry>,
}

#[derive(Deserialize)]
struct SnapshotEntry {
    id: i32,
    key: String,
    value: String,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StorageKey, value: Vec<u8>) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `{"entries":[{"id":-1,"key":"08..","value":".."}]}` with hex keys/values.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(s)?;
        let mut snap = Self::new();
        for e in file.entries {
            snap.insert(StorageKey { id: e.id, key: hex::decode(&e.key)? }, hex::decode(&e.value)?);
        }
        Ok(snap)
    }
}

impl DataCache for MemorySnapshot {
    fn get(&self, key: &StorageKey) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn contains(&self, key: &StorageKey) -> bool {
        self.entries.contains_key(key)
    }

    fn find(&self, id: i32, prefix: &[u8]) -> Vec<(StorageKey, Vec<u8>)> {
        let start = StorageKey { id, key: prefix.to_vec() };
        self.entries
            .range(start..)
            .take_while(|(k, _)| k.id == id && k.key.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_is_prefix_scoped() {
        let mut s = MemorySnapshot::new();
        s.insert(StorageKey::new(-1, 8, &[1]), vec![1]);
        s.insert(StorageKey::new(-1, 8, &[2]), vec![2]);
        s.insert(StorageKey::new(-1, 9, &[1]), vec![3]);
        s.insert(StorageKey::new(-4, 8, &[1]), vec![4]);
        let found = s.find(-1, &[8]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1, vec![1]);
        assert_eq!(found[1].1, vec![2]);
        assert!(s.find(-2, &[]).is_empty());
    }

    #[test]
    fn load_from_json() {
        let h = UInt160::script_hash(b"contract");
        let json = format!(
            r#"{{"entries":[{{"id":-1,"key":"{}","value":"00"}}]}}"#,
            hex::encode(&contract_key(&h).key)
        );
        let s = MemorySnapshot::from_json_str(&json).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.contains(&contract_key(&h)));
        assert_eq!(s.get(&contract_key(&h)), Some(vec![0]));
        assert!(MemorySnapshot::from_json_str(r#"{"entries":[{"id":0,"key":"zz","value":""}]}"#).is_err());
    }
}
