//! Block header. Its verifying account comes from the previous header in chain state.

use crate::error::{PayloadError, Result};
use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::snapshot::{block_key, DataCache};
use crate::uint::{UInt160, UInt256};
use crate::verifiable::{read_witnesses, write_witnesses, Verifiable};
use crate::witness::Witness;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub version: u32,
    pub prev_hash: UInt256,
    pub merkle_root: UInt256,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub nonce: u64,
    pub index: u32,
    pub primary_index: u8,
    /// Account that must sign the next block.
    pub next_consensus: UInt160,
    pub witnesses: Vec<Witness>,
}

impl Header {
    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_zero()
    }
}

impl Verifiable for Header {
    fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.version);
        writer.write(&self.prev_hash);
        writer.write(&self.merkle_root);
        writer.write_u64(self.timestamp);
        writer.write_u64(self.nonce);
        writer.write_u32(self.index);
        writer.write_u8(self.primary_index);
        writer.write(&self.next_consensus);
    }

    fn deserialize_unsigned(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let version = reader.read_u32()?;
        if version > 0 {
            return Err(PayloadError::format(format!("unsupported header version {version}")));
        }
        Ok(Self {
            version,
            prev_hash: reader.read()?,
            merkle_root: reader.read()?,
            timestamp: reader.read_u64()?,
            nonce: reader.read_u64()?,
            index: reader.read_u32()?,
            primary_index: reader.read_u8()?,
            next_consensus: reader.read()?,
            witnesses: Vec::new(),
        })
    }

    fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    fn witnesses_mut(&mut self) -> &mut Vec<Witness> {
        &mut self.witnesses
    }

    fn script_hashes_for_verifying(&self, snapshot: &dyn DataCache) -> Result<Vec<UInt160>> {
        if self.is_genesis() {
            let witness = self
                .witnesses
                .first()
                .ok_or_else(|| PayloadError::format("genesis header without witness"))?;
            return Ok(vec![witness.script_hash()]);
        }
        let raw = snapshot
            .get(&block_key(&self.prev_hash))
            .ok_or(PayloadError::UnknownPreviousBlock(self.prev_hash))?;
        let prev = Header::from_bytes(&raw)?;
        Ok(vec![prev.next_consensus])
    }
}

impl Serializable for Header {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        write_witnesses(writer, &self.witnesses);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mut header = Self::deserialize_unsigned(reader)?;
        header.witnesses = read_witnesses(reader, 1)?;
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemorySnapshot;

    fn genesis() -> Header {
        let validators = vec![0x11, 0x41, 0x9e, 0xd0, 0xdc, 0x3a];
        Header {
            timestamp: 1_468_595_301_000,
            nonce: 2_083_236_893,
            next_consensus: UInt160::script_hash(&validators),
            witnesses: vec![Witness::new(vec![], vec![0x11])],
            ..Default::default()
        }
    }

    #[test]
    fn unsigned_layout_size() {
        // 4 + 32 + 32 + 8 + 8 + 4 + 1 + 20
        assert_eq!(genesis().unsigned_bytes().len(), 109);
    }

    #[test]
    fn genesis_verifies_with_own_witness() {
        let g = genesis();
        let hashes = g.script_hashes_for_verifying(&MemorySnapshot::new()).unwrap();
        assert_eq!(hashes, vec![UInt160::script_hash(&[0x11])]);
    }

    #[test]
    fn child_verifies_with_previous_next_consensus() {
        let g = genesis();
        let mut snap = MemorySnapshot::new();
        snap.insert(block_key(&g.hash()), g.to_bytes());

        let child = Header { prev_hash: g.hash(), index: 1, ..genesis() };
        assert_eq!(child.script_hashes_for_verifying(&snap).unwrap(), vec![g.next_consensus]);

        let orphan = Header { prev_hash: UInt256::sha256(b"elsewhere"), ..genesis() };
        assert!(matches!(
            orphan.script_hashes_for_verifying(&snap),
            Err(PayloadError::UnknownPreviousBlock(_))
        ));
    }

    #[test]
    fn rejects_future_version() {
        let h = Header { version: 1, ..genesis() };
        assert!(matches!(Header::from_bytes(&h.to_bytes()), Err(PayloadError::InvalidFormat(_))));
    }
}
