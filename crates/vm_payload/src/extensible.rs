//! Extensible payload: application-defined data relayed with a single witness.

use crate::error::{PayloadError, Result};
use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::snapshot::DataCache;
use crate::uint::UInt160;
use crate::verifiable::{read_witnesses, write_witnesses, Inventory, InventoryType, Verifiable};
use crate::witness::Witness;

pub const MAX_CATEGORY_SIZE: usize = 32;
pub const MAX_DATA_SIZE: usize = 0x0100_0000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensiblePayload {
    pub category: String,
    /// Inclusive.
    pub valid_block_start: u32,
    /// Exclusive.
    pub valid_block_end: u32,
    pub sender: UInt160,
    pub data: Vec<u8>,
    pub witnesses: Vec<Witness>,
}

impl ExtensiblePayload {
    pub fn new(category: impl Into<String>, valid_block_start: u32, valid_block_end: u32, sender: UInt160, data: Vec<u8>) -> Self {
        Self {
            category: category.into(),
            valid_block_start,
            valid_block_end,
            sender,
            data,
            witnesses: Vec::new(),
        }
    }
}

impl Verifiable for ExtensiblePayload {
    fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_var_string(&self.category);
        writer.write_u32(self.valid_block_start);
        writer.write_u32(self.valid_block_end);
        writer.write(&self.sender);
        writer.write_var_bytes(&self.data);
    }

    fn deserialize_unsigned(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let category = reader.read_var_string(MAX_CATEGORY_SIZE)?;
        let valid_block_start = reader.read_u32()?;
        let valid_block_end = reader.read_u32()?;
        if valid_block_start >= valid_block_end {
            return Err(PayloadError::format(format!(
                "empty validity window {valid_block_start}..{valid_block_end}"
            )));
        }
        let sender = reader.read()?;
        let data = reader.read_var_bytes(MAX_DATA_SIZE)?;
        Ok(Self { category, valid_block_start, valid_block_end, sender, data, witnesses: Vec::new() })
    }

    fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    fn witnesses_mut(&mut self) -> &mut Vec<Witness> {
        &mut self.witnesses
    }

    fn script_hashes_for_verifying(&self, _snapshot: &dyn DataCache) -> Result<Vec<UInt160>> {
        Ok(vec![self.sender])
    }
}

impl Serializable for ExtensiblePayload {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        write_witnesses(writer, &self.witnesses);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mut payload = Self::deserialize_unsigned(reader)?;
        payload.witnesses = read_witnesses(reader, 1)?;
        Ok(payload)
    }
}

impl Inventory for ExtensiblePayload {
    fn inventory_type(&self) -> InventoryType {
        InventoryType::Extensible
    }
}
