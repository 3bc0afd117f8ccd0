//! Contract for content-addressed, witness-verified network objects.
//!
//! The unsigned form is everything except the witnesses. Identity (`hash`)
//! is derived from the unsigned bytes only, so re-signing or re-ordering
//! signatures can never change which object a hash names.

use crate::error::{PayloadError, Result};
use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::snapshot::{contract_key, DataCache};
use crate::uint::{UInt160, UInt256};
use crate::witness::Witness;

pub trait Verifiable: Serializable {
    fn serialize_unsigned(&self, writer: &mut BinaryWriter);

    /// Decode the unsigned part; the result carries no witnesses.
    fn deserialize_unsigned(reader: &mut BinaryReader<'_>) -> Result<Self>;

    fn witnesses(&self) -> &[Witness];

    fn witnesses_mut(&mut self) -> &mut Vec<Witness>;

    /// Accounts whose witnesses must validate, in witness order.
    fn script_hashes_for_verifying(&self, snapshot: &dyn DataCache) -> Result<Vec<UInt160>>;

    fn unsigned_bytes(&self) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        self.serialize_unsigned(&mut w);
        w.into_bytes()
    }

    fn hash(&self) -> UInt256 {
        UInt256::sha256(&self.unsigned_bytes())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InventoryType {
    Transaction = 0x2b,
    Block = 0x2c,
    Extensible = 0x2e,
}

impl TryFrom<u8> for InventoryType {
    type Error = PayloadError;

    fn try_from(b: u8) -> Result<Self> {
        match b {
            0x2b => Ok(Self::Transaction),
            0x2c => Ok(Self::Block),
            0x2e => Ok(Self::Extensible),
            other => Err(PayloadError::format(format!("unknown inventory type 0x{other:02x}"))),
        }
    }
}

/// A verifiable object relayed as an inventory item.
pub trait Inventory: Verifiable {
    fn inventory_type(&self) -> InventoryType;
}

/// Write the witness section that follows the unsigned part.
pub fn write_witnesses(writer: &mut BinaryWriter, witnesses: &[Witness]) {
    writer.write_array(witnesses);
}

/// Read a witness section that must hold exactly `count` witnesses.
pub fn read_witnesses(reader: &mut BinaryReader<'_>, count: usize) -> Result<Vec<Witness>> {
    let witnesses: Vec<Witness> = reader.read_array(count)?;
    if witnesses.len() != count {
        return Err(PayloadError::WitnessCountMismatch { expected: count, actual: witnesses.len() });
    }
    Ok(witnesses)
}

/// Check that each witness is bound to the account it claims to verify.
///
/// A witness with a verification script must hash to its account; one without
/// must point at a contract deployed in `snapshot`. Script execution happens
/// elsewhere.
pub fn verify_witness_bindings<T: Verifiable>(item: &T, snapshot: &dyn DataCache) -> Result<()> {
    let hashes = item.script_hashes_for_verifying(snapshot)?;
    let witnesses = item.witnesses();
    if hashes.len() != witnesses.len() {
        tracing::debug!(expected = hashes.len(), actual = witnesses.len(), "witness count mismatch");
        return Err(PayloadError::WitnessCountMismatch { expected: hashes.len(), actual: witnesses.len() });
    }
    for (index, (expected, witness)) in hashes.iter().zip(witnesses).enumerate() {
        if witness.verification_script.is_empty() {
            if !snapshot.contains(&contract_key(expected)) {
                return Err(PayloadError::ContractNotFound(*expected));
            }
            continue;
        }
        let actual = witness.script_hash();
        if actual != *expected {
            tracing::debug!(index, %expected, %actual, "witness bound to another account");
            return Err(PayloadError::WitnessScriptMismatch { index, expected: *expected, actual });
        }
    }
    Ok(())
}
