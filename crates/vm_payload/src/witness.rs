use crate::error::Result;
use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::uint::UInt160;

pub const MAX_INVOCATION_SCRIPT: usize = 1024;
pub const MAX_VERIFICATION_SCRIPT: usize = 1024;

/// Proof attached to a verifiable object: arguments plus the script they satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Witness {
    pub invocation_script: Vec<u8>,
    /// Empty means "verify with the deployed contract at the expected hash".
    pub verification_script: Vec<u8>,
}

impl Witness {
    pub fn new(invocation_script: Vec<u8>, verification_script: Vec<u8>) -> Self {
        Self { invocation_script, verification_script }
    }

    pub fn script_hash(&self) -> UInt160 {
        UInt160::script_hash(&self.verification_script)
    }
}

impl Serializable for Witness {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&self.invocation_script);
        writer.write_var_bytes(&self.verification_script);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            invocation_script: reader.read_var_bytes(MAX_INVOCATION_SCRIPT)?,
            verification_script: reader.read_var_bytes(MAX_VERIFICATION_SCRIPT)?,
        })
    }
}
