//! Fixed-width hashes. Stored little-endian, displayed big-endian with `0x`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{PayloadError, Result};
use crate::io::{BinaryReader, BinaryWriter, Serializable};

macro_rules! fixed_hash {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn from_le_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn zero() -> Self {
                Self([0u8; $len])
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            pub fn as_le_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut be = self.0;
                be.reverse();
                write!(f, "0x{}", hex::encode(be))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = PayloadError;

            fn from_str(s: &str) -> Result<Self> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s, &mut bytes)?;
                bytes.reverse();
                Ok(Self(bytes))
            }
        }

        impl Serializable for $name {
            fn serialize(&self, writer: &mut BinaryWriter) {
                writer.write_bytes(&self.0);
            }

            fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self> {
                Ok(Self(reader.read_fixed()?))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_hash!(UInt160, 20);
fixed_hash!(UInt256, 32);

impl UInt256 {
    /// SHA-256 of `data`; the identity hash of verifiable objects.
    pub fn sha256(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

impl UInt160 {
    /// Script hash: the first 20 bytes of BLAKE3 over the script.
    pub fn script_hash(script: &[u8]) -> Self {
        let hash = blake3::hash(script);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash.as_bytes()[..20]);
        Self(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn display_is_reversed_hex() {
        let mut raw = [0u8; 20];
        raw[0] = 0x01;
        raw[19] = 0xff;
        let h = UInt160::from_le_bytes(raw);
        let s = h.to_string();
        assert!(s.starts_with("0xff"));
        assert!(s.ends_with("01"));
        assert_eq!(s.parse::<UInt160>().unwrap(), h);
        assert_eq!(s.trim_start_matches("0x").parse::<UInt160>().unwrap(), h);
    }

    #[test]
    fn sha256_known_vector() {
        let h = UInt256::sha256(b"abc");
        assert_eq!(
            h.as_le_bytes(),
            &hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn script_hash_is_stable_and_content_sensitive() {
        let a = UInt160::script_hash(&[0x0c, 0x21]);
        assert_eq!(a, UInt160::script_hash(&[0x0c, 0x21]));
        assert_ne!(a, UInt160::script_hash(&[0x0c, 0x22]));
        assert!(!a.is_zero());
        assert!(UInt160::zero().is_zero());
    }

    #[test]
    fn serde_as_string() {
        let h = UInt256::sha256(b"x");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{h}\""));
        let back: UInt256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
        assert!(serde_json::from_str::<UInt256>("\"0x12\"").is_err());
    }

    #[test]
    fn binary_round_trip() {
        let h = UInt256::sha256(b"y");
        assert_eq!(UInt256::from_bytes(&h.to_bytes()).unwrap(), h);
        assert!(UInt256::from_bytes(&[0u8; 31]).is_err());
    }
}
