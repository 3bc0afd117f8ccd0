//! Binary serialization contract.
//!
//! Fixed-width integers are little-endian. Lengths and counts are unsigned
//! LEB128 and must be minimally encoded, so every value has exactly one
//! byte form and re-serializing a decoded object reproduces its input.

use crate::error::{PayloadError, Result};

pub trait Serializable: Sized {
    fn serialize(&self, writer: &mut BinaryWriter);
    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self>;

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        self.serialize(&mut w);
        w.into_bytes()
    }

    /// Decode one object and require that it spans the whole input.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = BinaryReader::new(bytes);
        let v = Self::deserialize(&mut r)?;
        r.ensure_end()?;
        Ok(v)
    }
}

#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_var_int(&mut self, v: u64) {
        // writing into a Vec cannot fail
        let _ = leb128::write::unsigned(&mut self.buf, v);
    }

    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_var_int(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn write_var_string(&mut self, s: &str) {
        self.write_var_bytes(s.as_bytes());
    }

    pub fn write<T: Serializable>(&mut self, item: &T) {
        item.serialize(self);
    }

    pub fn write_array<T: Serializable>(&mut self, items: &[T]) {
        self.write_var_int(items.len() as u64);
        for item in items {
            item.serialize(self);
        }
    }
}

/// Cursor over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

fn var_int_len(mut v: u64) -> usize {
    let mut n = 1;
    while v >= 0x80 {
        v >>= 7;
        n += 1;
    }
    n
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn ensure_end(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(PayloadError::TrailingBytes(n)),
        }
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(PayloadError::UnexpectedEof { needed: n, remaining: self.remaining() });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_fixed::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(PayloadError::format(format!("invalid bool byte 0x{b:02x}"))),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_fixed()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_fixed()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_fixed()?))
    }

    /// Read a var-int no larger than `max`.
    pub fn read_var_int(&mut self, max: u64) -> Result<u64> {
        let mut cursor = &self.data[self.pos..];
        let before = cursor.len();
        let v = leb128::read::unsigned(&mut cursor).map_err(|e| match e {
            leb128::read::Error::IoError(_) => PayloadError::UnexpectedEof { needed: before + 1, remaining: before },
            leb128::read::Error::Overflow => PayloadError::format("var-int overflows u64"),
        })?;
        let consumed = before - cursor.len();
        if consumed != var_int_len(v) {
            return Err(PayloadError::NonCanonicalVarInt);
        }
        if v > max {
            return Err(PayloadError::LengthExceeded { len: v, max });
        }
        self.pos += consumed;
        Ok(v)
    }

    pub fn read_var_bytes(&mut self, max: usize) -> Result<Vec<u8>> {
        let len = self.read_var_int(max as u64)? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    pub fn read_var_string(&mut self, max: usize) -> Result<String> {
        let bytes = self.read_var_bytes(max)?;
        String::from_utf8(bytes).map_err(|_| PayloadError::format("string is not valid utf-8"))
    }

    pub fn read<T: Serializable>(&mut self) -> Result<T> {
        T::deserialize(self)
    }

    pub fn read_array<T: Serializable>(&mut self, max: usize) -> Result<Vec<T>> {
        let count = self.read_var_int(max as u64)? as usize;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(T::deserialize(self)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_is_little_endian() {
        let mut w = BinaryWriter::new();
        w.write_u16(0x0102);
        w.write_u32(0x0304_0506);
        w.write_u64(1);
        w.write_bool(true);
        assert_eq!(&w.as_bytes()[..6], &[0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);

        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
        assert_eq!(r.read_u32().unwrap(), 0x0304_0506);
        assert_eq!(r.read_u64().unwrap(), 1);
        assert!(r.read_bool().unwrap());
        assert!(r.ensure_end().is_ok());
    }

    #[test]
    fn var_int_boundaries() {
        for v in [0u64, 0x7f, 0x80, 0x3fff, 0x4000, u32::MAX as u64, u64::MAX] {
            let mut w = BinaryWriter::new();
            w.write_var_int(v);
            assert_eq!(w.len(), var_int_len(v), "len of {v}");
            let bytes = w.into_bytes();
            let mut r = BinaryReader::new(&bytes);
            assert_eq!(r.read_var_int(u64::MAX).unwrap(), v);
            assert_eq!(r.remaining(), 0);
        }
    }

    #[test]
    fn padded_var_int_is_rejected() {
        // 1 encoded with a redundant continuation byte
        let mut r = BinaryReader::new(&[0x81, 0x00]);
        assert!(matches!(r.read_var_int(u64::MAX), Err(PayloadError::NonCanonicalVarInt)));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn lengths_are_bounded() {
        let mut w = BinaryWriter::new();
        w.write_var_bytes(&[7u8; 10]);
        let bytes = w.into_bytes();
        assert!(matches!(
            BinaryReader::new(&bytes).read_var_bytes(9),
            Err(PayloadError::LengthExceeded { len: 10, max: 9 })
        ));
        assert_eq!(BinaryReader::new(&bytes).read_var_bytes(10).unwrap(), vec![7u8; 10]);
    }

    #[test]
    fn truncated_input() {
        let mut r = BinaryReader::new(&[0x05, 1, 2]);
        assert!(matches!(r.read_var_bytes(16), Err(PayloadError::UnexpectedEof { needed: 5, remaining: 2 })));
        assert!(matches!(BinaryReader::new(&[]).read_var_int(1), Err(PayloadError::UnexpectedEof { .. })));
        assert!(matches!(BinaryReader::new(&[0x80]).read_var_int(u64::MAX), Err(PayloadError::UnexpectedEof { .. })));
    }

    #[test]
    fn strings_must_be_utf8() {
        let mut w = BinaryWriter::new();
        w.write_var_string("dBFT");
        w.write_var_bytes(&[0xff, 0xfe]);
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.read_var_string(32).unwrap(), "dBFT");
        assert!(r.read_var_string(32).is_err());
    }
}
