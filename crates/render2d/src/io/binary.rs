//! Little-endian field encoding
//!
//! Integers and floats are little-endian, booleans one byte, colours packed
//! ARGB in an `i32`. Strings carry their byte length as a 7-bit variable
//! length prefix (low groups first, high bit set on every byte but the last)
//! followed by UTF-8 bytes.

use super::{PersistError, PersistResult};
use crate::foundation::math::Vec2;
use crate::render::color::Color;

/// Append-only field encoder
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Written bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// One byte
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Boolean as one byte
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Signed 32-bit integer
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Unsigned 32-bit integer
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// 32-bit float
    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Two floats, x then y
    pub fn write_vec2(&mut self, value: Vec2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    /// Colour packed as ARGB
    pub fn write_color(&mut self, color: Color) {
        self.write_i32(color.to_argb());
    }

    /// 7-bit encoded length
    pub fn write_7bit_length(&mut self, mut length: usize) {
        while length >= 0x80 {
            self.write_u8((length as u8 & 0x7F) | 0x80);
            length >>= 7;
        }
        self.write_u8(length as u8);
    }

    /// Length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) {
        self.write_7bit_length(value.len());
        self.write_bytes(value.as_bytes());
    }
}

/// Bounds-checked forward cursor over a byte slice
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    /// Read from the start of `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been read
    pub const fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Borrow the next `count` bytes
    pub fn read_bytes(&mut self, count: usize) -> PersistResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(PersistError::ChunkOverrun {
                requested: count,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> PersistResult<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Skip `count` bytes
    pub fn skip(&mut self, count: usize) -> PersistResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// One byte
    pub fn read_u8(&mut self) -> PersistResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Boolean; any non-zero byte is true
    pub fn read_bool(&mut self) -> PersistResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Signed 32-bit integer
    pub fn read_i32(&mut self) -> PersistResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Unsigned 32-bit integer
    pub fn read_u32(&mut self) -> PersistResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// 32-bit float
    pub fn read_f32(&mut self) -> PersistResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Two floats, x then y
    pub fn read_vec2(&mut self) -> PersistResult<Vec2> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(Vec2::new(x, y))
    }

    /// Colour packed as ARGB
    pub fn read_color(&mut self) -> PersistResult<Color> {
        Ok(Color::from_argb(self.read_i32()?))
    }

    /// 7-bit encoded length (at most five bytes)
    pub fn read_7bit_length(&mut self) -> PersistResult<usize> {
        let mut length = 0usize;
        for group in 0..5 {
            let byte = self.read_u8()?;
            length |= usize::from(byte & 0x7F) << (group * 7);
            if byte & 0x80 == 0 {
                return Ok(length);
            }
        }
        Err(PersistError::InvalidString)
    }

    /// Length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> PersistResult<String> {
        let length = self.read_7bit_length()?;
        let bytes = self.read_bytes(length)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| PersistError::InvalidString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_little_endian() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(0x0102_0304);
        writer.write_bool(true);
        writer.write_f32(1.0);
        assert_eq!(writer.as_bytes(), &[4, 3, 2, 1, 1, 0, 0, 0x80, 0x3F]);
    }

    #[test]
    fn test_long_string_uses_two_length_bytes() {
        let text = "x".repeat(200);
        let mut writer = BinaryWriter::new();
        writer.write_string(&text);
        assert_eq!(&writer.as_bytes()[..2], &[0xC8, 0x01]);
        assert_eq!(writer.len(), 202);

        let bytes = writer.into_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), text);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_short_read_is_overrun() {
        let mut reader = BinaryReader::new(&[1, 2]);
        assert!(matches!(
            reader.read_i32(),
            Err(PersistError::ChunkOverrun { requested: 4, remaining: 2 })
        ));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut reader = BinaryReader::new(&[2, 0xFF, 0xFE]);
        assert!(matches!(reader.read_string(), Err(PersistError::InvalidString)));

        let mut unterminated = BinaryReader::new(&[0xFF; 6]);
        assert!(matches!(unterminated.read_7bit_length(), Err(PersistError::InvalidString)));
    }

    #[test]
    fn test_color_packs_as_argb() {
        let mut writer = BinaryWriter::new();
        writer.write_color(Color::RED);
        let bytes = writer.into_bytes();
        assert_eq!(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), Color::RED.to_argb());
        assert_eq!(BinaryReader::new(&bytes).read_color().unwrap(), Color::RED);
    }
}
