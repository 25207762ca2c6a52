// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire cursor for reading wire-format data.
//!
//! The cursor tracks a read position over a borrowed buffer. Every read
//! checks the remaining bytes against the needed width and fails with a
//! positioned [`WireError`] instead of panicking; this is the
//! fuzz-resistance contract every decoder in the toolchain shares.
//!
//! The wire format is unconditionally little-endian with no alignment
//! padding, so reads are plain offset arithmetic.

use crate::core::{WireError, LENGTH_PREFIX_SIZE};

/// Bounds-checked reader over wire-format bytes.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use fastwire::wire::WireCursor;
///
/// let data = [0x2A, 0x00, 0x00, 0x00];
/// let mut cursor = WireCursor::new(&data);
/// assert_eq!(cursor.read_i32()?, 42);
/// assert!(cursor.is_at_end());
/// # Ok(())
/// # }
/// ```
pub struct WireCursor<'a> {
    /// The data buffer
    data: &'a [u8],
    /// Current read position
    offset: usize,
}

impl<'a> WireCursor<'a> {
    /// Create a cursor at the start of a buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Get the current position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if at end of buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Verify that `needed` bytes remain at the current position.
    #[inline]
    fn check(&self, needed: usize) -> Result<(), WireError> {
        if self.remaining() < needed {
            return Err(WireError::insufficient_data(
                self.offset,
                needed,
                self.remaining(),
            ));
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        self.check(1)?;
        let value = self.data[self.offset];
        self.offset += 1;
        Ok(value)
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8, WireError> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a bool byte. Any non-zero value decodes as true.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.read_u8()? != 0)
    }

    /// Read an optional presence flag.
    ///
    /// `0x00` means absent, `0x01` means present; anything else is an
    /// invalid-optional-tag error.
    pub fn read_presence(&mut self) -> Result<bool, WireError> {
        let position = self.offset;
        match self.read_u8()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            value => Err(WireError::InvalidOptionalTag { position, value }),
        }
    }

    /// Read a u16 length prefix and return it as usize.
    pub fn read_len(&mut self) -> Result<usize, WireError> {
        self.check(LENGTH_PREFIX_SIZE)?;
        let bytes = [self.data[self.offset], self.data[self.offset + 1]];
        self.offset += LENGTH_PREFIX_SIZE;
        Ok(u16::from_le_bytes(bytes) as usize)
    }

    /// Read an i16 value.
    pub fn read_i16(&mut self) -> Result<i16, WireError> {
        self.check(2)?;
        let bytes = [self.data[self.offset], self.data[self.offset + 1]];
        self.offset += 2;
        Ok(i16::from_le_bytes(bytes))
    }

    /// Read an i32 value.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        self.check(4)?;
        let bytes = [
            self.data[self.offset],
            self.data[self.offset + 1],
            self.data[self.offset + 2],
            self.data[self.offset + 3],
        ];
        self.offset += 4;
        Ok(i32::from_le_bytes(bytes))
    }

    /// Read an i64 value.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        self.check(8)?;
        let bytes = [
            self.data[self.offset],
            self.data[self.offset + 1],
            self.data[self.offset + 2],
            self.data[self.offset + 3],
            self.data[self.offset + 4],
            self.data[self.offset + 5],
            self.data[self.offset + 6],
            self.data[self.offset + 7],
        ];
        self.offset += 8;
        Ok(i64::from_le_bytes(bytes))
    }

    /// Read an f32 value (IEEE 754 bits, little-endian).
    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        self.check(4)?;
        let bytes = [
            self.data[self.offset],
            self.data[self.offset + 1],
            self.data[self.offset + 2],
            self.data[self.offset + 3],
        ];
        self.offset += 4;
        Ok(f32::from_le_bytes(bytes))
    }

    /// Read an f64 value (IEEE 754 bits, little-endian).
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        self.check(8)?;
        let bytes = [
            self.data[self.offset],
            self.data[self.offset + 1],
            self.data[self.offset + 2],
            self.data[self.offset + 3],
            self.data[self.offset + 4],
            self.data[self.offset + 5],
            self.data[self.offset + 6],
            self.data[self.offset + 7],
        ];
        self.offset += 8;
        Ok(f64::from_le_bytes(bytes))
    }

    /// Read a byte slice of the given length.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], WireError> {
        self.check(count)?;
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// The content length is checked against the remaining bytes before any
    /// allocation happens.
    pub fn read_string(&mut self) -> Result<String, WireError> {
        let len = self.read_len()?;
        let position = self.offset;
        let bytes = self.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Err(WireError::InvalidUtf8 { position }),
        }
    }

    /// Verify that `len` fixed-width elements can be read, reporting the
    /// failure at the first element that does not fit.
    ///
    /// The returned position/needed/have describe the partial element, not
    /// the whole array, matching what an element-by-element decoder reports.
    pub fn check_elements(&self, len: usize, width: usize) -> Result<(), WireError> {
        // len <= 65535 and width <= 8, so the product cannot overflow.
        let total = len * width;
        if total <= self.remaining() {
            return Ok(());
        }
        let whole = self.remaining() / width;
        let position = self.offset + whole * width;
        let have = self.remaining() - whole * width;
        Err(WireError::insufficient_data(position, width, have))
    }

    /// Read `len` i16 values as one slice.
    pub fn read_i16_slice(&mut self, len: usize) -> Result<Vec<i16>, WireError> {
        self.check_elements(len, 2)?;
        let bytes = self.read_bytes(len * 2)?;
        let mut out = vec![0i16; len];
        #[cfg(target_endian = "little")]
        bytemuck::cast_slice_mut::<i16, u8>(&mut out).copy_from_slice(bytes);
        #[cfg(target_endian = "big")]
        for (i, chunk) in bytes.chunks_exact(2).enumerate() {
            out[i] = i16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Ok(out)
    }

    /// Read `len` i32 values as one slice.
    pub fn read_i32_slice(&mut self, len: usize) -> Result<Vec<i32>, WireError> {
        self.check_elements(len, 4)?;
        let bytes = self.read_bytes(len * 4)?;
        let mut out = vec![0i32; len];
        #[cfg(target_endian = "little")]
        bytemuck::cast_slice_mut::<i32, u8>(&mut out).copy_from_slice(bytes);
        #[cfg(target_endian = "big")]
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            out[i] = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    /// Read `len` i64 values as one slice.
    pub fn read_i64_slice(&mut self, len: usize) -> Result<Vec<i64>, WireError> {
        self.check_elements(len, 8)?;
        let bytes = self.read_bytes(len * 8)?;
        let mut out = vec![0i64; len];
        #[cfg(target_endian = "little")]
        bytemuck::cast_slice_mut::<i64, u8>(&mut out).copy_from_slice(bytes);
        #[cfg(target_endian = "big")]
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut b = [0u8; 8];
            b.copy_from_slice(chunk);
            out[i] = i64::from_le_bytes(b);
        }
        Ok(out)
    }

    /// Read `len` f32 values as one slice.
    pub fn read_f32_slice(&mut self, len: usize) -> Result<Vec<f32>, WireError> {
        self.check_elements(len, 4)?;
        let bytes = self.read_bytes(len * 4)?;
        let mut out = vec![0f32; len];
        #[cfg(target_endian = "little")]
        bytemuck::cast_slice_mut::<f32, u8>(&mut out).copy_from_slice(bytes);
        #[cfg(target_endian = "big")]
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            out[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    /// Read `len` f64 values as one slice.
    pub fn read_f64_slice(&mut self, len: usize) -> Result<Vec<f64>, WireError> {
        self.check_elements(len, 8)?;
        let bytes = self.read_bytes(len * 8)?;
        let mut out = vec![0f64; len];
        #[cfg(target_endian = "little")]
        bytemuck::cast_slice_mut::<f64, u8>(&mut out).copy_from_slice(bytes);
        #[cfg(target_endian = "big")]
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut b = [0u8; 8];
            b.copy_from_slice(chunk);
            out[i] = f64::from_le_bytes(b);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01, // bool true
            0xFF, // i8 -1
            0x2A, 0x00, // i16 42
            0x2A, 0x00, 0x00, 0x00, // i32 42
            0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // i64 42
        ];
        let mut cursor = WireCursor::new(&data);
        assert!(cursor.read_bool().unwrap());
        assert_eq!(cursor.read_i8().unwrap(), -1);
        assert_eq!(cursor.read_i16().unwrap(), 42);
        assert_eq!(cursor.read_i32().unwrap(), 42);
        assert_eq!(cursor.read_i64().unwrap(), 42);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_read_floats() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-2.25f64).to_le_bytes());
        let mut cursor = WireCursor::new(&data);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_f64().unwrap(), -2.25);
    }

    #[test]
    fn test_read_string() {
        let data = [0x04, 0x00, b't', b'e', b's', b't'];
        let mut cursor = WireCursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "test");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_read_string_invalid_utf8() {
        let data = [0x02, 0x00, 0xFF, 0xFE];
        let mut cursor = WireCursor::new(&data);
        match cursor.read_string().unwrap_err() {
            WireError::InvalidUtf8 { position } => assert_eq!(position, 2),
            other => panic!("expected invalid utf8, got {other:?}"),
        }
    }

    #[test]
    fn test_read_string_declared_longer_than_buffer() {
        let data = [0x05, 0x00, b'a', b'b'];
        let mut cursor = WireCursor::new(&data);
        match cursor.read_string().unwrap_err() {
            WireError::InsufficientData {
                position,
                needed,
                have,
            } => {
                assert_eq!(position, 2);
                assert_eq!(needed, 5);
                assert_eq!(have, 2);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn test_read_past_end() {
        let data = [0x01, 0x02];
        let mut cursor = WireCursor::new(&data);
        match cursor.read_i32().unwrap_err() {
            WireError::InsufficientData {
                position,
                needed,
                have,
            } => {
                assert_eq!(position, 0);
                assert_eq!(needed, 4);
                assert_eq!(have, 2);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn test_read_empty_buffer() {
        let mut cursor = WireCursor::new(&[]);
        assert!(cursor.read_u8().is_err());
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_read_presence() {
        let data = [0x00, 0x01, 0x02];
        let mut cursor = WireCursor::new(&data);
        assert!(!cursor.read_presence().unwrap());
        assert!(cursor.read_presence().unwrap());
        match cursor.read_presence().unwrap_err() {
            WireError::InvalidOptionalTag { position, value } => {
                assert_eq!(position, 2);
                assert_eq!(value, 0x02);
            }
            other => panic!("expected invalid optional tag, got {other:?}"),
        }
    }

    #[test]
    fn test_read_i32_slice() {
        let data = [
            0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
        ];
        let mut cursor = WireCursor::new(&data);
        assert_eq!(cursor.read_i32_slice(3).unwrap(), vec![1, 2, 3]);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_check_elements_reports_partial_element() {
        // Two full elements plus nothing: the failure is at the third
        // element's start, with zero bytes in hand.
        let data = [
            0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        ];
        let cursor = WireCursor::new(&data);
        match cursor.check_elements(3, 4).unwrap_err() {
            WireError::InsufficientData {
                position,
                needed,
                have,
            } => {
                assert_eq!(position, 8);
                assert_eq!(needed, 4);
                assert_eq!(have, 0);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn test_check_elements_reports_torn_element() {
        // One full element plus two stray bytes.
        let data = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00];
        let cursor = WireCursor::new(&data);
        match cursor.check_elements(2, 4).unwrap_err() {
            WireError::InsufficientData {
                position,
                needed,
                have,
            } => {
                assert_eq!(position, 4);
                assert_eq!(needed, 4);
                assert_eq!(have, 2);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn test_read_f64_slice() {
        let mut data = Vec::new();
        for v in [1.0f64, -0.5, 3.25] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut cursor = WireCursor::new(&data);
        assert_eq!(cursor.read_f64_slice(3).unwrap(), vec![1.0, -0.5, 3.25]);
    }
}
