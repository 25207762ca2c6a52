// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire encoder for writing wire-format data.
//!
//! The encoder owns a growable buffer and appends little-endian bytes with
//! no padding and no framing. Length and range ceilings are enforced by the
//! callers (the schema-driven codec and the fixture converter), which have
//! the field context needed for useful errors; the writer itself is
//! infallible.
//!
//! On little-endian hosts, slices of fixed-width primitives go out through a
//! single bulk byte copy after the length prefix; big-endian hosts fall back
//! to an element-by-element swap.

use crate::core::LENGTH_PREFIX_SIZE;

/// Default initial capacity for the encoder buffer.
const DEFAULT_CAPACITY: usize = 64;

/// Buffer writer for the wire format.
///
/// # Example
///
/// ```
/// use fastwire::wire::WireEncoder;
///
/// let mut encoder = WireEncoder::new();
/// encoder.write_len(4);
/// encoder.write_raw(b"test");
/// encoder.write_i32(42);
/// assert_eq!(encoder.len(), 10);
/// let bytes = encoder.finish();
/// assert_eq!(&bytes[..2], &[0x04, 0x00]);
/// ```
pub struct WireEncoder {
    /// Output buffer
    buffer: Vec<u8>,
}

impl Default for WireEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl WireEncoder {
    /// Create a new encoder with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new encoder with the specified initial capacity.
    ///
    /// Callers that know the message's analyzed size bound pass it here so
    /// the buffer grows at most once.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Get the current size of the encoded data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check whether anything has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get a reference to the encoded data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the encoder and return the encoded data.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    /// Write a bool as one byte (0x00 or 0x01).
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(value as u8);
    }

    /// Write an optional presence flag.
    pub fn write_presence(&mut self, present: bool) {
        self.buffer.push(present as u8);
    }

    /// Write an 8-bit signed integer.
    pub fn write_i8(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    /// Write a 16-bit signed integer.
    pub fn write_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 32-bit signed integer.
    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 64-bit signed integer.
    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 32-bit float as its IEEE 754 bits, little-endian.
    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 64-bit float as its IEEE 754 bits, little-endian.
    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a uint16 length prefix.
    ///
    /// The `u16` parameter type is the ceiling: lengths above 65 535 are
    /// rejected by callers before they get here.
    pub fn write_len(&mut self, len: u16) {
        self.buffer.extend_from_slice(&len.to_le_bytes());
    }

    /// Write raw bytes as-is.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Write a string: uint16 byte length followed by UTF-8 content.
    pub fn write_string(&mut self, value: &str) {
        self.buffer
            .reserve(LENGTH_PREFIX_SIZE + value.len());
        self.write_len(value.len() as u16);
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// Write an i16 slice as one bulk copy (after the caller's length prefix).
    pub fn write_i16_slice(&mut self, values: &[i16]) {
        #[cfg(target_endian = "little")]
        self.buffer.extend_from_slice(bytemuck::cast_slice(values));
        #[cfg(target_endian = "big")]
        for v in values {
            self.buffer.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Write an i32 slice as one bulk copy.
    pub fn write_i32_slice(&mut self, values: &[i32]) {
        #[cfg(target_endian = "little")]
        self.buffer.extend_from_slice(bytemuck::cast_slice(values));
        #[cfg(target_endian = "big")]
        for v in values {
            self.buffer.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Write an i64 slice as one bulk copy.
    pub fn write_i64_slice(&mut self, values: &[i64]) {
        #[cfg(target_endian = "little")]
        self.buffer.extend_from_slice(bytemuck::cast_slice(values));
        #[cfg(target_endian = "big")]
        for v in values {
            self.buffer.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Write an f32 slice as one bulk copy.
    pub fn write_f32_slice(&mut self, values: &[f32]) {
        #[cfg(target_endian = "little")]
        self.buffer.extend_from_slice(bytemuck::cast_slice(values));
        #[cfg(target_endian = "big")]
        for v in values {
            self.buffer.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Write an f64 slice as one bulk copy.
    pub fn write_f64_slice(&mut self, values: &[f64]) {
        #[cfg(target_endian = "little")]
        self.buffer.extend_from_slice(bytemuck::cast_slice(values));
        #[cfg(target_endian = "big")]
        for v in values {
            self.buffer.extend_from_slice(&v.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_primitives() {
        let mut encoder = WireEncoder::new();
        encoder.write_bool(true);
        encoder.write_i8(-1);
        encoder.write_i16(42);
        encoder.write_i32(42);
        encoder.write_i64(42);
        let data = encoder.finish();
        assert_eq!(
            data,
            vec![
                0x01, 0xFF, 0x2A, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn test_write_floats_are_ieee_bits() {
        let mut encoder = WireEncoder::new();
        encoder.write_f32(1.5);
        encoder.write_f64(1.5);
        let data = encoder.finish();
        assert_eq!(&data[..4], &1.5f32.to_le_bytes());
        assert_eq!(&data[4..], &1.5f64.to_le_bytes());
    }

    #[test]
    fn test_write_string() {
        let mut encoder = WireEncoder::new();
        encoder.write_string("test");
        assert_eq!(
            encoder.finish(),
            vec![0x04, 0x00, b't', b'e', b's', b't']
        );
    }

    #[test]
    fn test_write_empty_string() {
        let mut encoder = WireEncoder::new();
        encoder.write_string("");
        assert_eq!(encoder.finish(), vec![0x00, 0x00]);
    }

    #[test]
    fn test_write_i32_slice_matches_element_writes() {
        let mut bulk = WireEncoder::new();
        bulk.write_i32_slice(&[1, -2, 3]);

        let mut looped = WireEncoder::new();
        for v in [1, -2, 3] {
            looped.write_i32(v);
        }

        assert_eq!(bulk.finish(), looped.finish());
    }

    #[test]
    fn test_write_f64_slice_matches_element_writes() {
        let values = [0.5f64, -1.25, 1e300];
        let mut bulk = WireEncoder::new();
        bulk.write_f64_slice(&values);

        let mut looped = WireEncoder::new();
        for v in values {
            looped.write_f64(v);
        }

        assert_eq!(bulk.finish(), looped.finish());
    }

    #[test]
    fn test_with_capacity_grows_beyond() {
        let mut encoder = WireEncoder::with_capacity(2);
        encoder.write_i64(7);
        assert_eq!(encoder.len(), 8);
    }

    #[test]
    fn test_presence_flags() {
        let mut encoder = WireEncoder::new();
        encoder.write_presence(false);
        encoder.write_presence(true);
        assert_eq!(encoder.finish(), vec![0x00, 0x01]);
    }
}
