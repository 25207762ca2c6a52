// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reference implementation of the wire format.
//!
//! The format is fixed little-endian with no self-description: no type tags,
//! no field indices, no versioning. Strings and arrays carry a uint16 length
//! prefix; optionals carry a one-byte presence flag; struct fields are
//! concatenated in declaration order with no padding. Encoder and decoder
//! must come from the same schema.
//!
//! - [`WireEncoder`] - growable little-endian buffer writer
//! - [`WireCursor`] - bounds-checked reader
//! - [`MessageCodec`] - schema-driven encode/decode over [`crate::Value`]
//!   trees; the byte stream every generated backend must match

pub mod codec;
pub mod cursor;
pub mod encoder;

pub use codec::{CodecError, MessageCodec};
pub use cursor::WireCursor;
pub use encoder::WireEncoder;
