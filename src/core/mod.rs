// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout fastwire.
//!
//! This module provides the foundational types for the library:
//! - [`SchemaError`], [`WireError`], [`FixtureError`], [`GenerateError`] -
//!   structured errors with stable codes
//! - [`Value`] - unified dynamic value representation
//! - [`Primitive`] - the closed set of wire-legal primitives

pub mod error;
pub mod value;

pub use error::{ExpectedKind, FixtureError, GenerateError, SchemaError, WireError};
pub use value::{FieldMap, Primitive, Value, LENGTH_PREFIX_SIZE, MAX_LENGTH};
