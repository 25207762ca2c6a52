// SPDX-FileCopyrightText: 2026 Fastwire Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod fixture;
mod generate;
mod schema;

pub use fixture::FixtureCmd;
pub use generate::GenerateCmd;
pub use schema::SchemaCmd;
