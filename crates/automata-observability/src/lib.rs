// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # automata-observability
//!
//! Logging setup shared by every automata crate.
//!
//! The engine crates only emit `tracing` events; this crate decides where they
//! go. Per-crate debug output is switched on with `--debug-<crate>` flags or
//! the `AUTOMATA_DEBUG` environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known automata crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "automata",
    "automata-neural",
    "automata-config",
    "automata-observability",
];
