// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Automata
//!
//! Neuron-granular neural network engine. Networks are graphs of individual
//! neurons and weighted, gain-modulated connections, grouped into layers that
//! activate and train together. Gating lets one neuron's activation scale a
//! connection elsewhere in the graph, which is what LSTM-style memory cells
//! are built from.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! automata = "0.1"
//! ```
//!
//! ```rust
//! use automata::prelude::*;
//!
//! let mut table = LookupTable::with_initializer(Initializer::seeded(7));
//! let mut input = Layer::new(&mut table, 2)?;
//! let hidden = Layer::new(&mut table, 3)?;
//! let gates = Layer::new(&mut table, 3)?;
//!
//! let connection = input
//!     .project(&mut table, &hidden, LayerType::AllToAll)?
//!     .expect("fresh layers are never already connected");
//! gates.gate(&mut table, &connection, GateType::Input)?;
//!
//! input.activate(&mut table, Some(&[1.0, 0.0]))?;
//! gates.activate(&mut table, None)?;
//! let out = hidden.activate(&mut table, None)?;
//! assert_eq!(out.len(), 3);
//! # Ok::<(), automata::neural::NeuralError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: automata-config                            │
//! │  (TOML config, env + CLI overrides, validation)         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Engine: automata-neural                                │
//! │  (LookupTable, Neuron, Connection, Layer, gating)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: automata-observability                 │
//! │  (tracing subscriber, per-crate debug flags)            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

pub use automata_config as config;
pub use automata_neural as neural;
pub use automata_observability as observability;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use automata_config::{AutomataConfig, LogFormat};
    pub use automata_neural::{
        ConnId, Connection, GateType, Initializer, Layer, LayerConnection, LayerType, LookupTable,
        NetworkSnapshot, NetworkStatistics, NeuralError, Neuron, NeuronId, Squash,
    };
    pub use automata_observability::CrateDebugFlags;
}

/// Build an empty lookup table from the `[initializer]` and `[neuron]` sections
pub fn lookup_table_from_config(
    config: &automata_config::AutomataConfig,
) -> anyhow::Result<automata_neural::LookupTable> {
    automata_neural::LookupTable::from_config(config)
        .context("Failed to build lookup table from configuration")
}

/// Load configuration, install logging and return an empty lookup table
///
/// `args` are the process arguments, scanned for `--debug-<crate>` flags;
/// crates listed in `AUTOMATA_DEBUG` are added to them.
/// Fails if a global tracing subscriber is already installed.
pub fn bootstrap<I>(
    config_path: Option<&Path>,
    cli_overrides: Option<&HashMap<String, String>>,
    args: I,
) -> anyhow::Result<(automata_config::AutomataConfig, automata_neural::LookupTable)>
where
    I: IntoIterator<Item = String>,
{
    let config = automata_config::load_config(config_path, cli_overrides)
        .context("Failed to load configuration")?;
    let debug_flags = automata_observability::CrateDebugFlags::from_args_and_env(args);
    automata_observability::init_logging(&config.logging, &debug_flags)?;

    let table = lookup_table_from_config(&config)?;
    tracing::info!(
        table = %table.id(),
        squash = %table.default_squash(),
        learning_rate = config.training.learning_rate,
        "automata engine ready"
    );
    Ok((config, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let _neuron_id = NeuronId(0);
        let _kind = LayerType::AllToElse;
    }

    #[test]
    fn test_lookup_table_from_config() {
        let mut config = automata_config::AutomataConfig::default();
        config.neuron.squash = "relu".to_string();
        let table = lookup_table_from_config(&config).unwrap();
        assert_eq!(table.default_squash().name(), "relu");
    }

    #[test]
    fn test_lookup_table_from_config_reports_bad_squash() {
        let mut config = automata_config::AutomataConfig::default();
        config.neuron.squash = "bogus".to_string();
        let err = lookup_table_from_config(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("bogus"));
    }
}
