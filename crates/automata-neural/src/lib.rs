// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Automata Neural Engine
//!
//! Neuron-granular graph engine for trainable, gated networks:
//! - **Lookup table**: arena owning every neuron and connection, addressed by ID
//! - **Neuron**: activation, back-propagation and gating over the arena
//! - **Layer**: ordered neuron groups with projection topologies and layer gating
//! - **Snapshot**: serializable copies and statistics of a whole network
//!
//! ```
//! use automata_neural::{Initializer, Layer, LayerType, LookupTable, Squash};
//!
//! let mut table = LookupTable::with_initializer(Initializer::constant(0.5, 0.0))
//!     .with_default_squash(Squash::Identity);
//! let mut input = Layer::new(&mut table, 2)?;
//! let output = Layer::new(&mut table, 1)?;
//! input.project(&mut table, &output, LayerType::AllToAll)?;
//!
//! input.activate(&mut table, Some(&[1.0, 1.0]))?;
//! assert_eq!(output.activate(&mut table, None)?, vec![1.0]);
//! # Ok::<(), automata_neural::NeuralError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod connection;
pub mod initializer;
pub mod layer;
pub mod lookup;
pub mod neuron;
pub mod snapshot;
pub mod squash;

pub use connection::Connection;
pub use initializer::Initializer;
pub use layer::{GateType, Layer, LayerConnection, LayerType};
pub use lookup::LookupTable;
pub use neuron::Neuron;
pub use snapshot::{NetworkSnapshot, NetworkStatistics, NeuronRecord, SNAPSHOT_VERSION};
pub use squash::Squash;
pub use types::{ConnId, Error, NeuralError, NeuronId, Result, TableId};
