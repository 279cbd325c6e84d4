// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Lookup Table
//!
//! Dense, append-only arena owning every neuron and connection of one network.
//!
//! Neurons reference their neighbours and connections by ID rather than by
//! pointer or hash key. IDs are direct indices, so resolving one is a bounds
//! check and a slot read. Topologies rarely change once built, which keeps
//! the vectors from resizing during activation.
//!
//! There is no process-wide table: each network constructs its own and hands
//! it to every layer and neuron operation, keeping ID spaces isolated.
//!
//! ```text
//! neurons:     [ Some(n0) | Some(n1) | None | Some(n3) ]   <- slot 2 padded by set_neuron_with_id
//! connections: [ Some(c0) | Some(c1) | ... ]
//! ```

use automata_config::AutomataConfig;
use tracing::warn;

use crate::connection::Connection;
use crate::initializer::Initializer;
use crate::neuron::Neuron;
use crate::snapshot::{NetworkSnapshot, NetworkStatistics};
use crate::squash::Squash;
use crate::types::{ConnId, NeuralError, NeuronId, Result, TableId};

/// Arena of neurons and connections for a single network
#[derive(Debug, Clone)]
pub struct LookupTable {
    id: TableId,
    pub(crate) neurons: Vec<Option<Neuron>>,
    pub(crate) connections: Vec<Option<Connection>>,
    initializer: Initializer,
    default_squash: Squash,
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupTable {
    /// Create an empty table with an entropy-seeded initializer
    pub fn new() -> Self {
        Self::with_initializer(Initializer::default())
    }

    pub fn with_initializer(initializer: Initializer) -> Self {
        Self {
            id: TableId::next(),
            neurons: Vec::new(),
            connections: Vec::new(),
            initializer,
            default_squash: Squash::default(),
        }
    }

    /// Build an empty table from the `[initializer]` and `[neuron]` sections
    pub fn from_config(config: &AutomataConfig) -> Result<Self> {
        let initializer = Initializer::from_config(&config.initializer)?;
        let squash = config.neuron.squash.parse::<Squash>()?;
        Ok(Self::with_initializer(initializer).with_default_squash(squash))
    }

    /// Squash given to neurons created without an explicit one
    pub fn with_default_squash(mut self, squash: Squash) -> Self {
        self.default_squash = squash;
        self
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn default_squash(&self) -> Squash {
        self.default_squash
    }

    pub fn initializer_mut(&mut self) -> &mut Initializer {
        &mut self.initializer
    }

    // ----- neurons -----

    /// Append a neuron and return its new ID
    ///
    /// # Errors
    /// `CapacityExceeded` once every `u32` neuron ID has been issued.
    pub fn set_neuron(&mut self, mut neuron: Neuron) -> Result<NeuronId> {
        let id = NeuronId(next_index(self.neurons.len(), "neuron")?);
        neuron.id = id;
        self.neurons.push(Some(neuron));
        Ok(id)
    }

    /// Store a neuron at a caller-chosen ID
    ///
    /// Slots between the current end and `id` are padded with empty
    /// placeholders that resolve as "not found" until assigned.
    pub fn set_neuron_with_id(&mut self, id: NeuronId, mut neuron: Neuron) {
        let index = id.index();
        if index >= self.neurons.len() {
            self.neurons.resize_with(index + 1, || None);
        } else if self.neurons[index].is_some() {
            warn!(neuron = %id, "replacing an occupied neuron slot");
        }
        neuron.id = id;
        self.neurons[index] = Some(neuron);
    }

    pub fn get_neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_neuron_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        self.neurons.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Create and register a neuron with a sampled bias
    pub fn add_neuron(&mut self, squash: Squash) -> Result<NeuronId> {
        let bias = self.initializer.bias();
        self.set_neuron(Neuron::new(bias, squash))
    }

    /// Number of neuron slots, padded ones included
    pub fn neuron_slots(&self) -> usize {
        self.neurons.len()
    }

    /// Assigned neurons in ID order
    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.neurons.iter().flatten()
    }

    // ----- connections -----

    /// Append a connection and return its new ID
    ///
    /// # Errors
    /// `CapacityExceeded` once every `u32` connection ID has been issued.
    pub fn set_connection(&mut self, mut conn: Connection) -> Result<ConnId> {
        let id = ConnId(next_index(self.connections.len(), "connection")?);
        conn.id = id;
        self.connections.push(Some(conn));
        Ok(id)
    }

    /// Store a connection at a caller-chosen ID, padding as needed
    pub fn set_connection_with_id(&mut self, id: ConnId, mut conn: Connection) {
        let index = id.index();
        if index >= self.connections.len() {
            self.connections.resize_with(index + 1, || None);
        } else if self.connections[index].is_some() {
            warn!(connection = %id, "replacing an occupied connection slot");
        }
        conn.id = id;
        self.connections[index] = Some(conn);
    }

    pub fn get_connection(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_connection_mut(&mut self, id: ConnId) -> Option<&mut Connection> {
        self.connections.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of connection slots, padded ones included
    pub fn connection_slots(&self) -> usize {
        self.connections.len()
    }

    /// Assigned connections in ID order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().flatten()
    }

    // ----- introspection -----

    /// Serializable copy of every slot
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::capture(self)
    }

    pub fn statistics(&self) -> NetworkStatistics {
        NetworkStatistics::collect(self)
    }

    pub(crate) fn check_table(&self, expected: TableId) -> Result<()> {
        if self.id != expected {
            return Err(NeuralError::ForeignTable {
                expected,
                actual: self.id,
            });
        }
        Ok(())
    }
}

fn next_index(len: usize, kind: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| NeuralError::CapacityExceeded { kind })
}

pub(crate) fn neuron_slot(neurons: &[Option<Neuron>], id: NeuronId) -> Option<&Neuron> {
    neurons.get(id.index()).and_then(Option::as_ref)
}

pub(crate) fn neuron_slot_mut(neurons: &mut [Option<Neuron>], id: NeuronId) -> Option<&mut Neuron> {
    neurons.get_mut(id.index()).and_then(Option::as_mut)
}

pub(crate) fn connection_slot(connections: &[Option<Connection>], id: ConnId) -> Option<&Connection> {
    connections.get(id.index()).and_then(Option::as_ref)
}

pub(crate) fn connection_slot_mut(
    connections: &mut [Option<Connection>],
    id: ConnId,
) -> Option<&mut Connection> {
    connections.get_mut(id.index()).and_then(Option::as_mut)
}
