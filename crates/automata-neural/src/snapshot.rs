// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network snapshot types
//!
//! A snapshot is a serializable, slot-for-slot copy of a lookup table.
//! Padded slots are kept as `None` so IDs stay valid after a restore.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::initializer::Initializer;
use crate::lookup::LookupTable;
use crate::neuron::Neuron;
use crate::squash::Squash;
use crate::types::{ConnId, NeuralError, NeuronId, Result};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable state of one neuron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronRecord {
    pub id: NeuronId,
    pub bias: f64,
    /// Squash name as accepted by `Squash::from_str`
    pub squash: String,
    pub state: f64,
    pub activation: f64,
    pub derivative: f64,
    pub error: f64,
    pub inputs: Vec<ConnId>,
    pub projected: Vec<ConnId>,
    pub gated: Vec<ConnId>,
}

impl From<&Neuron> for NeuronRecord {
    fn from(neuron: &Neuron) -> Self {
        Self {
            id: neuron.id,
            bias: neuron.bias,
            squash: neuron.squash.name().to_string(),
            state: neuron.state,
            activation: neuron.activation,
            derivative: neuron.derivative,
            error: neuron.error,
            inputs: neuron.inputs.clone(),
            projected: neuron.projected.clone(),
            gated: neuron.gated.clone(),
        }
    }
}

impl NeuronRecord {
    fn to_neuron(&self) -> Result<Neuron> {
        let squash = self.squash.parse::<Squash>()?;
        let mut neuron = Neuron::new(self.bias, squash);
        neuron.id = self.id;
        neuron.state = self.state;
        neuron.activation = self.activation;
        neuron.derivative = self.derivative;
        neuron.error = self.error;
        neuron.inputs = self.inputs.clone();
        neuron.projected = self.projected.clone();
        neuron.gated = self.gated.clone();
        Ok(neuron)
    }
}

/// Complete network snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Format version (for backward compatibility)
    pub version: u32,
    pub neurons: Vec<Option<NeuronRecord>>,
    pub connections: Vec<Option<Connection>>,
}

impl NetworkSnapshot {
    pub fn capture(table: &LookupTable) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            neurons: table
                .neurons
                .iter()
                .map(|slot| slot.as_ref().map(NeuronRecord::from))
                .collect(),
            connections: table.connections.clone(),
        }
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        let stats = self.statistics();
        format!(
            "Network v{}: {} neurons, {} connections ({} gated), {} empty slots",
            self.version,
            stats.neuron_count,
            stats.connection_count,
            stats.gated_connection_count,
            stats.empty_slots
        )
    }

    /// Check that every stored ID resolves inside the snapshot
    ///
    /// # Errors
    /// `NeuronNotFound` / `ConnectionNotFound` naming the first dangling ID,
    /// or `GaterMismatch` when a connection's gater and that neuron's gated
    /// list disagree.
    pub fn validate(&self) -> Result<()> {
        let neuron_exists = |id: NeuronId| matches!(self.neurons.get(id.index()), Some(Some(_)));
        let connection_exists =
            |id: ConnId| matches!(self.connections.get(id.index()), Some(Some(_)));

        for conn in self.connections.iter().flatten() {
            for endpoint in [conn.from, conn.to].into_iter().chain(conn.gater) {
                if !neuron_exists(endpoint) {
                    return Err(NeuralError::NeuronNotFound(endpoint));
                }
            }
        }

        for record in self.neurons.iter().flatten() {
            let lists = [&record.inputs, &record.projected, &record.gated];
            if let Some(&missing) = lists
                .into_iter()
                .flatten()
                .find(|&&cid| !connection_exists(cid))
            {
                return Err(NeuralError::ConnectionNotFound(missing));
            }
        }

        // gater and gated lists must agree in both directions
        for record in self.neurons.iter().flatten() {
            for &cid in &record.gated {
                let bound = self.connections[cid.index()].as_ref().and_then(|c| c.gater);
                if bound != Some(record.id) {
                    return Err(NeuralError::GaterMismatch {
                        connection: cid,
                        gater: record.id,
                    });
                }
            }
        }
        for conn in self.connections.iter().flatten() {
            let Some(gater) = conn.gater else {
                continue;
            };
            let listed = self.neurons[gater.index()]
                .as_ref()
                .is_some_and(|record| record.gated.contains(&conn.id));
            if !listed {
                return Err(NeuralError::GaterMismatch {
                    connection: conn.id,
                    gater,
                });
            }
        }
        Ok(())
    }

    pub fn statistics(&self) -> NetworkStatistics {
        NetworkStatistics::from_slots(
            self.neurons.iter().map(Option::is_some),
            self.connections.iter().map(Option::as_ref),
        )
    }

    /// Rebuild a lookup table with the same IDs and state
    ///
    /// The restored table gets a fresh table ID, so layers built against the
    /// original table must be rebuilt with `Layer::from_neurons`.
    ///
    /// # Errors
    /// Fails validation, or `UnknownSquash` for a custom squash that cannot
    /// be resolved by name.
    pub fn restore(&self, initializer: Initializer) -> Result<LookupTable> {
        self.validate()?;
        let mut table = LookupTable::with_initializer(initializer);
        table.neurons = self
            .neurons
            .iter()
            .map(|slot| slot.as_ref().map(NeuronRecord::to_neuron).transpose())
            .collect::<Result<_>>()?;
        table.connections = self.connections.clone();
        Ok(table)
    }
}

/// Aggregate counts over a network
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkStatistics {
    pub neuron_count: usize,
    pub connection_count: usize,
    pub gated_connection_count: usize,
    /// Padded neuron and connection slots
    pub empty_slots: usize,
    pub mean_weight: f64,
}

impl NetworkStatistics {
    pub fn collect(table: &LookupTable) -> Self {
        Self::from_slots(
            table.neurons.iter().map(Option::is_some),
            table.connections.iter().map(Option::as_ref),
        )
    }

    fn from_slots<'a>(
        neurons: impl Iterator<Item = bool>,
        connections: impl Iterator<Item = Option<&'a Connection>>,
    ) -> Self {
        let mut stats = Self::default();
        for occupied in neurons {
            if occupied {
                stats.neuron_count += 1;
            } else {
                stats.empty_slots += 1;
            }
        }

        let mut total_weight = 0.0;
        for slot in connections {
            let Some(conn) = slot else {
                stats.empty_slots += 1;
                continue;
            };
            stats.connection_count += 1;
            total_weight += conn.weight;
            if conn.is_gated() {
                stats.gated_connection_count += 1;
            }
        }
        if stats.connection_count > 0 {
            stats.mean_weight = total_weight / stats.connection_count as f64;
        }
        stats
    }
}

impl fmt::Display for NetworkStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Neurons: {}, Connections: {} ({} gated), Empty slots: {}, Mean weight: {:.3}",
            self.neuron_count,
            self.connection_count,
            self.gated_connection_count,
            self.empty_slots,
            self.mean_weight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_network() -> LookupTable {
        let mut table = LookupTable::with_initializer(Initializer::constant(0.5, 0.0));
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Tanh).unwrap();
        let g = table.add_neuron(Squash::Logistic).unwrap();
        let conn = Neuron::project(&mut table, a, b, Some(1.5)).unwrap();
        Neuron::project(&mut table, b, a, Some(0.5)).unwrap();
        Neuron::gate(&mut table, g, conn).unwrap();
        table
    }

    #[test]
    fn test_statistics() {
        let mut table = small_network();
        table.set_neuron_with_id(NeuronId(5), Neuron::new(0.0, Squash::Identity));

        let stats = table.statistics();
        assert_eq!(stats.neuron_count, 4);
        assert_eq!(stats.connection_count, 2);
        assert_eq!(stats.gated_connection_count, 1);
        assert_eq!(stats.empty_slots, 2);
        assert!((stats.mean_weight - 1.0).abs() < 1e-12);
        assert_eq!(
            stats.to_string(),
            "Neurons: 4, Connections: 2 (1 gated), Empty slots: 2, Mean weight: 1.000"
        );
    }

    #[test]
    fn test_empty_statistics() {
        let stats = LookupTable::new().statistics();
        assert_eq!(stats, NetworkStatistics::default());
    }

    #[test]
    fn test_snapshot_keeps_padding() {
        let mut table = small_network();
        table.set_connection_with_id(ConnId(4), Connection::new(NeuronId(0), NeuronId(1), 0.0));

        let snapshot = table.snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.neurons.len(), 3);
        assert_eq!(snapshot.connections.len(), 5);
        assert!(snapshot.connections[2].is_none());
        assert_eq!(snapshot.neurons[1].as_ref().unwrap().squash, "tanh");
        assert_eq!(snapshot.statistics(), table.statistics());
    }

    #[test]
    fn test_validate_detects_dangling_ids() {
        let table = small_network();
        let mut snapshot = table.snapshot();
        assert!(snapshot.validate().is_ok());

        snapshot.neurons[2] = None;
        assert_eq!(snapshot.validate(), Err(NeuralError::NeuronNotFound(NeuronId(2))));

        let mut snapshot = table.snapshot();
        snapshot.neurons[0].as_mut().unwrap().gated.push(ConnId(9));
        assert_eq!(snapshot.validate(), Err(NeuralError::ConnectionNotFound(ConnId(9))));
    }

    #[test]
    fn test_validate_rejects_stale_gated_entry() {
        let mut table = small_network();
        let g2 = table.add_neuron(Squash::Identity).unwrap();
        Neuron::gate(&mut table, g2, ConnId(0)).unwrap();

        let mut snapshot = table.snapshot();
        assert!(snapshot.validate().is_ok());

        // old gater still lists the connection after the rebind
        snapshot.neurons[2].as_mut().unwrap().gated.push(ConnId(0));
        assert_eq!(
            snapshot.validate(),
            Err(NeuralError::GaterMismatch {
                connection: ConnId(0),
                gater: NeuronId(2)
            })
        );
        assert!(snapshot.restore(Initializer::default()).is_err());
    }

    #[test]
    fn test_validate_rejects_unlisted_gater() {
        let mut snapshot = small_network().snapshot();
        snapshot.neurons[2].as_mut().unwrap().gated.clear();
        assert_eq!(
            snapshot.validate(),
            Err(NeuralError::GaterMismatch {
                connection: ConnId(0),
                gater: NeuronId(2)
            })
        );
    }

    #[test]
    fn test_restore_preserves_ids_and_state() {
        let mut table = small_network();
        Neuron::activate(&mut table, NeuronId(2), Some(0.25)).unwrap();
        let snapshot = table.snapshot();

        let restored = snapshot.restore(Initializer::constant(0.0, 0.0)).unwrap();
        assert_ne!(restored.id(), table.id());
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.get_connection(ConnId(0)).unwrap().gain(), 0.25);
    }

    #[test]
    fn test_summary() {
        let summary = small_network().snapshot().summary();
        assert_eq!(summary, "Network v1: 3 neurons, 2 connections (1 gated), 0 empty slots");
    }
}
