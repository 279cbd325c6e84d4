// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Layers
//!
//! A layer is an ordered group of neurons that activate and propagate
//! together. Layers do not own neurons; they hold IDs into the lookup table
//! they were built against and refuse to run against any other table.
//!
//! The caller decides inter-layer order. Within a layer, activation runs
//! first-to-last and propagation runs last-to-first.

mod gating;
mod projection;

pub use gating::GateType;
pub use projection::{LayerConnection, LayerType};

use tracing::{debug, trace, warn};

use crate::lookup::LookupTable;
use crate::neuron::Neuron;
use crate::squash::Squash;
use crate::types::{NeuralError, NeuronId, Result, TableId};

/// Ordered group of neurons sharing one lookup table
#[derive(Debug, Clone)]
pub struct Layer {
    table: TableId,
    neurons: Vec<NeuronId>,
    connected_to: Vec<LayerConnection>,
}

impl Layer {
    /// Create `size` fresh neurons using the table's default squash
    pub fn new(table: &mut LookupTable, size: usize) -> Result<Self> {
        let squash = table.default_squash();
        Self::with_squash(table, size, squash)
    }

    pub fn with_squash(table: &mut LookupTable, size: usize, squash: Squash) -> Result<Self> {
        let neurons = (0..size)
            .map(|_| table.add_neuron(squash))
            .collect::<Result<Vec<_>>>()?;
        debug!(table = %table.id(), size, squash = %squash, "created layer");
        Ok(Self {
            table: table.id(),
            neurons,
            connected_to: Vec::new(),
        })
    }

    /// Group neurons already registered in `table`
    ///
    /// # Errors
    /// `NeuronNotFound` for the first ID that does not resolve.
    pub fn from_neurons(table: &LookupTable, neurons: Vec<NeuronId>) -> Result<Self> {
        if let Some(&missing) = neurons.iter().find(|&&id| table.get_neuron(id).is_none()) {
            return Err(NeuralError::NeuronNotFound(missing));
        }
        Ok(Self {
            table: table.id(),
            neurons,
            connected_to: Vec::new(),
        })
    }

    pub fn table_id(&self) -> TableId {
        self.table
    }

    pub fn neurons(&self) -> &[NeuronId] {
        &self.neurons
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Projections made from this layer, oldest first
    pub fn connected_to(&self) -> &[LayerConnection] {
        &self.connected_to
    }

    /// Activate every neuron in index order
    ///
    /// `inputs`, when non-empty, must hold one value per neuron and forces
    /// each activation. `None` or an empty slice computes activations from
    /// the weighted inputs instead.
    ///
    /// # Errors
    /// `SizeMismatch` before any neuron is touched if the lengths disagree.
    pub fn activate(&self, table: &mut LookupTable, inputs: Option<&[f64]>) -> Result<Vec<f64>> {
        table.check_table(self.table)?;
        let inputs = inputs.filter(|values| !values.is_empty());
        if let Some(values) = inputs {
            self.check_len("Layer::activate", values.len())?;
        }
        trace!(size = self.len(), forced = inputs.is_some(), "activating layer");

        let mut activations = Vec::with_capacity(self.neurons.len());
        for (i, &id) in self.neurons.iter().enumerate() {
            let input = inputs.map(|values| values[i]);
            activations.push(Neuron::activate(table, id, input)?);
        }
        Ok(activations)
    }

    /// Propagate error through every neuron, last neuron first
    ///
    /// With `target`, each neuron is treated as an output and its error is
    /// `target[i] - activation`.
    ///
    /// # Errors
    /// `SizeMismatch` before any neuron is touched if the target length is wrong.
    pub fn propagate(&self, table: &mut LookupTable, rate: f64, target: Option<&[f64]>) -> Result<()> {
        table.check_table(self.table)?;
        if let Some(values) = target {
            self.check_len("Layer::propagate", values.len())?;
        }
        trace!(size = self.len(), rate, supervised = target.is_some(), "propagating layer");

        for (i, &id) in self.neurons.iter().enumerate().rev() {
            Neuron::propagate(table, id, rate, target.map(|values| values[i]))?;
        }
        Ok(())
    }

    /// Project this layer onto `to` with initializer-drawn weights
    ///
    /// Returns `Ok(None)` without creating anything when every neuron here
    /// already connects to every neuron of `to`.
    pub fn project(
        &mut self,
        table: &mut LookupTable,
        to: &Layer,
        kind: LayerType,
    ) -> Result<Option<LayerConnection>> {
        self.project_with_weights(table, to, kind, None)
    }

    /// Project with explicit weights, one per member connection in member order
    pub fn project_with_weights(
        &mut self,
        table: &mut LookupTable,
        to: &Layer,
        kind: LayerType,
        weights: Option<&[f64]>,
    ) -> Result<Option<LayerConnection>> {
        if to.table != self.table {
            return Err(NeuralError::ForeignTable {
                expected: self.table,
                actual: to.table,
            });
        }
        self.project_onto(table, to.neurons.clone(), kind, weights)
    }

    /// Project this layer onto itself (recurrent projection)
    pub fn project_self(
        &mut self,
        table: &mut LookupTable,
        kind: LayerType,
        weights: Option<&[f64]>,
    ) -> Result<Option<LayerConnection>> {
        let own = self.neurons.clone();
        self.project_onto(table, own, kind, weights)
    }

    fn project_onto(
        &mut self,
        table: &mut LookupTable,
        to: Vec<NeuronId>,
        kind: LayerType,
        weights: Option<&[f64]>,
    ) -> Result<Option<LayerConnection>> {
        table.check_table(self.table)?;

        if saturated(table, &self.neurons, &to) {
            warn!(
                from = self.len(),
                to = to.len(),
                kind = %kind,
                "layers already fully connected, projection ignored"
            );
            return Ok(None);
        }

        let pairs = kind.pairs(&self.neurons, &to)?;
        if let Some(weights) = weights {
            if weights.len() != pairs.len() {
                return Err(NeuralError::SizeMismatch {
                    operation: "Layer::project weights",
                    expected: pairs.len(),
                    actual: weights.len(),
                });
            }
        }

        let mut members = Vec::with_capacity(pairs.len());
        for (i, (from, dest)) in pairs.into_iter().enumerate() {
            let weight = weights.map(|w| w[i]);
            members.push(Neuron::project(table, from, dest, weight)?);
        }

        debug!(
            from = self.len(),
            to = to.len(),
            kind = %kind,
            connections = members.len(),
            "projected layer"
        );

        let connection = LayerConnection::new(self.table, self.neurons.clone(), to, kind, members);
        self.connected_to.push(connection.clone());
        Ok(Some(connection))
    }

    /// Overwrite the bias of every neuron
    pub fn set_bias(&self, table: &mut LookupTable, bias: f64) -> Result<()> {
        table.check_table(self.table)?;
        for &id in &self.neurons {
            table
                .get_neuron_mut(id)
                .ok_or(NeuralError::NeuronNotFound(id))?
                .set_bias(bias);
        }
        Ok(())
    }

    /// Change the squash function of every neuron
    pub fn set_squash(&self, table: &mut LookupTable, squash: Squash) -> Result<()> {
        table.check_table(self.table)?;
        for &id in &self.neurons {
            table
                .get_neuron_mut(id)
                .ok_or(NeuralError::NeuronNotFound(id))?
                .set_squash(squash);
        }
        Ok(())
    }

    /// Current activations in neuron order; unresolved neurons read as 0
    pub fn activations(&self, table: &LookupTable) -> Vec<f64> {
        self.neurons
            .iter()
            .map(|&id| table.get_neuron(id).map_or(0.0, Neuron::activation))
            .collect()
    }

    /// True when every neuron here has a connection to every neuron of `target`
    ///
    /// Counts connected ordered pairs, so a partial projection (or one that
    /// skips pairs, like all-to-else) never counts as connected.
    pub fn is_connected(&self, table: &LookupTable, target: &Layer) -> bool {
        saturated(table, &self.neurons, &target.neurons)
    }

    fn check_len(&self, operation: &'static str, actual: usize) -> Result<()> {
        if actual != self.neurons.len() {
            return Err(NeuralError::SizeMismatch {
                operation,
                expected: self.neurons.len(),
                actual,
            });
        }
        Ok(())
    }
}

fn saturated(table: &LookupTable, from: &[NeuronId], to: &[NeuronId]) -> bool {
    let connected = from
        .iter()
        .flat_map(|&f| to.iter().map(move |&t| (f, t)))
        .filter(|&(f, t)| Neuron::connection_for_neuron(table, f, t).is_some())
        .count();
    connected == from.len() * to.len()
}
