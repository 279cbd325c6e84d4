// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neuron
//!
//! A neuron keeps its own scalars (bias, cached state and activation, last
//! error) and three ID lists into its lookup table:
//!
//! ```text
//! inputs     connections ending here       (summed on activate, trained on propagate)
//! projected  connections starting here     (carry error back on propagate)
//! gated      connections whose gain it sets
//! ```
//!
//! The algorithms are associated functions over `&mut LookupTable` because a
//! neuron has to read its neighbours while updating itself, and all of them
//! live in the same arena.
//!
//! ## Activation
//! ```text
//! state      = bias + Σ source.activation × weight × gain
//! activation = squash(state)
//! gain(c)    = activation            for every c this neuron gates
//! ```
//!
//! ## Propagation
//! ```text
//! error = target - activation                                   (output)
//! error = squash'(state) × ( Σ projected  to.error × weight × gain
//!                          + Σ gated      to.error × weight × from.activation )
//! weight(input) += rate × error × source.activation
//! bias          += rate × error
//! ```

use tracing::debug;

use crate::connection::Connection;
use crate::lookup::{
    connection_slot, connection_slot_mut, neuron_slot, neuron_slot_mut, LookupTable,
};
use crate::squash::Squash;
use crate::types::{ConnId, NeuralError, NeuronId, Result};

/// Computational unit stored in a [`LookupTable`]
#[derive(Debug, Clone)]
pub struct Neuron {
    pub(crate) id: NeuronId,
    pub(crate) bias: f64,
    pub(crate) squash: Squash,
    pub(crate) state: f64,
    pub(crate) activation: f64,
    pub(crate) derivative: f64,
    pub(crate) error: f64,
    pub(crate) inputs: Vec<ConnId>,
    pub(crate) projected: Vec<ConnId>,
    pub(crate) gated: Vec<ConnId>,
}

impl Neuron {
    /// Create an unregistered neuron; the lookup table assigns its ID
    pub fn new(bias: f64, squash: Squash) -> Self {
        Self {
            id: NeuronId(0),
            bias,
            squash,
            state: 0.0,
            activation: 0.0,
            derivative: 0.0,
            error: 0.0,
            inputs: Vec::new(),
            projected: Vec::new(),
            gated: Vec::new(),
        }
    }

    pub fn id(&self) -> NeuronId {
        self.id
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn squash(&self) -> Squash {
        self.squash
    }

    pub fn set_squash(&mut self, squash: Squash) {
        self.squash = squash;
    }

    /// Weighted input sum plus bias from the last activation
    pub fn state(&self) -> f64 {
        self.state
    }

    pub fn activation(&self) -> f64 {
        self.activation
    }

    /// Error term from the last propagate
    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn inputs(&self) -> &[ConnId] {
        &self.inputs
    }

    pub fn projected(&self) -> &[ConnId] {
        &self.projected
    }

    pub fn gated(&self) -> &[ConnId] {
        &self.gated
    }

    /// Activate neuron `id`
    ///
    /// With `input`, the activation is forced to that value and no weighted
    /// sum is computed. Input connections that no longer resolve contribute
    /// nothing. Every connection this neuron gates takes the new activation
    /// as its gain, as long as this neuron is still the bound gater.
    ///
    /// # Errors
    /// `NeuronNotFound` if `id` itself does not resolve.
    pub fn activate(table: &mut LookupTable, id: NeuronId, input: Option<f64>) -> Result<f64> {
        let LookupTable {
            neurons,
            connections,
            ..
        } = table;

        let neuron = neuron_slot(neurons, id).ok_or(NeuralError::NeuronNotFound(id))?;
        let (state, activation, derivative) = match input {
            Some(value) => (value, value, 0.0),
            None => {
                let mut state = neuron.bias;
                for &cid in &neuron.inputs {
                    let Some(conn) = connection_slot(connections, cid) else {
                        continue;
                    };
                    if let Some(source) = neuron_slot(neurons, conn.from) {
                        state += source.activation * conn.weight * conn.gain;
                    }
                }
                (state, neuron.squash.activate(state), neuron.squash.derivative(state))
            }
        };

        let neuron = neuron_slot_mut(neurons, id).ok_or(NeuralError::NeuronNotFound(id))?;
        neuron.state = state;
        neuron.activation = activation;
        neuron.derivative = derivative;

        for &cid in &neuron.gated {
            match connection_slot_mut(connections, cid) {
                Some(conn) if conn.gater == Some(id) => conn.gain = activation,
                _ => {}
            }
        }

        Ok(activation)
    }

    /// Back-propagate error into neuron `id` and train its incoming weights
    ///
    /// Neurons that feed each other must be propagated downstream-first:
    /// the hidden error reads the errors already stored on the neurons this
    /// one projects to and gates.
    pub fn propagate(
        table: &mut LookupTable,
        id: NeuronId,
        rate: f64,
        target: Option<f64>,
    ) -> Result<()> {
        let LookupTable {
            neurons,
            connections,
            ..
        } = table;

        let neuron = neuron_slot(neurons, id).ok_or(NeuralError::NeuronNotFound(id))?;
        let error = match target {
            Some(target) => target - neuron.activation,
            None => {
                let mut downstream = 0.0;
                for &cid in &neuron.projected {
                    let Some(conn) = connection_slot(connections, cid) else {
                        continue;
                    };
                    if let Some(to) = neuron_slot(neurons, conn.to) {
                        downstream += to.error * conn.weight * conn.gain;
                    }
                }
                for &cid in &neuron.gated {
                    let Some(conn) = connection_slot(connections, cid) else {
                        continue;
                    };
                    let to = neuron_slot(neurons, conn.to);
                    let from = neuron_slot(neurons, conn.from);
                    if let (Some(to), Some(from)) = (to, from) {
                        downstream += to.error * conn.weight * from.activation;
                    }
                }
                neuron.derivative * downstream
            }
        };

        for &cid in &neuron.inputs {
            let Some(conn) = connection_slot_mut(connections, cid) else {
                continue;
            };
            let Some(source) = neuron_slot(neurons, conn.from) else {
                continue;
            };
            let delta = rate * error * source.activation;
            conn.weight += delta;
            conn.last_delta = delta;
        }

        let neuron = neuron_slot_mut(neurons, id).ok_or(NeuralError::NeuronNotFound(id))?;
        neuron.error = error;
        neuron.bias += rate * error;
        Ok(())
    }

    /// Bind `gater` as the gater of `conn`
    ///
    /// A connection has at most one gater. Binding a new one unbinds the
    /// previous gater, which stops writing the gain. The gain itself changes
    /// on the new gater's next activation.
    pub fn gate(table: &mut LookupTable, gater: NeuronId, conn: ConnId) -> Result<()> {
        let LookupTable {
            neurons,
            connections,
            ..
        } = table;

        if neuron_slot(neurons, gater).is_none() {
            return Err(NeuralError::NeuronNotFound(gater));
        }
        let connection =
            connection_slot_mut(connections, conn).ok_or(NeuralError::ConnectionNotFound(conn))?;

        let previous = connection.gater.replace(gater);
        if previous == Some(gater) {
            return Ok(());
        }
        if let Some(previous) = previous {
            debug!(connection = %conn, from = %previous, to = %gater, "rebinding gater");
            if let Some(old) = neuron_slot_mut(neurons, previous) {
                old.gated.retain(|&c| c != conn);
            }
        }
        if let Some(neuron) = neuron_slot_mut(neurons, gater) {
            neuron.gated.push(conn);
        }
        Ok(())
    }

    /// Connection from `from` to `to`, if one exists
    pub fn connection_for_neuron(table: &LookupTable, from: NeuronId, to: NeuronId) -> Option<ConnId> {
        let neuron = table.get_neuron(from)?;
        neuron.projected.iter().copied().find(|&cid| {
            table
                .get_connection(cid)
                .is_some_and(|conn| conn.to == to)
        })
    }

    /// Connect `from` to `to` and register the connection
    ///
    /// Without an explicit weight one is drawn from the table's initializer.
    /// Self-connections are allowed.
    pub fn project(
        table: &mut LookupTable,
        from: NeuronId,
        to: NeuronId,
        weight: Option<f64>,
    ) -> Result<ConnId> {
        if table.get_neuron(from).is_none() {
            return Err(NeuralError::NeuronNotFound(from));
        }
        if table.get_neuron(to).is_none() {
            return Err(NeuralError::NeuronNotFound(to));
        }

        let weight = weight.unwrap_or_else(|| table.initializer_mut().weight());
        let cid = table.set_connection(Connection::new(from, to, weight))?;

        if let Some(source) = table.get_neuron_mut(from) {
            source.projected.push(cid);
        }
        if let Some(dest) = table.get_neuron_mut(to) {
            dest.inputs.push(cid);
        }
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initializer::Initializer;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn identity_table() -> LookupTable {
        LookupTable::with_initializer(Initializer::constant(0.5, 0.0))
    }

    #[test]
    fn test_forced_input() {
        let mut table = identity_table();
        let n = table.add_neuron(Squash::Logistic).unwrap();
        assert_eq!(Neuron::activate(&mut table, n, Some(0.7)).unwrap(), 0.7);
        assert_eq!(table.get_neuron(n).unwrap().activation(), 0.7);
    }

    #[test]
    fn test_weighted_sum() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        let c = table.add_neuron(Squash::Identity).unwrap();
        Neuron::project(&mut table, a, c, Some(0.5)).unwrap();
        Neuron::project(&mut table, b, c, Some(-2.0)).unwrap();
        table.get_neuron_mut(c).unwrap().set_bias(0.1);

        Neuron::activate(&mut table, a, Some(1.0)).unwrap();
        Neuron::activate(&mut table, b, Some(0.25)).unwrap();
        let out = Neuron::activate(&mut table, c, None).unwrap();
        assert!(close(out, 0.5 - 0.5 + 0.1));
    }

    #[test]
    fn test_unresolvable_input_contributes_nothing() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        Neuron::project(&mut table, a, b, Some(1.0)).unwrap();
        // Dangling connection ID pointing past the end of the arena
        table.get_neuron_mut(b).unwrap().inputs.push(ConnId(99));

        Neuron::activate(&mut table, a, Some(2.0)).unwrap();
        assert!(close(Neuron::activate(&mut table, b, None).unwrap(), 2.0));
    }

    #[test]
    fn test_missing_neuron_is_an_error() {
        let mut table = identity_table();
        assert_eq!(
            Neuron::activate(&mut table, NeuronId(4), None),
            Err(NeuralError::NeuronNotFound(NeuronId(4)))
        );
        assert!(Neuron::propagate(&mut table, NeuronId(4), 0.1, None).is_err());
    }

    #[test]
    fn test_gater_sets_gain() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        let g = table.add_neuron(Squash::Identity).unwrap();
        let conn = Neuron::project(&mut table, a, b, Some(1.0)).unwrap();

        Neuron::gate(&mut table, g, conn).unwrap();
        assert_eq!(table.get_connection(conn).unwrap().gain(), 1.0);

        Neuron::activate(&mut table, g, Some(0.3)).unwrap();
        assert!(close(table.get_connection(conn).unwrap().gain(), 0.3));

        Neuron::activate(&mut table, a, Some(2.0)).unwrap();
        assert!(close(Neuron::activate(&mut table, b, None).unwrap(), 0.6));
    }

    #[test]
    fn test_last_gater_wins() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        let g1 = table.add_neuron(Squash::Identity).unwrap();
        let g2 = table.add_neuron(Squash::Identity).unwrap();
        let conn = Neuron::project(&mut table, a, b, None).unwrap();

        Neuron::gate(&mut table, g1, conn).unwrap();
        Neuron::activate(&mut table, g1, Some(0.3)).unwrap();

        Neuron::gate(&mut table, g2, conn).unwrap();
        assert_eq!(table.get_connection(conn).unwrap().gater(), Some(g2));
        assert!(table.get_neuron(g1).unwrap().gated().is_empty());
        // Gain keeps the old value until the new gater fires
        assert!(close(table.get_connection(conn).unwrap().gain(), 0.3));

        Neuron::activate(&mut table, g2, Some(0.8)).unwrap();
        assert!(close(table.get_connection(conn).unwrap().gain(), 0.8));

        // The unbound gater no longer writes
        Neuron::activate(&mut table, g1, Some(0.1)).unwrap();
        assert!(close(table.get_connection(conn).unwrap().gain(), 0.8));
    }

    #[test]
    fn test_unbound_gater_with_stale_entry_does_not_write() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        let g1 = table.add_neuron(Squash::Identity).unwrap();
        let g2 = table.add_neuron(Squash::Identity).unwrap();
        let conn = Neuron::project(&mut table, a, b, None).unwrap();

        Neuron::gate(&mut table, g2, conn).unwrap();
        // g1 lists the connection without being its gater
        table.get_neuron_mut(g1).unwrap().gated.push(conn);

        Neuron::activate(&mut table, g2, Some(0.8)).unwrap();
        Neuron::activate(&mut table, g1, Some(0.1)).unwrap();
        let conn = table.get_connection(conn).unwrap();
        assert_eq!(conn.gater(), Some(g2));
        assert!(close(conn.gain(), 0.8));
    }

    #[test]
    fn test_gate_same_neuron_twice_is_idempotent() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let g = table.add_neuron(Squash::Identity).unwrap();
        let conn = Neuron::project(&mut table, a, a, None).unwrap();
        Neuron::gate(&mut table, g, conn).unwrap();
        Neuron::gate(&mut table, g, conn).unwrap();
        assert_eq!(table.get_neuron(g).unwrap().gated(), &[conn]);
    }

    #[test]
    fn test_gate_errors() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        assert_eq!(
            Neuron::gate(&mut table, a, ConnId(0)),
            Err(NeuralError::ConnectionNotFound(ConnId(0)))
        );
        let conn = Neuron::project(&mut table, a, a, None).unwrap();
        assert_eq!(
            Neuron::gate(&mut table, NeuronId(9), conn),
            Err(NeuralError::NeuronNotFound(NeuronId(9)))
        );
    }

    #[test]
    fn test_output_propagate_updates_weights_and_bias() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        let conn = Neuron::project(&mut table, a, b, Some(0.5)).unwrap();

        Neuron::activate(&mut table, a, Some(2.0)).unwrap();
        let out = Neuron::activate(&mut table, b, None).unwrap();
        assert!(close(out, 1.0));

        Neuron::propagate(&mut table, b, 0.1, Some(3.0)).unwrap();
        let error = 3.0 - 1.0;
        let conn = table.get_connection(conn).unwrap();
        assert!(close(conn.last_delta(), 0.1 * error * 2.0));
        assert!(close(conn.weight(), 0.5 + 0.4));
        let b = table.get_neuron(b).unwrap();
        assert!(close(b.error(), error));
        assert!(close(b.bias(), 0.2));
    }

    #[test]
    fn test_hidden_error_uses_downstream_error() {
        let mut table = identity_table();
        let i = table.add_neuron(Squash::Identity).unwrap();
        let h = table.add_neuron(Squash::Identity).unwrap();
        let o = table.add_neuron(Squash::Identity).unwrap();
        Neuron::project(&mut table, i, h, Some(1.0)).unwrap();
        Neuron::project(&mut table, h, o, Some(0.5)).unwrap();

        Neuron::activate(&mut table, i, Some(1.0)).unwrap();
        Neuron::activate(&mut table, h, None).unwrap();
        Neuron::activate(&mut table, o, None).unwrap();

        Neuron::propagate(&mut table, o, 0.0, Some(1.5)).unwrap();
        Neuron::propagate(&mut table, h, 0.0, None).unwrap();
        // rate 0 leaves weights alone: error_h = 1 × (1.0 × 0.5 × 1.0)
        assert!(close(table.get_neuron(h).unwrap().error(), 0.5));
    }

    #[test]
    fn test_gater_error_includes_gating_influence() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        let g = table.add_neuron(Squash::Identity).unwrap();
        let conn = Neuron::project(&mut table, a, b, Some(2.0)).unwrap();
        Neuron::project(&mut table, a, g, Some(1.0)).unwrap();
        Neuron::gate(&mut table, g, conn).unwrap();

        Neuron::activate(&mut table, a, Some(0.5)).unwrap();
        Neuron::activate(&mut table, g, None).unwrap();
        Neuron::activate(&mut table, b, None).unwrap();

        Neuron::propagate(&mut table, b, 0.0, Some(1.0)).unwrap();
        Neuron::propagate(&mut table, g, 0.0, None).unwrap();
        // b = 0.5 × 2 × 0.5 = 0.5, error_b = 0.5, error_g = 0.5 × 2 × 0.5
        assert!(close(table.get_neuron(g).unwrap().error(), 0.5));
    }

    #[test]
    fn test_forced_input_has_no_error() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        Neuron::project(&mut table, a, b, Some(1.0)).unwrap();
        Neuron::activate(&mut table, a, Some(1.0)).unwrap();
        Neuron::activate(&mut table, b, None).unwrap();
        Neuron::propagate(&mut table, b, 0.1, Some(0.0)).unwrap();

        let bias_before = table.get_neuron(a).unwrap().bias();
        Neuron::propagate(&mut table, a, 0.1, None).unwrap();
        assert_eq!(table.get_neuron(a).unwrap().error(), 0.0);
        assert_eq!(table.get_neuron(a).unwrap().bias(), bias_before);
    }

    #[test]
    fn test_connection_for_neuron() {
        let mut table = identity_table();
        let a = table.add_neuron(Squash::Identity).unwrap();
        let b = table.add_neuron(Squash::Identity).unwrap();
        let c = table.add_neuron(Squash::Identity).unwrap();
        let ab = Neuron::project(&mut table, a, b, None).unwrap();

        assert_eq!(Neuron::connection_for_neuron(&table, a, b), Some(ab));
        assert_eq!(Neuron::connection_for_neuron(&table, b, a), None);
        assert_eq!(Neuron::connection_for_neuron(&table, a, c), None);
        assert_eq!(Neuron::connection_for_neuron(&table, NeuronId(42), a), None);
    }

    #[test]
    fn test_self_connection_reads_previous_activation() {
        let mut table = identity_table();
        let n = table.add_neuron(Squash::Identity).unwrap();
        Neuron::project(&mut table, n, n, Some(0.5)).unwrap();

        Neuron::activate(&mut table, n, Some(4.0)).unwrap();
        assert!(close(Neuron::activate(&mut table, n, None).unwrap(), 2.0));
        assert!(close(Neuron::activate(&mut table, n, None).unwrap(), 1.0));
    }
}
