// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Layer-level gating of an existing projection

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Layer, LayerConnection};
use crate::lookup::LookupTable;
use crate::neuron::Neuron;
use crate::types::{ConnId, NeuralError, NeuronId, Result};

/// How a gating layer's neurons are assigned to a projection's connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateType {
    /// Gater `i` gates every connection entering destination neuron `i`
    Input,
    /// Gater `i` gates every connection leaving source neuron `i`
    Output,
    /// Gater `i` gates the `i`-th connection of the projection
    OneToOne,
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateType::Input => "input",
            GateType::Output => "output",
            GateType::OneToOne => "one_to_one",
        };
        f.write_str(name)
    }
}

impl FromStr for GateType {
    type Err = NeuralError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "input" => Ok(GateType::Input),
            "output" => Ok(GateType::Output),
            "one_to_one" => Ok(GateType::OneToOne),
            _ => Err(NeuralError::UnknownGateType(s.to_string())),
        }
    }
}

impl TryFrom<u8> for GateType {
    type Error = NeuralError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(GateType::Input),
            1 => Ok(GateType::Output),
            2 => Ok(GateType::OneToOne),
            other => Err(NeuralError::UnknownGateType(other.to_string())),
        }
    }
}

impl Layer {
    /// Bind this layer's neurons as gaters of `conn`'s connections
    ///
    /// Sizes are checked before anything is bound, so a mismatch leaves
    /// every gater and gain untouched:
    ///
    /// | kind       | this layer's size must equal        |
    /// |------------|-------------------------------------|
    /// | `Input`    | destination layer size              |
    /// | `Output`   | source layer size                   |
    /// | `OneToOne` | number of connections in `conn`     |
    pub fn gate(&self, table: &mut LookupTable, conn: &LayerConnection, kind: GateType) -> Result<()> {
        table.check_table(self.table_id())?;
        table.check_table(conn.table_id())?;

        let expected = match kind {
            GateType::Input => conn.to().len(),
            GateType::Output => conn.from().len(),
            GateType::OneToOne => conn.len(),
        };
        if self.len() != expected {
            return Err(NeuralError::SizeMismatch {
                operation: "Layer::gate",
                expected,
                actual: self.len(),
            });
        }

        let bindings = self.gate_bindings(table, conn, kind)?;
        for &(gater, cid) in &bindings {
            Neuron::gate(table, gater, cid)?;
        }

        debug!(
            gaters = self.len(),
            bound = bindings.len(),
            kind = %kind,
            "gated layer connection"
        );
        Ok(())
    }

    fn gate_bindings(
        &self,
        table: &LookupTable,
        conn: &LayerConnection,
        kind: GateType,
    ) -> Result<Vec<(NeuronId, ConnId)>> {
        let bindings = match kind {
            GateType::OneToOne => self
                .neurons()
                .iter()
                .copied()
                .zip(conn.connections().iter().copied())
                .collect(),
            GateType::Input => {
                let mut bindings = Vec::new();
                for (&gater, &dest) in self.neurons().iter().zip(conn.to()) {
                    let neuron = table.get_neuron(dest).ok_or(NeuralError::NeuronNotFound(dest))?;
                    bindings.extend(
                        neuron
                            .inputs()
                            .iter()
                            .filter(|&&cid| conn.contains(cid))
                            .map(|&cid| (gater, cid)),
                    );
                }
                bindings
            }
            GateType::Output => {
                let mut bindings = Vec::new();
                for (&gater, &source) in self.neurons().iter().zip(conn.from()) {
                    let neuron = table
                        .get_neuron(source)
                        .ok_or(NeuralError::NeuronNotFound(source))?;
                    bindings.extend(
                        neuron
                            .projected()
                            .iter()
                            .filter(|&&cid| conn.contains(cid))
                            .map(|&cid| (gater, cid)),
                    );
                }
                bindings
            }
        };
        Ok(bindings)
    }
}
