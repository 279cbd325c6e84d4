// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Layer-to-layer projections

use ahash::AHashSet;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::types::{ConnId, NeuralError, NeuronId, TableId};

/// Topology used when one layer projects onto another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    /// Every source neuron to every destination neuron
    AllToAll,
    /// Source neuron `i` to destination neuron `i`; sizes must match
    OneToOne,
    /// Every source neuron to every destination neuron except itself
    AllToElse,
}

impl LayerType {
    /// (from, to) neuron pairs this topology connects, in member order
    pub(crate) fn pairs(
        self,
        from: &[NeuronId],
        to: &[NeuronId],
    ) -> Result<Vec<(NeuronId, NeuronId)>, NeuralError> {
        let pairs = match self {
            LayerType::AllToAll => from
                .iter()
                .flat_map(move |&f| to.iter().map(move |&t| (f, t)))
                .collect(),
            LayerType::AllToElse => from
                .iter()
                .flat_map(move |&f| to.iter().filter(move |&&t| t != f).map(move |&t| (f, t)))
                .collect(),
            LayerType::OneToOne => {
                if from.len() != to.len() {
                    return Err(NeuralError::SizeMismatch {
                        operation: "one-to-one projection",
                        expected: from.len(),
                        actual: to.len(),
                    });
                }
                from.iter().copied().zip(to.iter().copied()).collect()
            }
        };
        Ok(pairs)
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerType::AllToAll => "all_to_all",
            LayerType::OneToOne => "one_to_one",
            LayerType::AllToElse => "all_to_else",
        };
        f.write_str(name)
    }
}

impl FromStr for LayerType {
    type Err = NeuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "all_to_all" => Ok(LayerType::AllToAll),
            "one_to_one" => Ok(LayerType::OneToOne),
            "all_to_else" => Ok(LayerType::AllToElse),
            _ => Err(NeuralError::UnknownLayerType(s.to_string())),
        }
    }
}

impl TryFrom<u8> for LayerType {
    type Error = NeuralError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LayerType::AllToAll),
            1 => Ok(LayerType::OneToOne),
            2 => Ok(LayerType::AllToElse),
            other => Err(NeuralError::UnknownLayerType(other.to_string())),
        }
    }
}

/// The connections created by one `Layer::project` call
///
/// Member order follows the topology: for all-to-all it is source-major
/// (`from[0]->to[0], from[0]->to[1], ...`). The member set backs the
/// membership tests done while gating.
#[derive(Debug, Clone)]
pub struct LayerConnection {
    table: TableId,
    from: Vec<NeuronId>,
    to: Vec<NeuronId>,
    kind: LayerType,
    connections: Vec<ConnId>,
    members: AHashSet<ConnId>,
}

impl LayerConnection {
    pub(crate) fn new(
        table: TableId,
        from: Vec<NeuronId>,
        to: Vec<NeuronId>,
        kind: LayerType,
        connections: Vec<ConnId>,
    ) -> Self {
        let members = connections.iter().copied().collect();
        Self {
            table,
            from,
            to,
            kind,
            connections,
            members,
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table
    }

    /// Source layer neurons
    pub fn from(&self) -> &[NeuronId] {
        &self.from
    }

    /// Destination layer neurons
    pub fn to(&self) -> &[NeuronId] {
        &self.to
    }

    pub fn kind(&self) -> LayerType {
        self.kind
    }

    pub fn connections(&self) -> &[ConnId] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    #[inline]
    pub fn contains(&self, conn: ConnId) -> bool {
        self.members.contains(&conn)
    }
}
