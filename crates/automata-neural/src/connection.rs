// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Weighted, gain-modulated edge between two neurons

use serde::{Deserialize, Serialize};

use crate::types::{ConnId, NeuronId};

/// A directed connection `from -> to`
///
/// The effective strength seen by the destination is `weight × gain`.
/// `gain` stays at 1.0 until a gater is bound; from then on it follows the
/// gater's most recent activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnId,
    pub(crate) from: NeuronId,
    pub(crate) to: NeuronId,
    pub(crate) weight: f64,
    pub(crate) gain: f64,
    pub(crate) gater: Option<NeuronId>,
    /// Weight change applied by the most recent propagate
    pub(crate) last_delta: f64,
}

impl Connection {
    /// Create an unregistered connection; the lookup table assigns its ID
    pub fn new(from: NeuronId, to: NeuronId, weight: f64) -> Self {
        Self {
            id: ConnId(0),
            from,
            to,
            weight,
            gain: 1.0,
            gater: None,
            last_delta: 0.0,
        }
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    pub fn from(&self) -> NeuronId {
        self.from
    }

    pub fn to(&self) -> NeuronId {
        self.to
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Overwrite the weight, e.g. when restoring trained values
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Neuron currently bound as this connection's gater
    pub fn gater(&self) -> Option<NeuronId> {
        self.gater
    }

    pub fn is_gated(&self) -> bool {
        self.gater.is_some()
    }

    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    /// `weight × gain`
    #[inline]
    pub fn effective_weight(&self) -> f64 {
        self.weight * self.gain
    }
}
