// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for engine operations

use super::ids::{ConnId, NeuronId, TableId};

/// Error types for engine operations
///
/// Lookup misses while summing inputs or writing gains are not errors; they
/// contribute nothing. Only IDs that an operation was explicitly asked to
/// act on produce `NeuronNotFound` / `ConnectionNotFound`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    #[error("{operation}: size mismatch, expected {expected}, got {actual}")]
    SizeMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown gate type: {0}")]
    UnknownGateType(String),

    #[error("Unknown layer type: {0}")]
    UnknownLayerType(String),

    #[error("Unknown squash function: {0}")]
    UnknownSquash(String),

    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(ConnId),

    #[error("Built against {expected} but used with {actual}")]
    ForeignTable { expected: TableId, actual: TableId },

    #[error("Lookup table full: no {kind} IDs left")]
    CapacityExceeded { kind: &'static str },

    #[error("{connection} is not gated by {gater}")]
    GaterMismatch { connection: ConnId, gater: NeuronId },

    #[error("Invalid initializer: {0}")]
    InvalidInitializer(String),
}

pub type Result<T> = core::result::Result<T, NeuralError>;
pub type Error = NeuralError;
