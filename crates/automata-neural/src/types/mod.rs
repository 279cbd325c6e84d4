// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Core Types
//!
//! Identifiers and errors shared by every engine module.

pub mod error;
pub mod ids;

pub use error::{Error, NeuralError, Result};
pub use ids::{ConnId, NeuronId, TableId};
