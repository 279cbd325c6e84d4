// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Squash Functions
//!
//! The nonlinearity a neuron applies to its weighted input sum.
//!
//! ```text
//! state      = Σ (source.activation × weight × gain) + bias
//! activation = f(state)
//! derivative = f'(state)      (cached for error propagation)
//! ```
//!
//! The built-in catalogue covers the usual choices. Anything else can be
//! plugged in with [`Squash::Custom`], which takes a pair of plain function
//! pointers so neurons stay `Copy`-cheap to configure.

use core::fmt;
use core::str::FromStr;

use crate::types::NeuralError;

/// Squash function applied by a neuron
#[derive(Debug, Clone, Copy, Default)]
pub enum Squash {
    /// 1 / (1 + e^-x)
    #[default]
    Logistic,
    Tanh,
    Identity,
    /// Heaviside step: 1 when x > 0, else 0
    HardLimit,
    Relu,
    /// User supplied pure functions
    Custom {
        name: &'static str,
        activate: fn(f64) -> f64,
        derivative: fn(f64) -> f64,
    },
}

impl Squash {
    /// Apply the function to a neuron state
    #[inline]
    pub fn activate(&self, x: f64) -> f64 {
        match self {
            Squash::Logistic => 1.0 / (1.0 + (-x).exp()),
            Squash::Tanh => x.tanh(),
            Squash::Identity => x,
            Squash::HardLimit => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Squash::Relu => x.max(0.0),
            Squash::Custom { activate, .. } => activate(x),
        }
    }

    /// Derivative with respect to the state, evaluated at `x`
    #[inline]
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Squash::Logistic => {
                let fx = self.activate(x);
                fx * (1.0 - fx)
            }
            Squash::Tanh => 1.0 - x.tanh().powi(2),
            Squash::Identity => 1.0,
            // step has no usable gradient; error passes through
            Squash::HardLimit => 1.0,
            Squash::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Squash::Custom { derivative, .. } => derivative(x),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Squash::Logistic => "logistic",
            Squash::Tanh => "tanh",
            Squash::Identity => "identity",
            Squash::HardLimit => "hlim",
            Squash::Relu => "relu",
            Squash::Custom { name, .. } => name,
        }
    }
}

impl fmt::Display for Squash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Squash {
    type Err = NeuralError;

    /// Parse a built-in squash by name (case-insensitive)
    ///
    /// Accepts exactly the names in `automata_config::KNOWN_SQUASHES`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" => Ok(Squash::Logistic),
            "tanh" => Ok(Squash::Tanh),
            "identity" => Ok(Squash::Identity),
            "hlim" => Ok(Squash::HardLimit),
            "relu" => Ok(Squash::Relu),
            _ => Err(NeuralError::UnknownSquash(s.to_string())),
        }
    }
}
