// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `automata.toml`.

use serde::{Deserialize, Serialize};

/// Squash names accepted by `[neuron] squash`
pub const KNOWN_SQUASHES: &[&str] = &["logistic", "tanh", "identity", "relu", "hlim"];

/// Log levels accepted by `[logging] level`
pub const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AutomataConfig {
    pub initializer: InitializerConfig,
    pub training: TrainingConfig,
    pub neuron: NeuronConfig,
    pub logging: LoggingConfig,
}

/// Initial weight and bias distribution for freshly created neurons and connections
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InitializerConfig {
    pub weight_min: f64,
    pub weight_max: f64,
    pub bias_min: f64,
    pub bias_max: f64,
    /// Fixed RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for InitializerConfig {
    fn default() -> Self {
        Self {
            weight_min: -0.1,
            weight_max: 0.1,
            bias_min: -0.1,
            bias_max: 0.1,
            seed: None,
        }
    }
}

/// Defaults handed to training collaborators
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub learning_rate: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self { learning_rate: 0.1 }
    }
}

/// Per-neuron defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronConfig {
    /// Default squash function name (see [`KNOWN_SQUASHES`])
    pub squash: String,
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            squash: "logistic".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}
