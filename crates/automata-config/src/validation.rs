// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures initializer ranges are well formed, the learning rate is usable and
//! names refer to things the engine knows about.

use crate::{AutomataConfig, ConfigError, ConfigResult, KNOWN_LOG_LEVELS, KNOWN_SQUASHES};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvertedRange { field: String, min: f64, max: f64 },
    NonFinite { field: String },
    UnknownName { field: String, value: String, known: &'static [&'static str] },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvertedRange { field, min, max } => {
                write!(f, "{}: min {} is greater than max {}", field, min, max)
            }
            Self::NonFinite { field } => write!(f, "{} must be a finite number", field),
            Self::UnknownName { field, value, known } => {
                write!(
                    f,
                    "{} = '{}' is not one of: {}",
                    field,
                    value,
                    known.join(", ")
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Finite, non-inverted weight and bias ranges
/// - A positive, finite learning rate
/// - Known squash and log level names
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &AutomataConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_ranges(config, &mut errors);
    validate_training(config, &mut errors);
    validate_names(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_ranges(config: &AutomataConfig, errors: &mut Vec<ConfigValidationError>) {
    let init = &config.initializer;
    let ranges = [
        ("initializer.weight", init.weight_min, init.weight_max),
        ("initializer.bias", init.bias_min, init.bias_max),
    ];

    for (field, min, max) in ranges {
        if !min.is_finite() || !max.is_finite() {
            errors.push(ConfigValidationError::NonFinite {
                field: field.to_string(),
            });
        } else if min > max {
            errors.push(ConfigValidationError::InvertedRange {
                field: field.to_string(),
                min,
                max,
            });
        }
    }
}

fn validate_training(config: &AutomataConfig, errors: &mut Vec<ConfigValidationError>) {
    let rate = config.training.learning_rate;
    if !rate.is_finite() {
        errors.push(ConfigValidationError::NonFinite {
            field: "training.learning_rate".to_string(),
        });
    } else if rate <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "training.learning_rate".to_string(),
            reason: "must be positive".to_string(),
        });
    }
}

fn validate_names(config: &AutomataConfig, errors: &mut Vec<ConfigValidationError>) {
    let squash = config.neuron.squash.to_lowercase();
    if !KNOWN_SQUASHES.contains(&squash.as_str()) {
        errors.push(ConfigValidationError::UnknownName {
            field: "neuron.squash".to_string(),
            value: config.neuron.squash.clone(),
            known: KNOWN_SQUASHES,
        });
    }

    let level = config.logging.level.to_lowercase();
    if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::UnknownName {
            field: "logging.level".to_string(),
            value: config.logging.level.clone(),
            known: KNOWN_LOG_LEVELS,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_weight_range() {
        let mut config = AutomataConfig::default();
        config.initializer.weight_min = 1.0;
        config.initializer.weight_max = -1.0;

        let result = validate_config(&config);
        match result {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("initializer.weight"));
                assert!(msg.contains("greater than max"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_range_is_allowed() {
        let mut config = AutomataConfig::default();
        config.initializer.bias_min = 0.0;
        config.initializer.bias_max = 0.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_non_finite_bias() {
        let mut config = AutomataConfig::default();
        config.initializer.bias_max = f64::INFINITY;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("initializer.bias must be a finite number"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_non_positive_learning_rate() {
        let mut config = AutomataConfig::default();
        config.training.learning_rate = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_squash_and_level_are_both_reported() {
        let mut config = AutomataConfig::default();
        config.neuron.squash = "softsign".to_string();
        config.logging.level = "verbose".to_string();

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("neuron.squash = 'softsign'"));
            assert!(msg.contains("logging.level = 'verbose'"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let mut config = AutomataConfig::default();
        config.neuron.squash = "TANH".to_string();
        config.logging.level = "Debug".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
