// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, AutomataConfig, ConfigError, ConfigResult, LogFormat};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "automata.toml";

/// Find the automata configuration file
///
/// Search order:
/// 1. `AUTOMATA_CONFIG_PATH` environment variable
/// 2. Current working directory: `./automata.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("AUTOMATA_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by AUTOMATA_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet AUTOMATA_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AutomataConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    load_config_from_str(&content, cli_args)
}

/// Parse an in-memory TOML document, then apply overrides and validate
pub fn load_config_from_str(
    content: &str,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AutomataConfig> {
    let mut config: AutomataConfig = toml::from_str(content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `AUTOMATA_WEIGHT_MIN` -> `initializer.weight_min`
/// - `AUTOMATA_WEIGHT_MAX` -> `initializer.weight_max`
/// - `AUTOMATA_BIAS_MIN` -> `initializer.bias_min`
/// - `AUTOMATA_BIAS_MAX` -> `initializer.bias_max`
/// - `AUTOMATA_SEED` -> `initializer.seed`
/// - `AUTOMATA_LEARNING_RATE` -> `training.learning_rate`
/// - `AUTOMATA_SQUASH` -> `neuron.squash`
/// - `AUTOMATA_LOG_LEVEL` -> `logging.level`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut AutomataConfig) {
    if let Some(v) = env_f64("AUTOMATA_WEIGHT_MIN") {
        config.initializer.weight_min = v;
    }
    if let Some(v) = env_f64("AUTOMATA_WEIGHT_MAX") {
        config.initializer.weight_max = v;
    }
    if let Some(v) = env_f64("AUTOMATA_BIAS_MIN") {
        config.initializer.bias_min = v;
    }
    if let Some(v) = env_f64("AUTOMATA_BIAS_MAX") {
        config.initializer.bias_max = v;
    }
    if let Ok(value) = env::var("AUTOMATA_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.initializer.seed = Some(seed);
        }
    }
    if let Some(v) = env_f64("AUTOMATA_LEARNING_RATE") {
        config.training.learning_rate = v;
    }
    if let Ok(value) = env::var("AUTOMATA_SQUASH") {
        config.neuron.squash = value;
    }
    if let Ok(value) = env::var("AUTOMATA_LOG_LEVEL") {
        config.logging.level = value;
    }
}

fn env_f64(name: &str) -> Option<f64> {
    env::var(name).ok().and_then(|v| v.parse::<f64>().ok())
}

/// Apply CLI argument overrides to configuration
///
/// Keys use the dotted section path, e.g. `{"initializer.seed": "42", "logging.format": "json"}`.
///
/// # Errors
///
/// Unlike environment overrides, an explicit CLI value that cannot be parsed
/// or an unknown key is reported as `ConfigError::InvalidValue`.
pub fn apply_cli_overrides(
    config: &mut AutomataConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    for (key, value) in cli_args {
        match key.as_str() {
            "initializer.weight_min" => config.initializer.weight_min = parse_cli(key, value)?,
            "initializer.weight_max" => config.initializer.weight_max = parse_cli(key, value)?,
            "initializer.bias_min" => config.initializer.bias_min = parse_cli(key, value)?,
            "initializer.bias_max" => config.initializer.bias_max = parse_cli(key, value)?,
            "initializer.seed" => config.initializer.seed = Some(parse_cli(key, value)?),
            "training.learning_rate" => config.training.learning_rate = parse_cli(key, value)?,
            "neuron.squash" => config.neuron.squash = value.clone(),
            "logging.level" => config.logging.level = value.clone(),
            "logging.format" => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "text" => LogFormat::Text,
                    "json" => LogFormat::Json,
                    _ => {
                        return Err(ConfigError::InvalidValue(format!(
                            "{} = '{}' (expected text or json)",
                            key, value
                        )))
                    }
                }
            }
            _ => {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown override key '{}'",
                    key
                )))
            }
        }
    }
    Ok(())
}

fn parse_cli<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}'", key, value)))
}
