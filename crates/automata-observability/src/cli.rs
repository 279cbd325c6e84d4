// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-automata-neural` to raise a single crate to
//! debug level while the rest of the process stays at the configured level.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Environment variable listing crates to raise to debug level
pub const DEBUG_ENV_VAR: &str = "AUTOMATA_DEBUG";

/// Per-crate debug switches
///
/// # Example
/// ```rust
/// use automata_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-automata-neural".to_string()]);
/// assert!(flags.is_enabled("automata-neural"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}`.
    /// `--debug-all` enables every crate in [`KNOWN_CRATES`].
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enabled_crates.insert(crate_name.to_string());
            }
        }

        flags
    }

    /// Parse `args`, then merge crates named in `AUTOMATA_DEBUG`
    ///
    /// `AUTOMATA_DEBUG` holds comma-separated crate names, or `all`.
    pub fn from_args_and_env<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::from_args(args);
        if let Ok(value) = env::var(DEBUG_ENV_VAR) {
            merge_env_value(&mut flags, &value);
        }
        flags
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Get log level for a crate
    ///
    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter` directive string
    ///
    /// `base_level` applies to everything not explicitly enabled. Crate names
    /// are converted to their target form (`automata-neural` -> `automata_neural`)
    /// because `tracing` targets are module paths.
    pub fn to_filter_string(&self, base_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|name| format!("{}=debug", name.replace('-', "_")))
            .collect();
        filters.push(base_level.to_lowercase());
        filters.join(",")
    }
}

fn merge_env_value(flags: &mut CrateDebugFlags, value: &str) {
    if value.trim() == "all" {
        flags.enable_all();
        return;
    }
    for crate_name in value.split(',') {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            flags.enabled_crates.insert(crate_name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-automata-neural".to_string()]);
        assert!(flags.is_enabled("automata-neural"));
        assert!(!flags.is_enabled("automata-config"));
    }

    #[test]
    fn test_unrelated_args_are_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "automata-demo".to_string(),
            "--verbose".to_string(),
        ]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
        assert!(flags.is_enabled("automata-observability"));
    }

    #[test]
    fn test_filter_string_uses_target_names() {
        let flags = CrateDebugFlags::from_args(vec![
            "--debug-automata-neural".to_string(),
            "--debug-automata-config".to_string(),
        ]);
        assert_eq!(
            flags.to_filter_string("WARN"),
            "automata_config=debug,automata_neural=debug,warn"
        );
    }

    #[test]
    fn test_filter_string_without_flags() {
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }

    #[test]
    fn test_env_value_merge() {
        let mut flags = CrateDebugFlags::default();
        merge_env_value(&mut flags, " automata-neural , ,automata ");
        assert!(flags.is_enabled("automata-neural"));
        assert!(flags.is_enabled("automata"));
        assert_eq!(flags.enabled_crates.len(), 2);

        let mut all = CrateDebugFlags::default();
        merge_env_value(&mut all, "all");
        assert_eq!(all.enabled_crates.len(), KNOWN_CRATES.len());
    }

    #[test]
    fn test_env_var_adds_to_args() {
        // only test in this binary touching the variable
        env::set_var(DEBUG_ENV_VAR, "automata-config");
        let flags = CrateDebugFlags::from_args_and_env(vec!["--debug-automata-neural".to_string()]);
        env::remove_var(DEBUG_ENV_VAR);

        assert!(flags.is_enabled("automata-neural"));
        assert!(flags.is_enabled("automata-config"));
        assert_eq!(flags.enabled_crates.len(), 2);

        let flags = CrateDebugFlags::from_args_and_env(Vec::new());
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-automata-neural".to_string()]);
        assert_eq!(flags.log_level("automata-neural"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("automata-config"), tracing::Level::INFO);
    }
}
