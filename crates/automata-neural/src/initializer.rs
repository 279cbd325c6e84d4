// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Initial weight and bias sampling
//!
//! Every [`LookupTable`](crate::lookup::LookupTable) owns one initializer, so
//! two tables seeded identically build identical networks.

use automata_config::InitializerConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{NeuralError, Result};

/// Default half-width of the uniform weight and bias ranges
pub const DEFAULT_SPREAD: f64 = 0.1;

/// Uniform sampler for fresh weights and biases
#[derive(Debug, Clone)]
pub struct Initializer {
    weight_range: (f64, f64),
    bias_range: (f64, f64),
    rng: StdRng,
}

impl Default for Initializer {
    fn default() -> Self {
        Self {
            weight_range: (-DEFAULT_SPREAD, DEFAULT_SPREAD),
            bias_range: (-DEFAULT_SPREAD, DEFAULT_SPREAD),
            rng: StdRng::from_entropy(),
        }
    }
}

impl Initializer {
    /// Create an initializer with explicit ranges
    ///
    /// # Errors
    /// `InvalidInitializer` if a bound is not finite or `min > max`.
    pub fn new(weight_range: (f64, f64), bias_range: (f64, f64), seed: Option<u64>) -> Result<Self> {
        check_range("weight", weight_range)?;
        check_range("bias", bias_range)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            weight_range,
            bias_range,
            rng,
        })
    }

    /// Default ranges with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::default()
        }
    }

    /// Always yields the same weight and bias
    pub fn constant(weight: f64, bias: f64) -> Self {
        Self {
            weight_range: (weight, weight),
            bias_range: (bias, bias),
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn from_config(config: &InitializerConfig) -> Result<Self> {
        Self::new(
            (config.weight_min, config.weight_max),
            (config.bias_min, config.bias_max),
            config.seed,
        )
    }

    pub fn weight_range(&self) -> (f64, f64) {
        self.weight_range
    }

    pub fn bias_range(&self) -> (f64, f64) {
        self.bias_range
    }

    /// Sample an initial connection weight
    pub fn weight(&mut self) -> f64 {
        sample(&mut self.rng, self.weight_range)
    }

    /// Sample an initial neuron bias
    pub fn bias(&mut self) -> f64 {
        sample(&mut self.rng, self.bias_range)
    }
}

fn sample(rng: &mut StdRng, (min, max): (f64, f64)) -> f64 {
    if min == max {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

fn check_range(what: &str, (min, max): (f64, f64)) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(NeuralError::InvalidInitializer(format!(
            "{} range must be finite, got {}..{}",
            what, min, max
        )));
    }
    if min > max {
        return Err(NeuralError::InvalidInitializer(format!(
            "{} range is inverted: {} > {}",
            what, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_stay_in_range() {
        let mut init = Initializer::new((-0.5, 0.25), (1.0, 2.0), Some(3)).unwrap();
        for _ in 0..1000 {
            let w = init.weight();
            let b = init.bias();
            assert!((-0.5..=0.25).contains(&w));
            assert!((1.0..=2.0).contains(&b));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Initializer::seeded(42);
        let mut b = Initializer::seeded(42);
        let xs: Vec<f64> = (0..16).map(|_| a.weight()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.weight()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_constant() {
        let mut init = Initializer::constant(0.5, 0.0);
        assert_eq!(init.weight(), 0.5);
        assert_eq!(init.bias(), 0.0);
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(matches!(
            Initializer::new((1.0, -1.0), (0.0, 0.0), None),
            Err(NeuralError::InvalidInitializer(_))
        ));
        assert!(Initializer::new((0.0, 0.0), (f64::NAN, 0.0), None).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = InitializerConfig {
            weight_min: 0.2,
            weight_max: 0.2,
            bias_min: -1.0,
            bias_max: -1.0,
            seed: Some(1),
        };
        let mut init = Initializer::from_config(&config).unwrap();
        assert_eq!(init.weight(), 0.2);
        assert_eq!(init.bias(), -1.0);
    }
}
