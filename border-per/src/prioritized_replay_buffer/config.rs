//! Configuration of the prioritized replay buffer.
//!
//! Both structures are serializable, so they can live in the same YAML file
//! as the rest of a training configuration.
use crate::error::PerError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration for Prioritized Experience Replay (PER).
///
/// # Examples
///
/// ```rust
/// use border_per::PerConfig;
///
/// let config = PerConfig::default()
///     .alpha(0.6)
///     .epsilon(1e-6)
///     .beta_0(0.4)
///     .beta_final(1.0)
///     .n_opts_final(500_000);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PerConfig {
    /// Exponent applied to every priority before it is stored in the sum tree.
    /// A value of 0 gives every transition the same sampling probability.
    pub alpha: f32,

    /// Floor for priorities. Priorities `<= 0` are replaced by this value so
    /// that every transition keeps a nonzero sampling probability.
    pub epsilon: f32,

    /// Priority of transitions added before any priority is known.
    pub default_priority: f32,

    /// Initial value of the importance sampling exponent.
    pub beta_0: f32,

    /// Final value of the importance sampling exponent.
    pub beta_final: f32,

    /// Number of optimization steps after which `beta` reaches `beta_final`.
    pub n_opts_final: usize,
}

impl Default for PerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            epsilon: 1e-6,
            default_priority: 1.0,
            beta_0: 0.4,
            beta_final: 1.0,
            n_opts_final: 500_000,
        }
    }
}

impl PerConfig {
    /// Sets the prioritization exponent `alpha`.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the priority floor `epsilon`.
    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the priority of transitions added to an empty buffer.
    pub fn default_priority(mut self, default_priority: f32) -> Self {
        self.default_priority = default_priority;
        self
    }

    /// Sets the initial importance sampling exponent `beta_0`.
    pub fn beta_0(mut self, beta_0: f32) -> Self {
        self.beta_0 = beta_0;
        self
    }

    /// Sets the final importance sampling exponent `beta_final`.
    pub fn beta_final(mut self, beta_final: f32) -> Self {
        self.beta_final = beta_final;
        self
    }

    /// Sets the number of optimization steps to reach `beta_final`.
    pub fn n_opts_final(mut self, n_opts_final: usize) -> Self {
        self.n_opts_final = n_opts_final;
        self
    }

    pub(crate) fn check(&self) -> Result<(), PerError> {
        let positive = |name: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PerError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, v
                )))
            }
        };
        let unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(PerError::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, v
                )))
            }
        };

        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(PerError::InvalidConfig(format!(
                "alpha must be non-negative and finite, got {}",
                self.alpha
            )));
        }
        positive("epsilon", self.epsilon)?;
        positive("default_priority", self.default_priority)?;
        unit("beta_0", self.beta_0)?;
        unit("beta_final", self.beta_final)?;
        Ok(())
    }
}

/// Configuration of [`PrioritizedReplayBuffer`](super::PrioritizedReplayBuffer).
///
/// # Examples
///
/// ```rust
/// use border_per::{PerConfig, PrioritizedReplayBufferConfig};
///
/// let config = PrioritizedReplayBufferConfig::default()
///     .capacity(100_000)
///     .seed(42)
///     .per_config(PerConfig::default().alpha(0.6));
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PrioritizedReplayBufferConfig {
    /// Maximum number of transitions. When the buffer is full, new
    /// transitions replace the oldest ones.
    pub capacity: usize,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,

    /// Prioritization parameters.
    pub per_config: PerConfig,
}

impl Default for PrioritizedReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            seed: 42,
            per_config: PerConfig::default(),
        }
    }
}

impl PrioritizedReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the prioritization parameters.
    pub fn per_config(mut self, per_config: PerConfig) -> Self {
        self.per_config = per_config;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub(crate) fn check(&self) -> Result<(), PerError> {
        if self.capacity == 0 {
            return Err(PerError::InvalidCapacity(self.capacity));
        }
        self.per_config.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_replay_buffer_config() -> Result<()> {
        let config = PrioritizedReplayBufferConfig::default()
            .capacity(100)
            .seed(7)
            .per_config(PerConfig::default().alpha(0.7).n_opts_final(1000));

        let dir = TempDir::new("replay_buffer_config")?;
        let path = dir.path().join("replay_buffer.yaml");

        config.save(&path)?;
        let config_ = PrioritizedReplayBufferConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_check_config() {
        assert!(PrioritizedReplayBufferConfig::default().check().is_ok());
        assert_eq!(
            PrioritizedReplayBufferConfig::default().capacity(0).check(),
            Err(PerError::InvalidCapacity(0))
        );

        let invalid = [
            PerConfig::default().alpha(-0.1),
            PerConfig::default().epsilon(0.0),
            PerConfig::default().default_priority(-1.0),
            PerConfig::default().beta_0(1.5),
            PerConfig::default().beta_final(f32::NAN),
        ];
        for per_config in invalid.iter() {
            assert!(matches!(
                per_config.check(),
                Err(PerError::InvalidConfig(_))
            ));
        }
    }
}
