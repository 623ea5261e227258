//! Annealing of the importance sampling exponent.
use serde::{Deserialize, Serialize};

/// Linear schedule of $\beta$, the exponent of importance sampling weights.
///
/// $\beta$ moves from `beta_0` to `beta_final` over `n_opts_final`
/// optimization steps and stays at `beta_final` afterwards. The buffer keeps
/// its schedule across [`clear`](super::PrioritizedReplayBuffer::clear).
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct IwScheduler {
    /// $\beta$ at step zero.
    pub beta_0: f32,

    /// $\beta$ once the schedule is done.
    pub beta_final: f32,

    /// Length of the schedule in optimization steps.
    pub n_opts_final: usize,

    /// Optimization steps taken so far.
    pub n_opts: usize,
}

impl IwScheduler {
    /// Creates a scheduler at step zero.
    pub fn new(beta_0: f32, beta_final: f32, n_opts_final: usize) -> Self {
        Self {
            beta_0,
            beta_final,
            n_opts_final,
            n_opts: 0,
        }
    }

    /// Fraction of the schedule completed, in `[0, 1]`.
    fn progress(&self) -> f32 {
        match self.n_opts_final {
            0 => 1f32,
            n => (self.n_opts.min(n) as f32) / n as f32,
        }
    }

    /// Current value of $\beta$.
    pub fn beta(&self) -> f32 {
        match self.progress() {
            t if t >= 1f32 => self.beta_final,
            t => self.beta_0 + (self.beta_final - self.beta_0) * t,
        }
    }

    /// Advances the schedule by one optimization step.
    pub fn add_n_opts(&mut self) {
        self.n_opts = self.n_opts.saturating_add(1);
    }
}
