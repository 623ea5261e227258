//! Prioritized replay buffer.
//!
//! Transitions live in a circular buffer whose slots map one-to-one onto the
//! leaves of a [`SumTree`]. A slot's payload and priority are always written
//! together.
mod iw_scheduler;
mod sum_tree;
use super::{config::PerConfig, PrioritizedBatch, PrioritizedReplayBufferConfig};
use crate::{error::PerError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
pub use iw_scheduler::IwScheduler;
use log::{info, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
pub use sum_tree::SumTree;

/// State for prioritized sampling.
struct PerState {
    sum_tree: SumTree,
    iw_scheduler: IwScheduler,
    alpha: f32,
    epsilon: f32,
    default_priority: f32,

    /// Largest stored priority so far, after applying `alpha`.
    max_priority: Option<f32>,
}

impl PerState {
    fn new(capacity: usize, per_config: &PerConfig) -> Result<Self, PerError> {
        let default_priority = per_config.default_priority.powf(per_config.alpha);
        if !(default_priority.is_finite() && default_priority > 0f32) {
            return Err(PerError::InvalidConfig(format!(
                "default_priority^alpha must be positive and finite, got {}^{} = {}",
                per_config.default_priority, per_config.alpha, default_priority
            )));
        }

        Ok(Self {
            sum_tree: SumTree::new(capacity)?,
            iw_scheduler: IwScheduler::new(
                per_config.beta_0,
                per_config.beta_final,
                per_config.n_opts_final,
            ),
            alpha: per_config.alpha,
            epsilon: per_config.epsilon,
            default_priority,
            max_priority: None,
        })
    }

    /// Priority given to a newly added transition.
    fn insertion_priority(&self) -> f32 {
        self.max_priority.unwrap_or(self.default_priority)
    }

    fn observe(&mut self, p: f32) {
        self.max_priority = Some(match self.max_priority {
            Some(max_p) => max_p.max(p),
            None => p,
        });
    }

    /// Floors `p` to `epsilon` and applies `alpha`.
    fn stored_priority(&self, p: f32) -> Result<f32, PerError> {
        if !p.is_finite() {
            return Err(PerError::NonFinitePriority(p));
        }
        let p = if p <= 0f32 {
            warn!("Priority {} floored to epsilon = {}", p, self.epsilon);
            self.epsilon
        } else {
            p
        };
        let p = p.powf(self.alpha);
        if !p.is_finite() {
            return Err(PerError::NonFinitePriority(p));
        }
        Ok(p.max(f32::MIN_POSITIVE))
    }
}

/// A replay buffer sampling transitions in proportion to their priorities.
///
/// The buffer has a fixed capacity. Once it is full, each new transition
/// overwrites the oldest one, payload and priority alike.
///
/// The buffer is not synchronized. [`sample`](Self::sample) returns slot
/// indices that [`update_priorities`](Self::update_priorities) later writes
/// to, so the three operations must not interleave with an
/// [`add`](Self::add) from elsewhere. Use
/// [`SharedReplayBuffer`](super::SharedReplayBuffer) to share a buffer
/// between threads.
///
/// # Type Parameters
///
/// * `T` - The stored payload, usually a [`Transition`](super::Transition)
pub struct PrioritizedReplayBuffer<T> {
    capacity: usize,

    /// Next slot to be written.
    i: usize,

    /// Number of filled slots.
    size: usize,

    buffer: Vec<T>,
    rng: StdRng,
    per_state: PerState,
}

impl<T: Clone> PrioritizedReplayBuffer<T> {
    /// Creates an empty buffer.
    ///
    /// # Errors
    ///
    /// * [`PerError::InvalidCapacity`] if `config.capacity == 0`
    /// * [`PerError::InvalidConfig`] if a prioritization parameter is out of range
    pub fn new(config: &PrioritizedReplayBufferConfig) -> Result<Self, PerError> {
        config.check()?;
        let capacity = config.capacity;
        let per_state = PerState::new(capacity, &config.per_config)?;
        info!(
            "Construct prioritized replay buffer with capacity = {}",
            capacity
        );

        Ok(Self {
            capacity,
            i: 0,
            size: 0,
            buffer: Vec::with_capacity(capacity),
            rng: StdRng::seed_from_u64(config.seed),
            per_state,
        })
    }

    /// Adds a transition with the largest priority stored so far, or the
    /// default priority if the buffer has never held one.
    ///
    /// Returns the slot the transition was written to.
    pub fn add(&mut self, tr: T) -> Result<usize, PerError> {
        let slot = self.i;
        let p = self.per_state.insertion_priority();
        self.per_state.sum_tree.update(slot, p)?;
        self.per_state.observe(p);

        if self.buffer.len() < self.capacity {
            self.buffer.push(tr);
        } else {
            self.buffer[slot] = tr;
        }

        self.i = (self.i + 1) % self.capacity;
        if self.size < self.capacity {
            self.size += 1;
        }

        Ok(slot)
    }

    /// Samples `batch_size` transitions in proportion to their priorities.
    ///
    /// `[0, total)` is split into `batch_size` segments of equal width and one
    /// value is drawn uniformly from each segment. The importance sampling
    /// weight of a sample in slot $i$ is $w_i = (N P(i))^{-\beta}$ with
    /// $P(i) = p_i / \sum_j p_j$ and $N$ the number of stored transitions,
    /// divided by the largest weight in the batch.
    ///
    /// # Errors
    ///
    /// * [`PerError::InsufficientSamples`] if fewer than `batch_size`
    ///   transitions are stored, or none at all
    /// * [`PerError::InvalidBeta`] if `beta` is not in `[0, 1]`
    pub fn sample(
        &mut self,
        batch_size: usize,
        beta: f32,
    ) -> Result<PrioritizedBatch<T>, PerError> {
        if !(0f32..=1f32).contains(&beta) {
            return Err(PerError::InvalidBeta(beta));
        }
        if self.size == 0 || self.size < batch_size {
            return Err(PerError::InsufficientSamples {
                requested: batch_size,
                available: self.size,
            });
        }
        if batch_size == 0 {
            return Ok(PrioritizedBatch::empty());
        }

        let sum_tree = &self.per_state.sum_tree;
        let rng = &mut self.rng;
        let p_sum = sum_tree.total();
        let segment = p_sum / batch_size as f32;
        let (slot_indices, ps): (Vec<_>, Vec<_>) = (0..batch_size)
            .map(|j| {
                let lo = segment * j as f32;
                sum_tree.find(lo + rng.gen::<f32>() * segment)
            })
            .unzip();
        debug_assert!(slot_indices.iter().all(|&ix| ix < self.size));

        let n = self.size as f64 / p_sum as f64;
        let beta = beta as f64;
        let ws = ps
            .iter()
            .map(|&p| (n * p as f64).powf(-beta))
            .collect::<Vec<_>>();
        let w_max = ws.iter().cloned().fold(f64::MIN, f64::max);
        let weights = ws.iter().map(|w| (w / w_max) as f32).collect::<Vec<_>>();

        trace!(
            "Sampled {} transitions, total priority = {}, beta = {}",
            batch_size,
            p_sum,
            beta
        );

        Ok(PrioritizedBatch {
            transitions: slot_indices
                .iter()
                .map(|&ix| self.buffer[ix].clone())
                .collect(),
            slot_indices,
            weights,
        })
    }

    /// Sets the priorities of the given slots.
    ///
    /// Priorities are typically `|td_err| + epsilon`. A priority `<= 0` is
    /// floored to the configured `epsilon`; `alpha` is applied before the
    /// value is stored. Nothing is written unless every pair is valid.
    ///
    /// # Errors
    ///
    /// * [`PerError::MismatchedUpdateLengths`] if the slices differ in length
    /// * [`PerError::SlotOutOfRange`] if a slot has never been filled
    /// * [`PerError::NonFinitePriority`] if a priority is NaN or infinite
    pub fn update_priorities(
        &mut self,
        slots: &[usize],
        priorities: &[f32],
    ) -> Result<(), PerError> {
        if slots.len() != priorities.len() {
            return Err(PerError::MismatchedUpdateLengths {
                n_slots: slots.len(),
                n_priorities: priorities.len(),
            });
        }
        if let Some(&slot) = slots.iter().find(|&&slot| slot >= self.size) {
            return Err(PerError::SlotOutOfRange {
                slot,
                bound: self.size,
            });
        }
        let ps = priorities
            .iter()
            .map(|&p| self.per_state.stored_priority(p))
            .collect::<Result<Vec<_>, _>>()?;

        for (&slot, &p) in slots.iter().zip(ps.iter()) {
            self.per_state.sum_tree.update(slot, p)?;
            self.per_state.observe(p);
        }
        trace!(
            "Updated {} priorities, total priority = {}",
            slots.len(),
            self.per_state.sum_tree.total()
        );

        Ok(())
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no transition is stored.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Maximum number of stored transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of the stored priorities.
    pub fn total_priority(&self) -> f32 {
        self.per_state.sum_tree.total()
    }

    /// Priority the next added transition will get.
    pub fn max_priority(&self) -> f32 {
        self.per_state.insertion_priority()
    }

    /// Stored priority of `slot`, after `alpha` has been applied.
    pub fn priority(&self, slot: usize) -> Option<f32> {
        (slot < self.size).then(|| self.per_state.sum_tree.priority(slot))
    }

    /// Transition stored in `slot`.
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.buffer.get(slot)
    }

    /// Current value of the annealed importance sampling exponent.
    pub fn beta(&self) -> f32 {
        self.per_state.iw_scheduler.beta()
    }

    /// Removes all transitions and forgets the maximum priority.
    ///
    /// The schedule of `beta` is kept.
    pub fn clear(&mut self) {
        self.i = 0;
        self.size = 0;
        self.buffer.clear();
        self.per_state.sum_tree.clear();
        self.per_state.max_priority = None;
    }
}

impl<T: Clone> ExperienceBufferBase for PrioritizedReplayBuffer<T> {
    type Item = T;

    fn push(&mut self, tr: T) -> Result<()> {
        self.add(tr)?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.size
    }
}

impl<T: Clone> ReplayBufferBase for PrioritizedReplayBuffer<T> {
    type Config = PrioritizedReplayBufferConfig;
    type Batch = PrioritizedBatch<T>;

    fn build(config: &Self::Config) -> Result<Self> {
        Ok(Self::new(config)?)
    }

    /// Samples a batch with the current `beta` of the schedule.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let beta = self.per_state.iw_scheduler.beta();
        Ok(self.sample(size, beta)?)
    }

    /// Sets priorities to `|td_err| + epsilon` and advances the schedule of `beta`.
    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()> {
        let epsilon = self.per_state.epsilon;
        let ps = td_errs
            .iter()
            .map(|td_err| td_err.abs() + epsilon)
            .collect::<Vec<_>>();
        self.update_priorities(ixs, &ps)?;
        self.per_state.iw_scheduler.add_n_opts();
        Ok(())
    }
}
