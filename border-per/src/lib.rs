#![warn(missing_docs)]
//! Prioritized experience replay (PER) memory for reinforcement learning.
//!
//! The memory is a fixed-capacity circular buffer of transitions coupled with
//! a sum tree over sampling priorities. A training loop talks to it with
//! three calls:
//!
//! 1. [`PrioritizedReplayBuffer::add`] stores a transition with the maximum
//!    priority seen so far, so that it is sampled at least once.
//! 2. [`PrioritizedReplayBuffer::sample`] draws a stratified batch
//!    proportional to priority, together with importance sampling weights.
//! 3. [`PrioritizedReplayBuffer::update_priorities`] writes back priorities
//!    derived from the TD errors of the sampled batch.
//!
//! ```
//! use border_per::{PerConfig, PrioritizedReplayBuffer, PrioritizedReplayBufferConfig, Transition};
//!
//! let config = PrioritizedReplayBufferConfig::default()
//!     .capacity(1000)
//!     .per_config(PerConfig::default().alpha(0.6));
//! let mut buffer = PrioritizedReplayBuffer::new(&config).unwrap();
//!
//! for i in 0..64 {
//!     buffer.add(Transition::new(i, 0usize, 1.0, i + 1, false)).unwrap();
//! }
//!
//! let batch = buffer.sample(32, 0.4).unwrap();
//! let td_errs = vec![0.5f32; batch.len()];
//! let priorities: Vec<f32> = td_errs.iter().map(|e| e.abs() + 1e-6).collect();
//! buffer.update_priorities(&batch.slot_indices, &priorities).unwrap();
//! ```
pub mod error;
pub mod prioritized_replay_buffer;

mod base;
pub use base::{ExperienceBufferBase, ReplayBufferBase};
pub use error::PerError;
pub use prioritized_replay_buffer::{
    IwScheduler, PerConfig, PrioritizedBatch, PrioritizedReplayBuffer,
    PrioritizedReplayBufferConfig, SharedReplayBuffer, SumTree, Transition,
};
