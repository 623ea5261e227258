//! Prioritized experience replay.
//!
//! # Key Components
//!
//! - [`PrioritizedReplayBuffer`]: circular buffer of transitions sampled by priority
//! - [`SumTree`]: array-backed sum tree over the priorities
//! - [`IwScheduler`]: annealing schedule of the importance sampling exponent
//! - [`PrioritizedBatch`]: sampled transitions with their slots and weights
//! - [`SharedReplayBuffer`]: a buffer shared between threads behind one lock
//!
//! # Examples
//!
//! ```rust
//! use border_per::{PerConfig, PrioritizedReplayBuffer, PrioritizedReplayBufferConfig};
//!
//! let config = PrioritizedReplayBufferConfig::default()
//!     .capacity(4)
//!     .per_config(PerConfig::default().alpha(1.0));
//! let mut buffer = PrioritizedReplayBuffer::new(&config).unwrap();
//! for tr in ["a", "b", "c", "d"].iter() {
//!     buffer.add(*tr).unwrap();
//! }
//!
//! // All priorities are equal, so each of the four strata hits its own slot.
//! let batch = buffer.sample(4, 1.0).unwrap();
//! assert_eq!(batch.slot_indices, vec![0, 1, 2, 3]);
//! assert_eq!(batch.weights, vec![1.0; 4]);
//! ```
mod base;
mod batch;
mod config;
mod shared;
pub use base::{IwScheduler, PrioritizedReplayBuffer, SumTree};
pub use batch::{PrioritizedBatch, Transition};
pub use config::{PerConfig, PrioritizedReplayBufferConfig};
pub use shared::SharedReplayBuffer;
