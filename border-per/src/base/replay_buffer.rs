//! Replay buffer interface for reinforcement learning.
//!
//! These traits separate the two sides of a replay buffer: the process that
//! pushes experiences into it and the trainer that pulls batches out of it
//! and feeds priorities back.

use anyhow::Result;

/// Interface for buffers that store experiences from environments.
///
/// # Examples
///
/// ```ignore
/// struct SimpleBuffer<T> {
///     items: Vec<T>,
/// }
///
/// impl<T> ExperienceBufferBase for SimpleBuffer<T> {
///     type Item = T;
///
///     fn push(&mut self, tr: T) -> Result<()> {
///         self.items.push(tr);
///         Ok(())
///     }
///
///     fn len(&self) -> usize {
///         self.items.len()
///     }
/// }
/// ```
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase: Sized {
    /// Configuration parameters for the replay buffer.
    type Config: Clone;

    /// The type of batch generated for training.
    type Batch;

    /// Builds a new replay buffer from the given configuration.
    ///
    /// Fails if the configuration is invalid.
    fn build(config: &Self::Config) -> Result<Self>;

    /// Constructs a batch of experiences for training.
    ///
    /// # Errors
    ///
    /// Fails if the buffer holds fewer than `size` experiences.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;

    /// Updates the priorities of experiences returned by the last [`batch`](Self::batch).
    ///
    /// # Arguments
    ///
    /// * `ixs` - Indices of experiences in the buffer
    /// * `td_errs` - Magnitudes of TD errors for the experiences
    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()>;
}
