//! Errors in the replay memory.
use thiserror::Error;

/// Errors in the replay memory.
///
/// Except for [`PerError::InsufficientSamples`], every variant signals misuse
/// by the caller and aborts the call that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerError {
    /// The buffer was configured with zero capacity.
    #[error("Invalid capacity: {0}, must be positive")]
    InvalidCapacity(usize),

    /// A configuration value is out of its valid range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The buffer holds fewer transitions than requested.
    #[error("Insufficient samples: requested {requested}, available {available}")]
    InsufficientSamples {
        /// Requested batch size.
        requested: usize,
        /// Number of stored transitions.
        available: usize,
    },

    /// Slot indices and priorities passed to a priority update differ in length.
    #[error("Mismatched update lengths: {n_slots} slots, {n_priorities} priorities")]
    MismatchedUpdateLengths {
        /// Number of slot indices.
        n_slots: usize,
        /// Number of priorities.
        n_priorities: usize,
    },

    /// A slot index is outside `[0, bound)`, where `bound` is the capacity
    /// of the sum tree or the number of filled slots of the buffer.
    #[error("Slot out of range: {slot} not in [0, {bound})")]
    SlotOutOfRange {
        /// The offending slot.
        slot: usize,
        /// Exclusive upper bound of valid slots.
        bound: usize,
    },

    /// A priority `<= 0` reached the sum tree.
    #[error("Non-positive priority: {0}")]
    NonPositivePriority(f32),

    /// A priority was NaN or infinite.
    #[error("Non-finite priority: {0}")]
    NonFinitePriority(f32),

    /// The importance sampling exponent is outside `[0, 1]`.
    #[error("Invalid beta: {0}, must be in [0, 1]")]
    InvalidBeta(f32),

    /// A thread panicked while holding the lock of a shared buffer.
    #[error("Replay buffer lock poisoned")]
    LockPoisoned,
}

impl PerError {
    /// Returns `true` if the caller may simply skip the current step and retry later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientSamples { .. })
    }
}
