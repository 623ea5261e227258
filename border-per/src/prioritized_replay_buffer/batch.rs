//! Transitions and batches of the prioritized replay buffer.
use serde::{Deserialize, Serialize};

/// One step of interaction with an environment.
///
/// The replay buffer treats it as an opaque payload; any `T: Clone` can be
/// stored instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition<O, A> {
    /// Observation before the action.
    pub state: O,

    /// Action taken.
    pub action: A,

    /// Reward received.
    pub reward: f32,

    /// Observation after the action.
    pub next_state: O,

    /// Whether the episode ended at this step.
    pub done: bool,
}

impl<O, A> Transition<O, A> {
    /// Creates a transition.
    pub fn new(state: O, action: A, reward: f32, next_state: O, done: bool) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// A batch sampled from [`PrioritizedReplayBuffer`](super::PrioritizedReplayBuffer).
///
/// The three vectors have the same length and are aligned: `weights[i]` is the
/// importance sampling weight of `transitions[i]`, which was stored in slot
/// `slot_indices[i]`. Pass `slot_indices` back to
/// [`update_priorities`](super::PrioritizedReplayBuffer::update_priorities).
#[derive(Clone, Debug, PartialEq)]
pub struct PrioritizedBatch<T> {
    /// Sampled transitions.
    pub transitions: Vec<T>,

    /// Slots the transitions were sampled from.
    pub slot_indices: Vec<usize>,

    /// Importance sampling weights, normalized so that the largest is 1.
    pub weights: Vec<f32>,
}

impl<T> PrioritizedBatch<T> {
    pub(crate) fn empty() -> Self {
        Self {
            transitions: vec![],
            slot_indices: vec![],
            weights: vec![],
        }
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if the batch has no samples.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Splits the batch into transitions, slot indices and weights.
    pub fn unpack(self) -> (Vec<T>, Vec<usize>, Vec<f32>) {
        (self.transitions, self.slot_indices, self.weights)
    }
}
