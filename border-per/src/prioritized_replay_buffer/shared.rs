//! A prioritized replay buffer shared between threads.
use super::{PrioritizedBatch, PrioritizedReplayBuffer, PrioritizedReplayBufferConfig};
use crate::error::PerError;
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle to a [`PrioritizedReplayBuffer`] guarded by a single mutex.
///
/// Sampling, priority updates and insertions share the sum tree and the write
/// cursor, so every operation takes the same lock. Cloning the handle shares
/// the underlying buffer.
///
/// Between a [`sample`](Self::sample) and the matching
/// [`update_priorities`](Self::update_priorities), another thread may
/// overwrite a sampled slot. Callers that need the pair to be atomic can hold
/// the guard returned by [`lock`](Self::lock) across both calls.
pub struct SharedReplayBuffer<T> {
    inner: Arc<Mutex<PrioritizedReplayBuffer<T>>>,
}

impl<T> Clone for SharedReplayBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> SharedReplayBuffer<T> {
    /// Creates an empty shared buffer.
    pub fn new(config: &PrioritizedReplayBufferConfig) -> Result<Self, PerError> {
        Ok(Self::from(PrioritizedReplayBuffer::new(config)?))
    }

    /// Locks the buffer.
    pub fn lock(&self) -> Result<MutexGuard<'_, PrioritizedReplayBuffer<T>>, PerError> {
        self.inner.lock().map_err(|_| PerError::LockPoisoned)
    }

    /// See [`PrioritizedReplayBuffer::add`].
    pub fn add(&self, tr: T) -> Result<usize, PerError> {
        self.lock()?.add(tr)
    }

    /// See [`PrioritizedReplayBuffer::sample`].
    pub fn sample(&self, batch_size: usize, beta: f32) -> Result<PrioritizedBatch<T>, PerError> {
        self.lock()?.sample(batch_size, beta)
    }

    /// See [`PrioritizedReplayBuffer::update_priorities`].
    pub fn update_priorities(&self, slots: &[usize], priorities: &[f32]) -> Result<(), PerError> {
        self.lock()?.update_priorities(slots, priorities)
    }

    /// See [`PrioritizedReplayBuffer::len`].
    pub fn len(&self) -> Result<usize, PerError> {
        Ok(self.lock()?.len())
    }
}

impl<T> From<PrioritizedReplayBuffer<T>> for SharedReplayBuffer<T> {
    fn from(buffer: PrioritizedReplayBuffer<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PerConfig;
    use std::thread;

    #[test]
    fn test_concurrent_add() {
        let config = PrioritizedReplayBufferConfig::default()
            .capacity(1000)
            .per_config(PerConfig::default().alpha(1.0));
        let buffer = SharedReplayBuffer::new(&config).unwrap();

        let handles = (0..4)
            .map(|t| {
                let buffer = buffer.clone();
                thread::spawn(move || {
                    for n in 0..100usize {
                        buffer.add(t * 100 + n).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().for_each(|h| h.join().unwrap());

        assert_eq!(buffer.len(), Ok(400));
        let guard = buffer.lock().unwrap();
        assert!((guard.total_priority() - 400.0).abs() < 1e-3);
        let mut stored = (0..400)
            .filter_map(|slot| guard.get(slot).cloned())
            .collect::<Vec<_>>();
        stored.sort_unstable();
        assert_eq!(stored, (0..400).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_and_update_under_one_guard() {
        let config = PrioritizedReplayBufferConfig::default().capacity(8);
        let buffer = SharedReplayBuffer::new(&config).unwrap();
        for n in 0..8 {
            buffer.add(n).unwrap();
        }

        let mut guard = buffer.lock().unwrap();
        let batch = guard.sample(4, 0.4).unwrap();
        guard
            .update_priorities(&batch.slot_indices, &[2.0; 4])
            .unwrap();
        drop(guard);

        let batch = buffer.sample(8, 0.4).unwrap();
        assert_eq!(batch.len(), 8);
        assert!(buffer.sample(9, 0.4).unwrap_err().is_recoverable());
    }
}
