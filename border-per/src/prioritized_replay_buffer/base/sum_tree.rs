//! Sum tree for prioritized sampling.
//!
//! A complete binary tree stored as a flat array. Leaf `capacity - 1 + slot`
//! holds the priority of `slot` and every internal node holds the sum of its
//! two children, so the root is the total priority mass.
use crate::error::PerError;

/// Sum tree over the priorities of the slots in a replay buffer.
#[derive(Debug, Clone)]
pub struct SumTree {
    capacity: usize,
    tree: Vec<f32>,
}

impl SumTree {
    /// Creates a sum tree with `capacity` leaves, all of priority zero.
    ///
    /// # Errors
    ///
    /// [`PerError::InvalidCapacity`] if `capacity == 0`.
    pub fn new(capacity: usize) -> Result<Self, PerError> {
        if capacity == 0 {
            return Err(PerError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            tree: vec![0f32; 2 * capacity - 1],
        })
    }

    /// Number of leaves.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of all priorities.
    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// Priority stored in the leaf of `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= capacity`.
    pub fn priority(&self, slot: usize) -> f32 {
        self.tree[self.leaf(slot)]
    }

    /// Resets all priorities to zero.
    pub fn clear(&mut self) {
        self.tree.iter_mut().for_each(|v| *v = 0f32);
    }

    #[inline]
    fn leaf(&self, slot: usize) -> usize {
        slot + self.capacity - 1
    }

    /// Recomputes the ancestors of `ix` from their children.
    fn propagate(&mut self, ix: usize) {
        let mut ix = ix;
        while ix != 0 {
            ix = (ix - 1) / 2;
            self.tree[ix] = self.tree[2 * ix + 1] + self.tree[2 * ix + 2];
        }
    }

    fn retrieve(&self, ix: usize, s: f32) -> usize {
        let left = 2 * ix + 1;
        let right = left + 1;

        if left >= self.tree.len() {
            return ix;
        }

        // A subtree without mass is never entered, which also clamps values
        // at or beyond the total onto the rightmost leaf with positive priority.
        if s < self.tree[left] || self.tree[right] <= 0f32 {
            self.retrieve(left, s)
        } else {
            self.retrieve(right, (s - self.tree[left]).min(self.tree[right]))
        }
    }

    /// Sets the priority of `slot` and refreshes its ancestors up to the root.
    ///
    /// # Errors
    ///
    /// * [`PerError::SlotOutOfRange`] if `slot >= capacity`
    /// * [`PerError::NonFinitePriority`] if `priority` is NaN or infinite
    /// * [`PerError::NonPositivePriority`] if `priority <= 0`
    pub fn update(&mut self, slot: usize, priority: f32) -> Result<(), PerError> {
        if slot >= self.capacity {
            return Err(PerError::SlotOutOfRange {
                slot,
                bound: self.capacity,
            });
        }
        if !priority.is_finite() {
            return Err(PerError::NonFinitePriority(priority));
        }
        if priority <= 0f32 {
            return Err(PerError::NonPositivePriority(priority));
        }

        let ix = self.leaf(slot);
        self.tree[ix] = priority;
        self.propagate(ix);
        Ok(())
    }

    /// Finds the slot whose cumulative priority interval contains `value`.
    ///
    /// A slot with priority `p` covers an interval of width `p` in `[0, total)`,
    /// so a uniform `value` selects it with probability `p / total`.
    /// Returns the slot and its priority.
    pub fn find(&self, value: f32) -> (usize, f32) {
        let ix = self.retrieve(0, value.max(0f32));
        debug_assert!(ix >= self.capacity - 1);
        (ix + 1 - self.capacity, self.tree[ix])
    }
}
