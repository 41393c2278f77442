use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::CaptionError;

enum Phase<T> {
    Open(BinaryHeap<Reverse<T>>),
    Spent,
}

/// Keeps the `capacity` largest items pushed so far.
///
/// The set is consumed by [`extract`](Self::extract); after that every
/// operation except [`reset`](Self::reset) fails with
/// [`CaptionError::InvalidState`].
pub struct BoundedTopSet<T: Ord> {
    capacity: usize,
    phase: Phase<T>,
}

impl<T: Ord> BoundedTopSet<T> {
    pub fn new(capacity: usize) -> Result<Self, CaptionError> {
        if capacity == 0 {
            return Err(CaptionError::InvalidArgument(
                "top set capacity must be positive".into(),
            ));
        }
        Ok(Self {
            capacity,
            phase: Phase::Open(BinaryHeap::with_capacity(capacity)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, item: T) -> Result<(), CaptionError> {
        let capacity = self.capacity;
        let heap = self.open_mut()?;
        if heap.len() < capacity {
            heap.push(Reverse(item));
            return Ok(());
        }
        // Full: the root is the smallest held item.
        if let Some(mut min) = heap.peek_mut() {
            if item > min.0 {
                *min = Reverse(item);
            }
        }
        Ok(())
    }

    pub fn size(&self) -> Result<usize, CaptionError> {
        match &self.phase {
            Phase::Open(heap) => Ok(heap.len()),
            Phase::Spent => Err(CaptionError::InvalidState(
                "top set size queried after extract",
            )),
        }
    }

    /// Takes every held item, leaving the set spent until `reset`.
    /// With `sort` the items come back largest first.
    pub fn extract(&mut self, sort: bool) -> Result<Vec<T>, CaptionError> {
        match std::mem::replace(&mut self.phase, Phase::Spent) {
            Phase::Open(heap) => {
                let items = if sort {
                    heap.into_sorted_vec()
                } else {
                    heap.into_vec()
                };
                Ok(items.into_iter().map(|Reverse(item)| item).collect())
            }
            Phase::Spent => Err(CaptionError::InvalidState("top set already extracted")),
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Open(BinaryHeap::with_capacity(self.capacity));
    }

    fn open_mut(&mut self) -> Result<&mut BinaryHeap<Reverse<T>>, CaptionError> {
        match &mut self.phase {
            Phase::Open(heap) => Ok(heap),
            Phase::Spent => Err(CaptionError::InvalidState("top set pushed after extract")),
        }
    }
}
