use num_traits::Float;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry ordered by distance only.
#[derive(Clone, Copy, Debug)]
struct Candidate<T, I> {
    distance: T,
    item: I,
}

impl<T: Float, I> PartialEq for Candidate<T, I> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl<T: Float, I> Eq for Candidate<T, I> {}

impl<T: Float, I> PartialOrd for Candidate<T, I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Float, I> Ord for Candidate<T, I> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Keeps the `capacity` smallest `(distance, item)` pairs offered to it.
///
/// Internally a max-heap on distance, so the worst retained candidate is on
/// top and can be replaced in O(log k). NaN distances are rejected.
#[derive(Clone, Debug)]
pub struct BoundedHeap<T, I> {
    capacity: usize,
    heap: BinaryHeap<Candidate<T, I>>,
}

impl<T: Float, I> BoundedHeap<T, I> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            // Large k with a small tree should not allocate k slots up front.
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Current pruning threshold: the worst retained distance once full,
    /// positive infinity before.
    pub fn threshold(&self) -> T {
        match self.heap.peek() {
            Some(top) if self.is_full() => top.distance,
            _ => T::infinity(),
        }
    }

    /// Offers a candidate. Returns `true` if it was retained.
    pub fn offer(&mut self, distance: T, item: I) -> bool {
        if distance.is_nan() || self.capacity == 0 {
            return false;
        }
        if !self.is_full() {
            self.heap.push(Candidate { distance, item });
            return true;
        }
        match self.heap.peek_mut() {
            Some(mut top) if distance < top.distance => {
                *top = Candidate { distance, item };
                true
            }
            _ => false,
        }
    }

    /// Drains the candidates nearest first.
    pub fn into_sorted_vec(self) -> Vec<(T, I)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.distance, c.item))
            .collect()
    }

    /// Drains the candidates in internal heap order.
    pub fn into_vec(self) -> Vec<(T, I)> {
        self.heap
            .into_vec()
            .into_iter()
            .map(|c| (c.distance, c.item))
            .collect()
    }
}
