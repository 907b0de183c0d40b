use crate::bounds::Bounds;
use num_traits::Float;

/// Arena index of the root node.
pub(crate) const ROOT: usize = 0;

/// A node of the tree, stored in the tree's arena.
///
/// `count` and `bounds` cover the whole subtree. `parent` is a plain index
/// back into the arena; parents own their children, never the other way round.
#[derive(Debug)]
pub(crate) struct Node<T, P> {
    pub(crate) bounds: Bounds<T>,
    pub(crate) count: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) kind: NodeKind<T, P>,
}

#[derive(Debug)]
pub(crate) enum NodeKind<T, P> {
    Leaf(Leaf<T, P>),
    Stem(Stem<T>),
}

/// Internal node: routes points by one coordinate.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Stem<T> {
    pub(crate) split_dim: usize,
    pub(crate) split_value: T,
    pub(crate) left: usize,
    pub(crate) right: usize,
}

impl<T: Float> Stem<T> {
    /// Points strictly above the split value go right. NaN goes left.
    #[inline]
    pub(crate) fn goes_right(&self, point: &[T]) -> bool {
        point[self.split_dim] > self.split_value
    }

    #[inline]
    pub(crate) fn child_for(&self, point: &[T]) -> usize {
        if self.goes_right(point) { self.right } else { self.left }
    }
}

/// A bucket of points with their payloads.
///
/// Coordinates are stored flat with a stride of the tree's dimensionality.
#[derive(Debug)]
pub(crate) struct Leaf<T, P> {
    pub(crate) coords: Vec<T>,
    pub(crate) payloads: Vec<P>,
    pub(crate) capacity: usize,
    /// Every stored point has the same coordinates.
    pub(crate) singular: bool,
}

pub(crate) type LeafIter<'a, T, P> =
    std::iter::Zip<std::slice::ChunksExact<'a, T>, std::slice::Iter<'a, P>>;

impl<T: Float, P> Leaf<T, P> {
    pub(crate) fn new(capacity: usize, dims: usize) -> Self {
        Self {
            coords: Vec::with_capacity(capacity * dims),
            payloads: Vec::with_capacity(capacity),
            capacity,
            singular: true,
        }
    }

    fn from_parts(coords: Vec<T>, payloads: Vec<P>, capacity: usize, dims: usize) -> Self {
        let singular = match coords.chunks_exact(dims).next() {
            Some(first) => coords.chunks_exact(dims).all(|p| p == first),
            None => true,
        };
        Self {
            coords,
            payloads,
            capacity,
            singular,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.payloads.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub(crate) fn first_point(&self, dims: usize) -> Option<&[T]> {
        self.coords.get(..dims)
    }

    pub(crate) fn iter(&self, dims: usize) -> LeafIter<'_, T, P> {
        self.coords.chunks_exact(dims).zip(self.payloads.iter())
    }

    pub(crate) fn push(&mut self, point: &[T], payload: P) {
        let dims = point.len();
        let same = self.first_point(dims).is_none_or(|first| first == point);
        self.singular &= same;
        self.coords.extend_from_slice(point);
        self.payloads.push(payload);
    }

    /// True if a point with exactly these coordinates is stored here.
    ///
    /// Uses `==` per coordinate: `0.0` matches `-0.0` and NaN matches nothing.
    pub(crate) fn contains(&self, point: &[T]) -> bool {
        self.coords.chunks_exact(point.len()).any(|p| p == point)
    }

    pub(crate) fn grow(&mut self) {
        self.capacity = self.capacity.saturating_mul(2);
    }

    /// Moves the bucket into two new leaves around `split_value` on `axis`.
    ///
    /// Returns `None`, leaving the bucket untouched, when either side would be
    /// empty. The new leaves start from `bucket_size`, doubled only as far as
    /// their own points require, so a grown bucket does not pass its capacity on.
    pub(crate) fn partition(
        &mut self,
        axis: usize,
        split_value: T,
        dims: usize,
        bucket_size: usize,
    ) -> Option<(Self, Self)> {
        let right_count = self
            .coords
            .chunks_exact(dims)
            .filter(|p| p[axis] > split_value)
            .count();
        if right_count == 0 || right_count == self.len() {
            return None;
        }

        let left_capacity = fitted_capacity(bucket_size, self.len() - right_count);
        let right_capacity = fitted_capacity(bucket_size, right_count);
        let mut left_coords = Vec::with_capacity(left_capacity * dims);
        let mut left_payloads = Vec::with_capacity(left_capacity);
        let mut right_coords = Vec::with_capacity(right_capacity * dims);
        let mut right_payloads = Vec::with_capacity(right_capacity);

        let coords = std::mem::take(&mut self.coords);
        let payloads = std::mem::take(&mut self.payloads);
        for (point, payload) in coords.chunks_exact(dims).zip(payloads) {
            if point[axis] > split_value {
                right_coords.extend_from_slice(point);
                right_payloads.push(payload);
            } else {
                left_coords.extend_from_slice(point);
                left_payloads.push(payload);
            }
        }

        Some((
            Self::from_parts(left_coords, left_payloads, left_capacity, dims),
            Self::from_parts(right_coords, right_payloads, right_capacity, dims),
        ))
    }
}

/// Smallest `bucket_size * 2^n` that holds `len` points.
fn fitted_capacity(bucket_size: usize, len: usize) -> usize {
    let mut capacity = bucket_size.max(1);
    while capacity < len {
        capacity = capacity.saturating_mul(2);
    }
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_flag() {
        let mut leaf: Leaf<f64, u8> = Leaf::new(4, 2);
        assert!(leaf.singular);
        leaf.push(&[1.0, 2.0], 0);
        leaf.push(&[1.0, 2.0], 1);
        assert!(leaf.singular);
        leaf.push(&[1.0, 2.5], 2);
        assert!(!leaf.singular);
    }

    #[test]
    fn test_nan_point_is_not_singular() {
        let mut leaf: Leaf<f64, u8> = Leaf::new(4, 1);
        leaf.push(&[f64::NAN], 0);
        leaf.push(&[f64::NAN], 1);
        assert!(!leaf.singular);
        assert!(!leaf.contains(&[f64::NAN]));
    }

    #[test]
    fn test_contains_treats_signed_zero_as_equal() {
        let mut leaf: Leaf<f64, u8> = Leaf::new(4, 2);
        leaf.push(&[0.0, 1.0], 0);
        assert!(leaf.contains(&[-0.0, 1.0]));
        assert!(!leaf.contains(&[0.0, 1.5]));
    }

    #[test]
    fn test_partition() {
        let mut leaf: Leaf<f64, char> = Leaf::new(4, 1);
        for (x, c) in [(1.0, 'a'), (5.0, 'b'), (2.0, 'c'), (7.0, 'd')] {
            leaf.push(&[x], c);
        }
        let (left, right) = leaf.partition(0, 3.0, 1, 4).expect("Split should succeed");
        assert_eq!(left.payloads, vec!['a', 'c']);
        assert_eq!(right.payloads, vec!['b', 'd']);
        assert_eq!(left.capacity, 4);
        assert_eq!(leaf.len(), 0);
    }

    #[test]
    fn test_children_of_grown_bucket_shrink_back() {
        let mut leaf: Leaf<f64, usize> = Leaf::new(2, 1);
        for i in 0..10 {
            let x = if i < 9 { 1.0 } else { 5.0 };
            if leaf.is_full() {
                leaf.grow();
            }
            leaf.push(&[x], i);
        }
        assert_eq!(leaf.capacity, 16);
        let (left, right) = leaf.partition(0, 3.0, 1, 2).expect("Split should succeed");
        assert_eq!(left.len(), 9);
        assert_eq!(left.capacity, 16);
        assert!(left.singular);
        assert_eq!(right.len(), 1);
        assert_eq!(right.capacity, 2);
    }

    #[test]
    fn test_fitted_capacity() {
        assert_eq!(fitted_capacity(24, 0), 24);
        assert_eq!(fitted_capacity(24, 24), 24);
        assert_eq!(fitted_capacity(24, 25), 48);
        assert_eq!(fitted_capacity(3, 100), 192);
    }

    #[test]
    fn test_degenerate_partition_keeps_bucket() {
        let mut leaf: Leaf<f64, char> = Leaf::new(2, 1);
        leaf.push(&[1.0], 'a');
        leaf.push(&[2.0], 'b');
        assert!(leaf.partition(0, 2.0, 1, 2).is_none());
        assert_eq!(leaf.len(), 2);
        leaf.grow();
        assert_eq!(leaf.capacity, 4);
    }
}
