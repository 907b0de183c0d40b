use crate::distance::DistanceMetric;
use crate::error::{ErrorKind, Result, check_dimensions};
use crate::heap::BoundedHeap;
use crate::kdtree::KdTree;
use crate::node::{Leaf, NodeKind, ROOT};
use num_traits::Float;
use std::cmp::Ordering;

/// Traversal state of one stem on the descent path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Status {
    None,
    LeftVisited,
    RightVisited,
    AllVisited,
}

/// Receives candidates found during a traversal and supplies the pruning
/// threshold: subtrees whose lower-bound distance exceeds it are skipped.
pub(crate) trait Collector<'a, T, P: 'a> {
    fn threshold(&self) -> T;
    fn accept(&mut self, distance: T, point: &'a [T], payload: &'a P);
}

/// Best single candidate passing a payload filter.
struct Nearest<'a, T, P, F> {
    best: Option<(T, &'a P)>,
    filter: F,
}

impl<'a, T: Float, P, F: FnMut(&P) -> bool> Collector<'a, T, P> for Nearest<'a, T, P, F> {
    fn threshold(&self) -> T {
        self.best.map_or_else(T::infinity, |(d, _)| d)
    }

    fn accept(&mut self, distance: T, _point: &'a [T], payload: &'a P) {
        // Also rejects NaN.
        if !(distance < self.threshold() || (self.best.is_none() && distance == T::infinity())) {
            return;
        }
        if (self.filter)(payload) {
            self.best = Some((distance, payload));
        }
    }
}

/// The `k` best candidates passing a payload filter.
struct KNearest<'a, T, P, F> {
    heap: BoundedHeap<T, &'a P>,
    filter: F,
}

impl<'a, T: Float, P, F: FnMut(&P) -> bool> Collector<'a, T, P> for KNearest<'a, T, P, F> {
    fn threshold(&self) -> T {
        self.heap.threshold()
    }

    fn accept(&mut self, distance: T, _point: &'a [T], payload: &'a P) {
        if self.heap.is_full() && !(distance < self.heap.threshold()) {
            return;
        }
        if (self.filter)(payload) {
            self.heap.offer(distance, payload);
        }
    }
}

/// Everything within a fixed radius, handed to a sink.
struct Within<T, S> {
    radius: T,
    sink: S,
    found: usize,
}

impl<'a, T: Float + 'a, P: 'a, S: FnMut(T, &'a [T], &'a P)> Collector<'a, T, P> for Within<T, S> {
    fn threshold(&self) -> T {
        self.radius
    }

    fn accept(&mut self, distance: T, point: &'a [T], payload: &'a P) {
        if distance <= self.radius {
            (self.sink)(distance, point, payload);
            self.found += 1;
        }
    }
}

fn sort_by_distance<T: Float, I>(results: &mut [(T, I)]) {
    results.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
}

impl<T: Float, P> KdTree<T, P> {
    /// Finds the stored point nearest to `query`.
    ///
    /// Returns the distance and the payload, or `None` if the tree is empty or
    /// every candidate distance is NaN (for example a NaN query).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DimensionMismatch`] if `query` has the wrong length.
    pub fn nearest_neighbour<M>(&self, query: &[T], metric: &M) -> Result<Option<(T, &P)>>
    where
        M: DistanceMetric<T>,
    {
        self.nearest_neighbour_filtered(query, metric, |_| true)
    }

    /// Like [`nearest_neighbour`](Self::nearest_neighbour), but skips payloads
    /// for which `filter` returns `false`.
    pub fn nearest_neighbour_filtered<M, F>(
        &self,
        query: &[T],
        metric: &M,
        filter: F,
    ) -> Result<Option<(T, &P)>>
    where
        M: DistanceMetric<T>,
        F: FnMut(&P) -> bool,
    {
        check_dimensions(query, self.dims)?;
        Ok(self.nearest_in(query, metric, filter, &mut Vec::new()))
    }

    /// Finds the `k` stored points nearest to `query`.
    ///
    /// With `sorted` the results come nearest first, otherwise in no particular
    /// order. Fewer than `k` results are returned when the tree holds fewer
    /// points; none when every distance is NaN.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidNeighbourCount`] if `k` is zero,
    /// [`ErrorKind::DimensionMismatch`] if `query` has the wrong length.
    pub fn nearest_neighbours<M>(
        &self,
        query: &[T],
        k: usize,
        sorted: bool,
        metric: &M,
    ) -> Result<Vec<(T, &P)>>
    where
        M: DistanceMetric<T>,
    {
        self.nearest_neighbours_filtered(query, k, sorted, metric, |_| true)
    }

    /// Like [`nearest_neighbours`](Self::nearest_neighbours), but skips payloads
    /// for which `filter` returns `false`.
    pub fn nearest_neighbours_filtered<M, F>(
        &self,
        query: &[T],
        k: usize,
        sorted: bool,
        metric: &M,
        filter: F,
    ) -> Result<Vec<(T, &P)>>
    where
        M: DistanceMetric<T>,
        F: FnMut(&P) -> bool,
    {
        if k == 0 {
            return Err(ErrorKind::InvalidNeighbourCount);
        }
        check_dimensions(query, self.dims)?;
        Ok(self.nearest_k_in(query, k, sorted, metric, filter, &mut Vec::new()))
    }

    /// Calls `sink(distance, point, payload)` for every stored point within
    /// `radius` of `query`, boundary included, and returns how many there were.
    ///
    /// The radius is measured by `metric`, so it is a squared radius for
    /// [`SquaredEuclidean`](crate::SquaredEuclidean).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidRadius`] if `radius` is negative or NaN,
    /// [`ErrorKind::DimensionMismatch`] if `query` has the wrong length.
    pub fn find_neighbours<'a, M, S>(
        &'a self,
        query: &[T],
        radius: T,
        metric: &M,
        sink: S,
    ) -> Result<usize>
    where
        M: DistanceMetric<T>,
        S: FnMut(T, &'a [T], &'a P),
    {
        if !(radius >= T::zero()) {
            return Err(ErrorKind::InvalidRadius);
        }
        check_dimensions(query, self.dims)?;
        let mut collector = Within {
            radius,
            sink,
            found: 0,
        };
        self.search(query, metric, &mut collector, &mut Vec::new());
        Ok(collector.found)
    }

    /// Collects every stored point within `radius` of `query`, nearest first when
    /// `sorted` is set.
    pub fn within<M>(&self, query: &[T], radius: T, metric: &M, sorted: bool) -> Result<Vec<(T, &P)>>
    where
        M: DistanceMetric<T>,
    {
        if !(radius >= T::zero()) {
            return Err(ErrorKind::InvalidRadius);
        }
        check_dimensions(query, self.dims)?;
        Ok(self.within_in(query, radius, metric, sorted, &mut Vec::new()))
    }

    pub(crate) fn within_in<'a, M>(
        &'a self,
        query: &[T],
        radius: T,
        metric: &M,
        sorted: bool,
        stack: &mut Vec<Status>,
    ) -> Vec<(T, &'a P)>
    where
        M: DistanceMetric<T>,
    {
        let mut results = Vec::new();
        let mut collector = Within {
            radius,
            sink: |d, _: &'a [T], payload: &'a P| results.push((d, payload)),
            found: 0,
        };
        self.search(query, metric, &mut collector, stack);
        if sorted {
            sort_by_distance(&mut results);
        }
        results
    }

    pub(crate) fn nearest_in<'a, M, F>(
        &'a self,
        query: &[T],
        metric: &M,
        filter: F,
        stack: &mut Vec<Status>,
    ) -> Option<(T, &'a P)>
    where
        M: DistanceMetric<T>,
        F: FnMut(&P) -> bool,
    {
        let mut collector = Nearest { best: None, filter };
        self.search(query, metric, &mut collector, stack);
        collector.best
    }

    pub(crate) fn nearest_k_in<'a, M, F>(
        &'a self,
        query: &[T],
        k: usize,
        sorted: bool,
        metric: &M,
        filter: F,
        stack: &mut Vec<Status>,
    ) -> Vec<(T, &'a P)>
    where
        M: DistanceMetric<T>,
        F: FnMut(&P) -> bool,
    {
        let mut collector = KNearest {
            heap: BoundedHeap::new(k.min(self.len())),
            filter,
        };
        if collector.heap.capacity() == 0 {
            return Vec::new();
        }
        self.search(query, metric, &mut collector, stack);
        if sorted {
            collector.heap.into_sorted_vec()
        } else {
            collector.heap.into_vec()
        }
    }

    /// Depth-first traversal driven by an explicit stack of per-depth status
    /// values instead of recursion.
    ///
    /// The near child of each stem is always explored first. The far child is
    /// entered only if its bounding box may hold something closer than the
    /// collector's current threshold.
    pub(crate) fn search<'a, M, C>(&'a self, query: &[T], metric: &M, collector: &mut C, stack: &mut Vec<Status>)
    where
        M: DistanceMetric<T>,
        C: Collector<'a, T, P>,
    {
        if self.is_empty() {
            return;
        }
        stack.clear();
        stack.resize(self.max_depth + 1, Status::None);

        let mut id = ROOT;
        let mut depth = 0;
        loop {
            let node = &self.nodes[id];
            let next = match &node.kind {
                NodeKind::Leaf(leaf) => {
                    self.scan_leaf(leaf, query, metric, collector);
                    None
                }
                NodeKind::Stem(stem) => match stack[depth] {
                    Status::None => {
                        if stem.goes_right(query) {
                            stack[depth] = Status::RightVisited;
                            Some(stem.right)
                        } else {
                            stack[depth] = Status::LeftVisited;
                            Some(stem.left)
                        }
                    }
                    Status::LeftVisited => {
                        stack[depth] = Status::AllVisited;
                        self.unless_pruned(stem.right, query, metric, collector.threshold())
                    }
                    Status::RightVisited => {
                        stack[depth] = Status::AllVisited;
                        self.unless_pruned(stem.left, query, metric, collector.threshold())
                    }
                    Status::AllVisited => None,
                },
            };

            match next {
                Some(child) => {
                    id = child;
                    depth += 1;
                    stack[depth] = Status::None;
                }
                None => match node.parent {
                    Some(parent) => {
                        id = parent;
                        depth -= 1;
                    }
                    None => break,
                },
            }
        }
    }

    /// Returns `child` unless its box lies farther away than `threshold`.
    /// A NaN lower bound never prunes.
    #[inline]
    fn unless_pruned<M>(&self, child: usize, query: &[T], metric: &M, threshold: T) -> Option<usize>
    where
        M: DistanceMetric<T>,
    {
        let bounds = &self.nodes[child].bounds;
        if metric.distance_to_bounds(query, &bounds.min, &bounds.max) > threshold {
            None
        } else {
            Some(child)
        }
    }

    fn scan_leaf<'a, M, C>(&'a self, leaf: &'a Leaf<T, P>, query: &[T], metric: &M, collector: &mut C)
    where
        M: DistanceMetric<T>,
        C: Collector<'a, T, P>,
    {
        if leaf.singular {
            // One distance serves the whole bucket.
            let Some(first) = leaf.first_point(self.dims) else {
                return;
            };
            let distance = metric.distance(query, first);
            for payload in &leaf.payloads {
                collector.accept(distance, first, payload);
            }
        } else {
            for (point, payload) in leaf.iter(self.dims) {
                collector.accept(metric.distance(query, point), point, payload);
            }
        }
    }
}
