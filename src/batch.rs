use crate::distance::DistanceMetric;
use crate::error::{ErrorKind, Result, check_buffer};
use crate::kdtree::KdTree;
use num_traits::Float;
use rayon::prelude::*;

/// Parallel queries over a flat buffer of query points.
///
/// Each query runs on the rayon pool. Every worker keeps one traversal stack
/// for all the queries it handles.
impl<T, P> KdTree<T, P>
where
    T: Float + Send + Sync,
    P: Sync,
{
    /// Nearest neighbour of every query in `queries` (stride `dimensions()`).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::PartialPoint`] if the buffer ends with a partial point.
    pub fn par_nearest_neighbour<M>(&self, queries: &[T], metric: &M) -> Result<Vec<Option<(T, &P)>>>
    where
        M: DistanceMetric<T> + Sync,
    {
        check_buffer(queries, self.dims)?;
        Ok(queries
            .par_chunks(self.dims)
            .map_init(Vec::new, |stack, query| {
                self.nearest_in(query, metric, |_| true, stack)
            })
            .collect())
    }

    /// The `k` nearest neighbours of every query in `queries`.
    pub fn par_nearest_neighbours<M>(
        &self,
        queries: &[T],
        k: usize,
        sorted: bool,
        metric: &M,
    ) -> Result<Vec<Vec<(T, &P)>>>
    where
        M: DistanceMetric<T> + Sync,
    {
        if k == 0 {
            return Err(ErrorKind::InvalidNeighbourCount);
        }
        check_buffer(queries, self.dims)?;
        Ok(queries
            .par_chunks(self.dims)
            .map_init(Vec::new, |stack, query| {
                self.nearest_k_in(query, k, sorted, metric, |_| true, stack)
            })
            .collect())
    }

    /// Every stored point within `radius` of each query in `queries`.
    pub fn par_within<M>(
        &self,
        queries: &[T],
        radius: T,
        metric: &M,
        sorted: bool,
    ) -> Result<Vec<Vec<(T, &P)>>>
    where
        M: DistanceMetric<T> + Sync,
    {
        if !(radius >= T::zero()) {
            return Err(ErrorKind::InvalidRadius);
        }
        check_buffer(queries, self.dims)?;
        Ok(queries
            .par_chunks(self.dims)
            .map_init(Vec::new, |stack, query| {
                self.within_in(query, radius, metric, sorted, stack)
            })
            .collect())
    }
}
