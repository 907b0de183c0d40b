use num_traits::Float;

/// A distance function usable by the tree's queries.
///
/// `distance_to_bounds` must be a lower bound of `distance` from `point` to every
/// point inside the box, measured in the same units. Pruning is only correct if
/// that holds. A NaN box axis must contribute nothing to the lower bound.
pub trait DistanceMetric<T: Float> {
    /// Distance between two points of equal length.
    fn distance(&self, a: &[T], b: &[T]) -> T;

    /// Lower bound of the distance from `point` to any point in the box `[min, max]`.
    fn distance_to_bounds(&self, point: &[T], min: &[T], max: &[T]) -> T;
}

impl<T: Float, M: DistanceMetric<T> + ?Sized> DistanceMetric<T> for &M {
    #[inline]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        (**self).distance(a, b)
    }

    #[inline]
    fn distance_to_bounds(&self, point: &[T], min: &[T], max: &[T]) -> T {
        (**self).distance_to_bounds(point, min, max)
    }
}

/// Gap between `v` and the interval `[lo, hi]` along one axis.
///
/// Zero inside the interval, and zero whenever a comparison involves NaN.
#[inline(always)]
fn axis_gap<T: Float>(v: T, lo: T, hi: T) -> T {
    if v < lo {
        lo - v
    } else if v > hi {
        v - hi
    } else {
        T::zero()
    }
}

/// Squared Euclidean distance. Radii passed alongside it are squared as well.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredEuclidean;

impl<T: Float> DistanceMetric<T> for SquaredEuclidean {
    #[inline]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| {
                let diff = x - y;
                diff * diff
            })
            .fold(T::zero(), |acc, x| acc + x)
    }

    #[inline]
    fn distance_to_bounds(&self, point: &[T], min: &[T], max: &[T]) -> T {
        point
            .iter()
            .zip(min.iter().zip(max))
            .map(|(&v, (&lo, &hi))| {
                let gap = axis_gap(v, lo, hi);
                gap * gap
            })
            .fold(T::zero(), |acc, x| acc + x)
    }
}

/// Squared Euclidean distance with a multiplier per dimension.
#[derive(Clone, Debug)]
pub struct WeightedSquaredEuclidean<T> {
    weights: Vec<T>,
}

impl<T: Float> WeightedSquaredEuclidean<T> {
    pub fn new(weights: Vec<T>) -> Self {
        Self { weights }
    }

    /// Builds the weights by calling `weight` for each dimension.
    pub fn from_fn(dimensions: usize, weight: impl Fn(usize) -> f64) -> Self {
        let weights = (0..dimensions)
            .map(|i| T::from(weight(i)).unwrap_or_else(T::one))
            .collect();
        Self { weights }
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }
}

impl<T: Float> DistanceMetric<T> for WeightedSquaredEuclidean<T> {
    #[inline]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b)
            .zip(&self.weights)
            .map(|((&x, &y), &w)| {
                let diff = x - y;
                diff * diff * w
            })
            .fold(T::zero(), |acc, x| acc + x)
    }

    #[inline]
    fn distance_to_bounds(&self, point: &[T], min: &[T], max: &[T]) -> T {
        point
            .iter()
            .zip(min.iter().zip(max))
            .zip(&self.weights)
            .map(|((&v, (&lo, &hi)), &w)| {
                let gap = axis_gap(v, lo, hi);
                gap * gap * w
            })
            .fold(T::zero(), |acc, x| acc + x)
    }
}

/// Manhattan (L1) distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Manhattan;

impl<T: Float> DistanceMetric<T> for Manhattan {
    #[inline]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| (x - y).abs())
            .fold(T::zero(), |acc, x| acc + x)
    }

    #[inline]
    fn distance_to_bounds(&self, point: &[T], min: &[T], max: &[T]) -> T {
        point
            .iter()
            .zip(min.iter().zip(max))
            .map(|(&v, (&lo, &hi))| axis_gap(v, lo, hi))
            .fold(T::zero(), |acc, x| acc + x)
    }
}
