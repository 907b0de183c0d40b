use num_traits::Float;

/// Axis-aligned bounding box of a subtree, in any number of dimensions.
///
/// The box only ever grows. A NaN coordinate poisons the affected axis: both its
/// `min` and `max` become NaN and stay NaN, which distance metrics treat as
/// "cannot prune" on that axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds<T> {
    pub min: Box<[T]>,
    pub max: Box<[T]>,
}

impl<T: Float> Bounds<T> {
    /// Creates a degenerate box around a single point.
    pub fn from_point(point: &[T]) -> Self {
        Self {
            min: point.into(),
            max: point.into(),
        }
    }

    /// Creates the box around a flat buffer of points with stride `dims`.
    ///
    /// The buffer must hold at least one point.
    pub fn from_points(coords: &[T], dims: usize) -> Self {
        let mut chunks = coords.chunks_exact(dims);
        let mut bounds = match chunks.next() {
            Some(first) => Self::from_point(first),
            None => Self::from_point(&vec![T::nan(); dims]),
        };
        for point in chunks {
            bounds.extend(point);
        }
        bounds
    }

    pub fn dimensions(&self) -> usize {
        self.min.len()
    }

    /// Widens the box to include `point`.
    pub fn extend(&mut self, point: &[T]) {
        for ((lo, hi), &v) in self.min.iter_mut().zip(self.max.iter_mut()).zip(point) {
            if v.is_nan() {
                *lo = v;
                *hi = v;
                continue;
            }
            // Comparisons against a poisoned axis are false, so NaN sticks.
            if v < *lo {
                *lo = v;
            }
            if v > *hi {
                *hi = v;
            }
        }
    }

    /// Width of the box along `axis`, NaN if the axis is poisoned.
    pub fn width(&self, axis: usize) -> T {
        self.max[axis] - self.min[axis]
    }

    /// Returns the axis with the largest weighted width.
    ///
    /// NaN widths count as zero. Ties go to the lowest axis, so a box with no
    /// width at all returns axis 0.
    pub fn widest_axis(&self, weights: &[T]) -> usize {
        let mut best_axis = 0;
        let mut best_width = T::zero();
        for (axis, &weight) in weights.iter().enumerate().take(self.dimensions()) {
            let width = self.width(axis) * weight;
            if width > best_width {
                best_width = width;
                best_axis = axis;
            }
        }
        best_axis
    }

    /// True if `axis` has a usable, strictly positive extent.
    pub fn is_splittable(&self, axis: usize) -> bool {
        self.min[axis] < self.max[axis]
    }

    pub fn contains(&self, point: &[T]) -> bool {
        self.min
            .iter()
            .zip(self.max.iter())
            .zip(point)
            .all(|((&lo, &hi), &v)| lo.is_nan() || (v >= lo && v <= hi))
    }
}
