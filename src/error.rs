use std::fmt;

/// Caller errors reported by [`KdTree`](crate::KdTree) operations.
///
/// Every variant describes a violated precondition. The tree is left untouched
/// when one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A point or query did not have the tree's number of coordinates.
    DimensionMismatch { expected: usize, found: usize },
    /// A flat coordinate buffer of `len` values did not hold a whole number of
    /// points with `dimensions` coordinates each.
    PartialPoint { dimensions: usize, len: usize },
    /// A tree was requested with zero dimensions.
    ZeroDimensions,
    /// A tree was requested with a bucket size of zero.
    ZeroBucketSize,
    /// A k-nearest-neighbour query asked for zero neighbours.
    InvalidNeighbourCount,
    /// A radius query was given a negative or NaN radius.
    InvalidRadius,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ErrorKind>;

impl std::error::Error for ErrorKind {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorKind::DimensionMismatch { expected, found } => write!(
                f,
                "KdTree error: expected a point with {} coordinates, got {}",
                expected, found
            ),
            ErrorKind::PartialPoint { dimensions, len } => write!(
                f,
                "KdTree error: buffer of {} coordinates does not split into points of {}",
                len, dimensions
            ),
            ErrorKind::ZeroDimensions => write!(f, "KdTree error: zero dimensions"),
            ErrorKind::ZeroBucketSize => write!(f, "KdTree error: zero bucket size"),
            ErrorKind::InvalidNeighbourCount => {
                write!(f, "KdTree error: neighbour count must be positive")
            }
            ErrorKind::InvalidRadius => {
                write!(f, "KdTree error: radius must be non-negative")
            }
        }
    }
}

/// Fails with [`ErrorKind::PartialPoint`] unless `coords` holds whole points.
pub(crate) fn check_buffer<T>(coords: &[T], dims: usize) -> Result<()> {
    if coords.len() % dims == 0 {
        Ok(())
    } else {
        Err(ErrorKind::PartialPoint {
            dimensions: dims,
            len: coords.len(),
        })
    }
}

/// Fails with [`ErrorKind::DimensionMismatch`] unless `point` has `dims` coordinates.
pub(crate) fn check_dimensions<T>(point: &[T], dims: usize) -> Result<()> {
    if point.len() == dims {
        Ok(())
    } else {
        Err(ErrorKind::DimensionMismatch {
            expected: dims,
            found: point.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_check() {
        assert_eq!(check_dimensions(&[1.0, 2.0, 3.0], 3), Ok(()));
        assert_eq!(
            check_dimensions(&[1.0, 2.0], 3),
            Err(ErrorKind::DimensionMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_buffer_check() {
        assert_eq!(check_buffer(&[0.0; 6], 3), Ok(()));
        assert_eq!(check_buffer::<f64>(&[], 3), Ok(()));
        assert_eq!(
            check_buffer(&[0.0; 7], 3),
            Err(ErrorKind::PartialPoint { dimensions: 3, len: 7 })
        );
    }

    #[test]
    fn test_display_mentions_counts() {
        let msg = ErrorKind::DimensionMismatch { expected: 3, found: 4 }.to_string();
        assert!(msg.contains('3') && msg.contains('4'), "Unexpected message: {}", msg);
    }
}
