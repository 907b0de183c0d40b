use num_traits::Float;

/// Chooses the threshold used to split a full leaf along its widest axis.
///
/// Implementations should return a value strictly between `min` and `max`.
/// A value that fails to separate the bucket is harmless: the leaf keeps its
/// points and doubles its capacity instead.
pub trait SplitStrategy<T: Float>: Send + Sync + std::fmt::Debug {
    fn split_value(&self, min: T, max: T) -> T;
}

/// Splits halfway between the bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Midpoint;

impl<T: Float> SplitStrategy<T> for Midpoint {
    #[inline]
    fn split_value(&self, min: T, max: T) -> T {
        // Halve before adding: `max - min` overflows for finite bounds of
        // opposite sign near the type's limits.
        let two = T::one() + T::one();
        min / two + max / two
    }
}

/// Splits at a fixed fraction of the way from `min` to `max`.
///
/// The fraction is clamped into the open interval `(0, 1)` when the strategy is
/// created.
#[derive(Clone, Copy, Debug)]
pub struct Fraction(f64);

impl Fraction {
    pub fn new(fraction: f64) -> Self {
        let clamped = if fraction.is_nan() {
            0.5
        } else {
            fraction.clamp(f64::EPSILON, 1.0 - f64::EPSILON)
        };
        Fraction(clamped)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl<T: Float> SplitStrategy<T> for Fraction {
    #[inline]
    fn split_value(&self, min: T, max: T) -> T {
        let f = T::from(self.0).unwrap_or_else(|| T::one() / (T::one() + T::one()));
        // A weighted mean of the bounds never leaves the finite range.
        min * (T::one() - f) + max * f
    }
}
