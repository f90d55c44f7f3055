use num_traits::Float;
use std::fmt::Debug;

/// Scalar type of point coordinates.
///
/// Implemented for every `Float` that can be shared across threads, so the same
/// index and query code serves `f32` and `f64` clouds.
pub trait Coordinate: Float + Send + Sync + Debug + 'static {}

impl<T: Float + Send + Sync + Debug + 'static> Coordinate for T {}

/// Distance function used by the index.
///
/// Internally every metric works on a "reduced" distance that is monotonic in the true
/// distance and cheaper to evaluate (the squared distance for `Euclidean`, the distance
/// itself for the others). Reported distances are always true distances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    /// L2 distance.
    #[default]
    Euclidean,
    /// L1 distance.
    Manhattan,
    /// L-infinity distance.
    Chebyshev,
}

impl Metric {
    /// Contribution of a single axis difference to the reduced distance.
    #[inline]
    pub fn axis_term<T: Coordinate>(self, diff: T) -> T {
        match self {
            Metric::Euclidean => diff * diff,
            Metric::Manhattan | Metric::Chebyshev => diff.abs(),
        }
    }

    #[inline]
    pub fn accumulate<T: Coordinate>(self, acc: T, term: T) -> T {
        match self {
            Metric::Chebyshev => acc.max(term),
            Metric::Euclidean | Metric::Manhattan => acc + term,
        }
    }

    /// Reduced distance between two points of equal length.
    #[inline]
    pub fn reduced<T: Coordinate>(self, a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b)
            .fold(T::zero(), |acc, (&x, &y)| self.accumulate(acc, self.axis_term(x - y)))
    }

    /// Converts a true distance into reduced units.
    #[inline]
    pub fn to_reduced<T: Coordinate>(self, distance: T) -> T {
        match self {
            Metric::Euclidean => distance * distance,
            Metric::Manhattan | Metric::Chebyshev => distance,
        }
    }

    /// Converts a reduced distance back into a true distance.
    #[inline]
    pub fn from_reduced<T: Coordinate>(self, reduced: T) -> T {
        match self {
            Metric::Euclidean => reduced.sqrt(),
            Metric::Manhattan | Metric::Chebyshev => reduced,
        }
    }

    /// True distance between two points of equal length.
    pub fn distance<T: Coordinate>(self, a: &[T], b: &[T]) -> T {
        self.from_reduced(self.reduced(a, b))
    }
}
