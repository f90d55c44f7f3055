//! Search configuration.

use crate::error::{NeighborError, Result};
use crate::metric::{Coordinate, Metric};
use num_traits::NumCast;

/// Output encoding of a radius search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Mode 0: concatenated neighbors plus per-query offsets.
    #[default]
    Variable,
    /// Mode 1: one fixed-width row per query, padded with sentinels.
    Padded,
}

impl TryFrom<i32> for OutputMode {
    type Error = NeighborError;

    fn try_from(mode: i32) -> Result<Self> {
        match mode {
            0 => Ok(OutputMode::Variable),
            1 => Ok(OutputMode::Padded),
            other => Err(NeighborError::InvalidParameter(format!("unsupported mode {}", other))),
        }
    }
}

/// Parameters of a radius search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusParams {
    /// Search radius, inclusive. Must be finite and non-negative.
    pub radius: f64,
    /// Maximum number of neighbors reported per query, 0 = unbounded.
    pub max_num: usize,
    pub mode: OutputMode,
    /// Order each query's neighbors by ascending distance.
    pub sorted: bool,
    /// Seed of the capping subsample. `None` draws a fresh seed per call.
    pub random_seed: Option<u64>,
    pub metric: Metric,
}

impl Default for RadiusParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            max_num: 0,
            mode: OutputMode::Variable,
            sorted: false,
            random_seed: Some(0),
            metric: Metric::Euclidean,
        }
    }
}

impl RadiusParams {
    pub fn new(radius: f64) -> Self {
        Self { radius, ..Self::default() }
    }

    pub fn with_max_num(mut self, max_num: usize) -> Self {
        self.max_num = max_num;
        self
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    pub fn with_random_seed(mut self, random_seed: Option<u64>) -> Self {
        self.random_seed = random_seed;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Checks the radius and converts it to the coordinate type.
    pub fn radius_as<T: Coordinate>(&self) -> Result<T> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(NeighborError::InvalidParameter(format!(
                "radius must be finite and non-negative, got {}",
                self.radius
            )));
        }
        <T as NumCast>::from(self.radius).ok_or_else(|| {
            NeighborError::InvalidParameter(format!("radius {} is not representable", self.radius))
        })
    }
}

/// Parameters of a k-nearest search.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KnnParams {
    /// Number of neighbors per query; also the output row width.
    pub k: usize,
    pub metric: Metric,
}

impl KnnParams {
    pub fn new(k: usize) -> Self {
        Self { k, metric: Metric::Euclidean }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}
