use crate::metric::{Coordinate, Metric};

/// Axis-aligned bounding box of runtime dimension.
#[derive(Clone, Debug)]
pub struct BoundingBox<T> {
    pub min: Vec<T>,
    pub max: Vec<T>,
}

impl<T: Coordinate> BoundingBox<T> {
    pub fn new(min: Vec<T>, max: Vec<T>) -> Self {
        Self { min, max }
    }

    /// Tight box around `points[idx * dim..]` for every `idx` in `indices`.
    pub fn enclosing(points: &[T], dim: usize, indices: &[usize]) -> Self {
        let mut min = vec![T::infinity(); dim];
        let mut max = vec![T::neg_infinity(); dim];

        for &idx in indices {
            let p = &points[idx * dim..(idx + 1) * dim];
            for axis in 0..dim {
                if p[axis] < min[axis] { min[axis] = p[axis]; }
                if p[axis] > max[axis] { max[axis] = p[axis]; }
            }
        }

        Self { min, max }
    }

    /// Axis with the largest extent, first one on ties.
    pub fn widest_axis(&self) -> usize {
        let mut best = 0;
        let mut best_extent = T::neg_infinity();
        for axis in 0..self.min.len() {
            let extent = self.max[axis] - self.min[axis];
            if extent > best_extent {
                best = axis;
                best_extent = extent;
            }
        }
        best
    }

    /// Lower bound of the reduced distance from `point` to any point inside the box.
    pub fn reduced_distance(&self, point: &[T], metric: Metric) -> T {
        let mut acc = T::zero();
        for axis in 0..self.min.len() {
            let v = point[axis];
            let gap = if v < self.min[axis] {
                self.min[axis] - v
            } else if v > self.max[axis] {
                v - self.max[axis]
            } else {
                continue;
            };
            acc = metric.accumulate(acc, metric.axis_term(gap));
        }
        acc
    }
}
