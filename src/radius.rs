use crate::error::Result;
use crate::kdtree::{KdTree, Neighbor};
use crate::metric::Coordinate;
use crate::sampling;
use std::cmp::Ordering;

/// Shapes a raw radius search into a capped and optionally sorted neighbor list.
#[derive(Clone, Copy, Debug)]
pub struct RadiusQuery<T> {
    pub radius: T,
    /// 0 = unbounded.
    pub max_num: usize,
    pub sorted: bool,
    /// Resolved call seed.
    pub seed: u64,
}

impl<T: Coordinate> RadiusQuery<T> {
    pub fn new(radius: T, max_num: usize, sorted: bool, seed: u64) -> Self {
        Self { radius, max_num, sorted, seed }
    }

    /// Neighbors of `point` into `out`.
    ///
    /// `stream` identifies the query within its cloud and selects the random stream
    /// used when the result has to be capped.
    pub fn run(&self, tree: &KdTree<'_, T>, point: &[T], stream: usize, out: &mut Vec<Neighbor<T>>) -> Result<()> {
        tree.radius_search_into(point, self.radius, out)?;

        sampling::cap_query(out, self.max_num, self.seed, stream as u64);

        // Sorting after capping only pays for the survivors
        if self.sorted {
            sort_by_distance(out);
        }
        Ok(())
    }
}

/// Ascending by distance, ties by index.
pub fn sort_by_distance<T: Coordinate>(neighbors: &mut [Neighbor<T>]) {
    neighbors.sort_unstable_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
}
