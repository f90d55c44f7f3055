use crate::error::Result;
use crate::kdtree::{KdTree, Neighbor};
use crate::metric::Coordinate;

/// Fixed-k nearest neighbor query. Always sorted, never sampled.
#[derive(Clone, Copy, Debug)]
pub struct KnnQuery {
    pub k: usize,
}

impl KnnQuery {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Up to `k` closest supports of `point`; fewer only when the index is smaller than `k`.
    pub fn run<T: Coordinate>(&self, tree: &KdTree<'_, T>, point: &[T], out: &mut Vec<Neighbor<T>>) -> Result<()> {
        tree.k_nearest_into(point, self.k, out)
    }
}
