use crate::bounds::BoundingBox;
use crate::error::{NeighborError, Result};
use crate::metric::{Coordinate, Metric};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const NO_CHILD: usize = usize::MAX;

/// A support point found by a query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor<T> {
    /// Index of the support point in the slice the index was built over.
    pub index: usize,
    /// Distance between the query and the support point.
    pub distance: T,
}

/// Construction options for [`KdTree`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexConfig {
    /// Maximum number of points stored in a leaf.
    pub leaf_size: usize,
    /// Distance function used for queries.
    pub metric: Metric,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            leaf_size: 16,
            metric: Metric::Euclidean,
        }
    }
}

impl IndexConfig {
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

#[derive(Clone, Debug)]
struct KdNode<T> {
    bounds: BoundingBox<T>,
    left: usize, // NO_CHILD if leaf
    right: usize,
    // Leaf data: indices[start..end]
    start: usize,
    end: usize,
    // Internal node data
    split_val: T,
    axis: usize,
}

/// Balanced kd-tree over a borrowed, flattened point set.
///
/// The tree never copies coordinates: it keeps a permutation of point indices and
/// reads positions from the borrowed slice. It is immutable once built and can be
/// queried concurrently from many threads.
pub struct KdTree<'a, T: Coordinate> {
    points: &'a [T],
    dim: usize,
    config: IndexConfig,
    nodes: Vec<KdNode<T>>,
    indices: Vec<usize>,
}

impl<'a, T: Coordinate> KdTree<'a, T> {
    /// Builds an index over `points`, laid out as `[x0, y0, .., x1, y1, ..]` with `dim`
    /// coordinates per point.
    pub fn build(points: &'a [T], dim: usize) -> Result<Self> {
        Self::with_config(points, dim, IndexConfig::default())
    }

    pub fn with_config(points: &'a [T], dim: usize, config: IndexConfig) -> Result<Self> {
        if dim == 0 {
            return Err(NeighborError::InvalidParameter("dimension must be at least 1".into()));
        }
        if config.leaf_size == 0 {
            return Err(NeighborError::InvalidParameter("leaf size must be at least 1".into()));
        }
        check_flat_len(points.len(), dim, "supports")?;

        let count = points.len() / dim;
        let mut tree = KdTree {
            points,
            dim,
            config,
            nodes: Vec::new(),
            indices: (0..count).collect(),
        };

        if count == 0 {
            return Ok(tree);
        }

        // A balanced tree has roughly 2 * N / leaf_size nodes
        tree.nodes.reserve(2 * count.div_ceil(config.leaf_size));
        tree.build_recursive(0, count);
        Ok(tree)
    }

    fn build_recursive(&mut self, start: usize, end: usize) -> usize {
        let count = end - start;
        let bounds = BoundingBox::enclosing(self.points, self.dim, &self.indices[start..end]);

        if count <= self.config.leaf_size {
            let node_idx = self.nodes.len();
            self.nodes.push(KdNode {
                bounds,
                left: NO_CHILD,
                right: NO_CHILD,
                start,
                end,
                split_val: T::zero(),
                axis: 0,
            });
            return node_idx;
        }

        let axis = bounds.widest_axis();
        let dim = self.dim;
        let points = self.points;

        // Median split
        let mid = start + count / 2;
        self.indices[start..end].select_nth_unstable_by(count / 2, |&a, &b| {
            let va = points[a * dim + axis];
            let vb = points[b * dim + axis];
            va.partial_cmp(&vb).unwrap_or(Ordering::Equal)
        });
        let split_val = points[self.indices[mid] * dim + axis];

        let left = self.build_recursive(start, mid);
        let right = self.build_recursive(mid, end);

        let node_idx = self.nodes.len();
        self.nodes.push(KdNode {
            bounds,
            left,
            right,
            start: 0,
            end: 0,
            split_val,
            axis,
        });
        node_idx
    }

    /// Number of coordinates per point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn metric(&self) -> Metric {
        self.config.metric
    }

    /// Coordinates of the indexed point `index`.
    pub fn point(&self, index: usize) -> &[T] {
        &self.points[index * self.dim..(index + 1) * self.dim]
    }

    /// All points within `radius` of `query` (inclusive), in traversal order.
    ///
    /// A negative or NaN radius is an [`NeighborError::InvalidParameter`].
    pub fn radius_search(&self, query: &[T], radius: T) -> Result<Vec<Neighbor<T>>> {
        let mut out = Vec::new();
        self.radius_search_into(query, radius, &mut out)?;
        Ok(out)
    }

    /// Same as [`KdTree::radius_search`], reusing `out` as the result buffer.
    pub fn radius_search_into(&self, query: &[T], radius: T, out: &mut Vec<Neighbor<T>>) -> Result<()> {
        self.check_query(query)?;
        if radius.is_nan() || radius < T::zero() {
            return Err(NeighborError::InvalidParameter(format!(
                "radius must be non-negative, got {:?}",
                radius
            )));
        }
        out.clear();
        if self.nodes.is_empty() {
            return Ok(());
        }

        let metric = self.config.metric;
        let limit = metric.to_reduced(radius);
        // Root is the last node pushed in our recursive build
        self.radius_recursive(self.nodes.len() - 1, query, limit, out);

        for n in out.iter_mut() {
            n.distance = metric.from_reduced(n.distance);
        }
        Ok(())
    }

    fn radius_recursive(&self, node_idx: usize, query: &[T], limit: T, out: &mut Vec<Neighbor<T>>) {
        let node = &self.nodes[node_idx];
        let metric = self.config.metric;

        if node.bounds.reduced_distance(query, metric) > limit {
            return;
        }

        // Leaf
        if node.left == NO_CHILD {
            for &idx in &self.indices[node.start..node.end] {
                let d = metric.reduced(query, self.point(idx));
                if d <= limit {
                    out.push(Neighbor { index: idx, distance: d });
                }
            }
            return;
        }

        // Visit nearest child first
        let diff = query[node.axis] - node.split_val;
        let (first, second) = if diff <= T::zero() { (node.left, node.right) } else { (node.right, node.left) };

        self.radius_recursive(first, query, limit, out);
        if metric.axis_term(diff) <= limit {
            self.radius_recursive(second, query, limit, out);
        }
    }

    /// The `k` points closest to `query`, ascending by distance, ties broken by index.
    ///
    /// Returns fewer than `k` points only when the index holds fewer than `k` points.
    pub fn k_nearest(&self, query: &[T], k: usize) -> Result<Vec<Neighbor<T>>> {
        let mut out = Vec::new();
        self.k_nearest_into(query, k, &mut out)?;
        Ok(out)
    }

    /// Same as [`KdTree::k_nearest`], reusing `out` as the result buffer.
    pub fn k_nearest_into(&self, query: &[T], k: usize, out: &mut Vec<Neighbor<T>>) -> Result<()> {
        self.check_query(query)?;
        out.clear();
        if self.nodes.is_empty() || k == 0 {
            return Ok(());
        }

        let mut heap = BinaryHeap::with_capacity(k.min(self.len()) + 1);
        self.knn_recursive(self.nodes.len() - 1, query, k, &mut heap);

        let metric = self.config.metric;
        out.extend(heap.into_sorted_vec().into_iter().map(|c| Neighbor {
            index: c.index,
            distance: metric.from_reduced(c.reduced),
        }));
        Ok(())
    }

    fn knn_recursive(&self, node_idx: usize, query: &[T], k: usize, heap: &mut BinaryHeap<Candidate<T>>) {
        let node = &self.nodes[node_idx];
        let metric = self.config.metric;

        // Equal distances are still visited: a lower index may win the tie.
        if heap.len() == k {
            if let Some(worst) = heap.peek() {
                if node.bounds.reduced_distance(query, metric) > worst.reduced {
                    return;
                }
            }
        }

        if node.left == NO_CHILD {
            for &idx in &self.indices[node.start..node.end] {
                let candidate = Candidate { reduced: metric.reduced(query, self.point(idx)), index: idx };
                if heap.len() < k {
                    heap.push(candidate);
                } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                    heap.pop();
                    heap.push(candidate);
                }
            }
            return;
        }

        let diff = query[node.axis] - node.split_val;
        let (first, second) = if diff <= T::zero() { (node.left, node.right) } else { (node.right, node.left) };

        self.knn_recursive(first, query, k, heap);
        self.knn_recursive(second, query, k, heap);
    }

    fn check_query(&self, query: &[T]) -> Result<()> {
        if query.len() != self.dim {
            return Err(NeighborError::DimensionMismatch(format!(
                "query point has {} coordinates, index expects {}",
                query.len(),
                self.dim
            )));
        }
        Ok(())
    }
}

/// Checks that a flat coordinate array holds a whole number of `dim`-dimensional points.
pub(crate) fn check_flat_len(len: usize, dim: usize, what: &str) -> Result<()> {
    if dim == 0 {
        return Err(NeighborError::InvalidParameter("dimension must be at least 1".into()));
    }
    if len % dim != 0 {
        return Err(NeighborError::DimensionMismatch(format!(
            "{} array of length {} is not a multiple of dimension {}",
            what, len, dim
        )));
    }
    Ok(())
}

/// Heap entry ordered by (reduced distance, index), so the max-heap top is the
/// current worst of the k best.
#[derive(Clone, Copy, Debug)]
struct Candidate<T> {
    reduced: T,
    index: usize,
}

impl<T: Coordinate> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Coordinate> Eq for Candidate<T> {}

impl<T: Coordinate> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Coordinate> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.reduced
            .partial_cmp(&other.reduced)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}
