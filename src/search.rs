//! Public search entry points and the per-cloud orchestration behind them.

use crate::batch::{self, BatchLayout};
use crate::encoder::{FixedWidth, NeighborEncoder, NeighborOutput, PaddedBuffers, VariableLength};
use crate::error::Result;
use crate::kdtree::{check_flat_len, IndexConfig, KdTree, Neighbor};
use crate::knn::KnnQuery;
use crate::metric::{Coordinate, Metric};
use crate::params::{KnnParams, OutputMode, RadiusParams};
use crate::radius::RadiusQuery;
use crate::sampling;
use rayon::prelude::*;
use tracing::{debug, trace};

/// Radius search of every query against one support cloud.
///
/// `queries` and `supports` are flattened with `dim` coordinates per point.
/// `num_neighbors` of the result is the number of neighbor entries written.
pub fn radius_search<T: Coordinate>(
    queries: &[T],
    supports: &[T],
    dim: usize,
    params: &RadiusParams,
) -> Result<NeighborOutput> {
    check_flat_len(queries.len(), dim, "queries")?;
    check_flat_len(supports.len(), dim, "supports")?;
    let q_layout = BatchLayout::single(queries.len() / dim);
    let s_layout = BatchLayout::single(supports.len() / dim);
    run_radius(queries, supports, dim, &q_layout, &s_layout, params)
}

/// Radius search over concatenated clouds; queries of cloud `i` only see supports of
/// cloud `i`.
///
/// The same seed drives every cloud and each query's sampling stream is keyed by its
/// position inside its cloud, so the result equals running [`radius_search`] on each
/// cloud slice and concatenating (with support indices shifted to the global range).
pub fn batch_radius_search<T: Coordinate>(
    queries: &[T],
    supports: &[T],
    q_batches: &BatchLayout,
    s_batches: &BatchLayout,
    dim: usize,
    params: &RadiusParams,
) -> Result<NeighborOutput> {
    check_flat_len(queries.len(), dim, "queries")?;
    check_flat_len(supports.len(), dim, "supports")?;
    run_radius(queries, supports, dim, q_batches, s_batches, params)
}

/// The `params.k` nearest supports of every query, in rows of width `k` padded with
/// sentinels.
pub fn knn_search<T: Coordinate>(
    queries: &[T],
    supports: &[T],
    dim: usize,
    params: &KnnParams,
) -> Result<NeighborOutput> {
    check_flat_len(queries.len(), dim, "queries")?;
    check_flat_len(supports.len(), dim, "supports")?;
    let q_layout = BatchLayout::single(queries.len() / dim);
    let s_layout = BatchLayout::single(supports.len() / dim);
    run_knn(queries, supports, dim, &q_layout, &s_layout, params)
}

/// Batched variant of [`knn_search`].
pub fn batch_knn_search<T: Coordinate>(
    queries: &[T],
    supports: &[T],
    q_batches: &BatchLayout,
    s_batches: &BatchLayout,
    dim: usize,
    params: &KnnParams,
) -> Result<NeighborOutput> {
    check_flat_len(queries.len(), dim, "queries")?;
    check_flat_len(supports.len(), dim, "supports")?;
    run_knn(queries, supports, dim, q_batches, s_batches, params)
}

fn run_radius<T: Coordinate>(
    queries: &[T],
    supports: &[T],
    dim: usize,
    q_layout: &BatchLayout,
    s_layout: &BatchLayout,
    params: &RadiusParams,
) -> Result<NeighborOutput> {
    check_layouts(queries, supports, dim, q_layout, s_layout)?;
    let radius = params.radius_as::<T>()?;
    let seed = sampling::resolve_seed(params.random_seed);

    debug!(
        queries = q_layout.len(),
        supports = s_layout.len(),
        clouds = q_layout.num_clouds(),
        dim,
        radius = params.radius,
        max_num = params.max_num,
        mode = ?params.mode,
        sorted = params.sorted,
        "radius search"
    );

    // A capped padded output has a known size, so reserve it before any index is built
    let padded = match params.mode {
        OutputMode::Padded if params.max_num > 0 => Some(PaddedBuffers::reserve(params.max_num, q_layout.len())?),
        _ => None,
    };

    let query = RadiusQuery::new(radius, params.max_num, params.sorted, seed);
    let rows = search_clouds(queries, supports, dim, q_layout, s_layout, params.metric, |tree, point, i, out| {
        query.run(tree, point, i, out)
    })?;

    match (padded, params.mode) {
        (Some(buffers), _) => Ok(buffers.fill(&rows)),
        (None, OutputMode::Variable) => VariableLength.encode(&rows),
        (None, OutputMode::Padded) => FixedWidth::widest().encode(&rows),
    }
}

fn run_knn<T: Coordinate>(
    queries: &[T],
    supports: &[T],
    dim: usize,
    q_layout: &BatchLayout,
    s_layout: &BatchLayout,
    params: &KnnParams,
) -> Result<NeighborOutput> {
    check_layouts(queries, supports, dim, q_layout, s_layout)?;

    debug!(
        queries = q_layout.len(),
        supports = s_layout.len(),
        clouds = q_layout.num_clouds(),
        dim,
        k = params.k,
        "knn search"
    );

    let buffers = PaddedBuffers::reserve(params.k, q_layout.len())?;

    let query = KnnQuery::new(params.k);
    let rows = search_clouds(queries, supports, dim, q_layout, s_layout, params.metric, |tree, point, _, out| {
        query.run(tree, point, out)
    })?;

    Ok(buffers.fill(&rows))
}

fn check_layouts<T>(
    queries: &[T],
    supports: &[T],
    dim: usize,
    q_layout: &BatchLayout,
    s_layout: &BatchLayout,
) -> Result<()> {
    q_layout.check_len(queries.len() / dim, "query")?;
    s_layout.check_len(supports.len() / dim, "support")?;
    batch::check_pair(q_layout, s_layout)
}

/// Builds one index per cloud and answers that cloud's queries against it.
///
/// With at least as many clouds as worker threads the clouds alone are split across the
/// pool and each cloud's queries run sequentially, so a worker holds one index at a time.
/// Fewer clouds than threads also split each cloud's queries across the pool.
///
/// `per_query` receives the cloud's kd-tree, the query point, the query's position inside
/// its cloud and a buffer for the cloud-local result. Rows come back in global query
/// order with support indices shifted into the global support range.
fn search_clouds<T, F>(
    queries: &[T],
    supports: &[T],
    dim: usize,
    q_layout: &BatchLayout,
    s_layout: &BatchLayout,
    metric: Metric,
    per_query: F,
) -> Result<Vec<Vec<Neighbor<T>>>>
where
    T: Coordinate,
    F: Fn(&KdTree<'_, T>, &[T], usize, &mut Vec<Neighbor<T>>) -> Result<()> + Sync,
{
    let config = IndexConfig::default().with_metric(metric);
    let split_queries = q_layout.num_clouds() < rayon::current_num_threads();

    let per_cloud = (0..q_layout.num_clouds())
        .into_par_iter()
        .map(|cloud| -> Result<Vec<Vec<Neighbor<T>>>> {
            let q_range = q_layout.range(cloud);
            let s_range = s_layout.range(cloud);
            let s_start = s_range.start;

            let tree = KdTree::with_config(&supports[s_range.start * dim..s_range.end * dim], dim, config)?;
            let cloud_queries = &queries[q_range.start * dim..q_range.end * dim];

            trace!(cloud, queries = q_range.len(), supports = s_range.len(), split_queries, "searching cloud");

            let answer = |scratch: &mut Vec<Neighbor<T>>, i: usize| -> Result<Vec<Neighbor<T>>> {
                per_query(&tree, &cloud_queries[i * dim..(i + 1) * dim], i, scratch)?;
                Ok(scratch
                    .iter()
                    .map(|n| Neighbor { index: n.index + s_start, distance: n.distance })
                    .collect())
            };

            if split_queries {
                (0..q_range.len())
                    .into_par_iter()
                    .map_init(Vec::new, |scratch, i| answer(scratch, i))
                    .collect()
            } else {
                let mut scratch = Vec::new();
                (0..q_range.len()).map(|i| answer(&mut scratch, i)).collect()
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(per_cloud.into_iter().flatten().collect())
}
