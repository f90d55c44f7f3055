//! Flat output encodings of per-query neighbor lists.

use crate::error::{NeighborError, Result};
use crate::kdtree::Neighbor;
use crate::metric::Coordinate;

/// Index written into unused slots of a padded row.
pub const SENTINEL_INDEX: i64 = -1;
/// Distance written into unused slots of a padded row.
pub const SENTINEL_DIST: f32 = -1.0;

/// How `indices` and `dists` of a [`NeighborOutput`] are laid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Query `q` owns `indices[offsets[q]..offsets[q + 1]]`; `offsets` has one entry
    /// more than there are queries.
    Offsets(Vec<usize>),
    /// Query `q` owns `indices[q * width..(q + 1) * width]`, padded with sentinels.
    Padded { width: usize },
}

/// Flattened neighbors of all queries, in query order.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborOutput {
    /// Support indices, in the caller's support index space.
    pub indices: Vec<i64>,
    /// Distances aligned with `indices`.
    pub dists: Vec<f32>,
    pub layout: Layout,
    pub num_queries: usize,
    /// Number of real (non-sentinel) entries written.
    pub num_neighbors: usize,
}

impl NeighborOutput {
    /// Valid `(index, distance)` pairs of query `q`, sentinels stripped.
    pub fn row(&self, q: usize) -> Vec<(i64, f32)> {
        let range = match &self.layout {
            Layout::Offsets(offsets) => offsets[q]..offsets[q + 1],
            Layout::Padded { width } => q * width..(q + 1) * width,
        };
        self.indices[range.clone()]
            .iter()
            .zip(&self.dists[range])
            .filter(|(idx, _)| **idx != SENTINEL_INDEX)
            .map(|(&idx, &d)| (idx, d))
            .collect()
    }

    /// Number of valid neighbors per query.
    pub fn counts(&self) -> Vec<usize> {
        match &self.layout {
            Layout::Offsets(offsets) => offsets.windows(2).map(|w| w[1] - w[0]).collect(),
            Layout::Padded { width: 0 } => vec![0; self.num_queries],
            Layout::Padded { width } => self
                .indices
                .chunks(*width)
                .map(|row| row.iter().filter(|&&idx| idx != SENTINEL_INDEX).count())
                .collect(),
        }
    }
}

/// Strategy turning per-query neighbor lists into a [`NeighborOutput`].
pub trait NeighborEncoder {
    fn encode<T: Coordinate>(&self, rows: &[Vec<Neighbor<T>>]) -> Result<NeighborOutput>;
}

/// Mode 0: concatenation plus offsets.
#[derive(Clone, Copy, Debug, Default)]
pub struct VariableLength;

/// Mode 1: rectangular rows padded with [`SENTINEL_INDEX`] / [`SENTINEL_DIST`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedWidth {
    /// Row width; `None` uses the longest row so nothing is truncated.
    pub width: Option<usize>,
}

impl FixedWidth {
    pub fn new(width: usize) -> Self {
        Self { width: Some(width) }
    }

    pub fn widest() -> Self {
        Self { width: None }
    }
}

impl NeighborEncoder for VariableLength {
    fn encode<T: Coordinate>(&self, rows: &[Vec<Neighbor<T>>]) -> Result<NeighborOutput> {
        let total: usize = rows.iter().map(Vec::len).sum();

        let mut indices = Vec::new();
        let mut dists = Vec::new();
        let mut offsets = Vec::new();
        reserve(&mut indices, total)?;
        reserve(&mut dists, total)?;
        reserve(&mut offsets, rows.len() + 1)?;

        offsets.push(0);
        for row in rows {
            for n in row {
                indices.push(n.index as i64);
                dists.push(to_f32(n.distance));
            }
            offsets.push(indices.len());
        }

        Ok(NeighborOutput {
            indices,
            dists,
            layout: Layout::Offsets(offsets),
            num_queries: rows.len(),
            num_neighbors: total,
        })
    }
}

impl NeighborEncoder for FixedWidth {
    fn encode<T: Coordinate>(&self, rows: &[Vec<Neighbor<T>>]) -> Result<NeighborOutput> {
        let width = self
            .width
            .unwrap_or_else(|| rows.iter().map(Vec::len).max().unwrap_or(0));
        Ok(PaddedBuffers::reserve(width, rows.len())?.fill(rows))
    }
}

/// Padded output storage, reserved before the rows exist.
///
/// When the width is known up front the orchestrator reserves this ahead of any index
/// construction, so an oversized request fails before searching.
#[derive(Debug)]
pub(crate) struct PaddedBuffers {
    indices: Vec<i64>,
    dists: Vec<f32>,
    width: usize,
    num_rows: usize,
}

impl PaddedBuffers {
    pub(crate) fn reserve(width: usize, num_rows: usize) -> Result<Self> {
        let size = num_rows
            .checked_mul(width)
            .ok_or(NeighborError::AllocationFailure { requested: usize::MAX })?;

        let mut indices = Vec::new();
        let mut dists = Vec::new();
        reserve(&mut indices, size)?;
        reserve(&mut dists, size)?;
        Ok(Self { indices, dists, width, num_rows })
    }

    /// Writes `rows`, truncated or padded to the reserved width.
    ///
    /// `rows.len()` must equal the row count passed to [`PaddedBuffers::reserve`].
    pub(crate) fn fill<T: Coordinate>(self, rows: &[Vec<Neighbor<T>>]) -> NeighborOutput {
        debug_assert_eq!(rows.len(), self.num_rows);
        let Self { mut indices, mut dists, width, .. } = self;

        let mut num_neighbors = 0;
        for row in rows {
            let filled = row.len().min(width);
            for n in &row[..filled] {
                indices.push(n.index as i64);
                dists.push(to_f32(n.distance));
            }
            indices.resize(indices.len() + width - filled, SENTINEL_INDEX);
            dists.resize(dists.len() + width - filled, SENTINEL_DIST);
            num_neighbors += filled;
        }

        NeighborOutput {
            indices,
            dists,
            layout: Layout::Padded { width },
            num_queries: rows.len(),
            num_neighbors,
        }
    }
}

fn reserve<V>(buf: &mut Vec<V>, additional: usize) -> Result<()> {
    buf.try_reserve_exact(additional)
        .map_err(|_| NeighborError::AllocationFailure { requested: additional })
}

fn to_f32<T: Coordinate>(value: T) -> f32 {
    value.to_f32().unwrap_or(f32::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<Neighbor<f64>>> {
        vec![
            vec![Neighbor { index: 4, distance: 0.5 }, Neighbor { index: 2, distance: 1.0 }],
            vec![],
            vec![Neighbor { index: 7, distance: 0.25 }],
        ]
    }

    #[test]
    fn test_variable_length_offsets() {
        let out = VariableLength.encode(&rows()).unwrap();
        assert_eq!(out.indices, vec![4, 2, 7]);
        assert_eq!(out.dists, vec![0.5, 1.0, 0.25]);
        assert_eq!(out.layout, Layout::Offsets(vec![0, 2, 2, 3]));
        assert_eq!(out.num_neighbors, 3);
        assert_eq!(out.counts(), vec![2, 0, 1]);
        assert_eq!(out.num_queries, 3);
        assert!(out.row(1).is_empty());
    }

    #[test]
    fn test_fixed_width_pads_with_sentinels() {
        let out = FixedWidth::new(3).encode(&rows()).unwrap();
        assert_eq!(out.indices, vec![4, 2, -1, -1, -1, -1, 7, -1, -1]);
        assert_eq!(out.dists, vec![0.5, 1.0, -1.0, -1.0, -1.0, -1.0, 0.25, -1.0, -1.0]);
        assert_eq!(out.num_neighbors, 3);
        assert_eq!(out.counts(), vec![2, 0, 1]);
        assert_eq!(out.row(2), vec![(7, 0.25)]);
    }

    #[test]
    fn test_fixed_width_widest_row() {
        let out = FixedWidth::widest().encode(&rows()).unwrap();
        assert_eq!(out.layout, Layout::Padded { width: 2 });
        assert_eq!(out.indices.len(), 6);
        assert_eq!(out.num_queries, 3);
    }

    #[test]
    fn test_padded_buffers_overflow_fails_before_fill() {
        let err = PaddedBuffers::reserve(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, NeighborError::AllocationFailure { .. }));
        let err = PaddedBuffers::reserve(usize::MAX / 4, 1).unwrap_err();
        assert!(matches!(err, NeighborError::AllocationFailure { .. }));
    }

    #[test]
    fn test_padded_buffers_reserved_then_filled() {
        let out = PaddedBuffers::reserve(2, 3).unwrap().fill(&rows());
        assert_eq!(out, FixedWidth::new(2).encode(&rows()).unwrap());
    }

    #[test]
    fn test_fixed_width_truncates_long_rows() {
        let out = FixedWidth::new(1).encode(&rows()).unwrap();
        assert_eq!(out.indices, vec![4, -1, 7]);
        assert_eq!(out.num_neighbors, 2);
    }
}
