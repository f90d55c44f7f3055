//! Batch boundaries of concatenated point clouds.

use crate::error::{NeighborError, Result};
use std::ops::Range;

/// Validated partition of a concatenated point array into clouds.
///
/// Cloud `i` owns points `offsets[i]..offsets[i + 1]`. The first offset is 0 and the
/// last equals the number of points, so clouds cover the array without gaps or
/// overlaps. Empty clouds are allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchLayout {
    offsets: Vec<usize>,
}

impl BatchLayout {
    /// A single cloud spanning all `len` points.
    pub fn single(len: usize) -> Self {
        Self { offsets: vec![0, len] }
    }

    /// From boundary offsets of length `clouds + 1`.
    pub fn from_offsets(offsets: &[i64], len: usize) -> Result<Self> {
        let Some((&first, _)) = offsets.split_first() else {
            return Err(layout_error("boundary array is empty"));
        };
        if first != 0 {
            return Err(layout_error(format!("first boundary must be 0, got {}", first)));
        }

        let mut checked = Vec::with_capacity(offsets.len());
        let mut prev = 0i64;
        for (i, &offset) in offsets.iter().enumerate() {
            if offset < prev {
                return Err(layout_error(format!(
                    "boundaries must be non-decreasing, got {} after {} at position {}",
                    offset, prev, i
                )));
            }
            checked.push(offset as usize);
            prev = offset;
        }

        if prev as u64 != len as u64 {
            return Err(layout_error(format!(
                "last boundary {} does not match the {} points",
                prev, len
            )));
        }

        Ok(Self { offsets: checked })
    }

    /// From per-cloud point counts.
    pub fn from_counts(counts: &[i64], len: usize) -> Result<Self> {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        offsets.push(0i64);
        let mut total = 0i64;
        for (i, &count) in counts.iter().enumerate() {
            if count < 0 {
                return Err(layout_error(format!("cloud {} has negative size {}", i, count)));
            }
            total = total
                .checked_add(count)
                .ok_or_else(|| layout_error("cloud sizes overflow"))?;
            offsets.push(total);
        }
        Self::from_offsets(&offsets, len)
    }

    /// From one cloud id per point. Ids must be non-negative and sorted; the cloud count
    /// is the largest id plus one, with skipped ids forming empty clouds.
    pub fn from_batch_ids(ids: &[i64]) -> Result<Self> {
        let mut offsets = vec![0usize];
        let mut current = 0i64;

        for (i, &id) in ids.iter().enumerate() {
            if id < 0 {
                return Err(layout_error(format!("negative cloud id {} at position {}", id, i)));
            }
            if id < current {
                return Err(layout_error(format!(
                    "cloud ids must be sorted, got {} after {} at position {}",
                    id, current, i
                )));
            }
            while current < id {
                offsets.push(i);
                current += 1;
            }
        }

        if !ids.is_empty() {
            offsets.push(ids.len());
        }
        Ok(Self { offsets })
    }

    pub fn num_clouds(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of points covered.
    pub fn len(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Point range of cloud `cloud`.
    pub fn range(&self, cloud: usize) -> Range<usize> {
        self.offsets[cloud]..self.offsets[cloud + 1]
    }

    /// Checks that this layout covers `len` points.
    pub fn check_len(&self, len: usize, what: &str) -> Result<()> {
        if self.len() != len {
            return Err(layout_error(format!(
                "{} layout covers {} points but {} were given",
                what,
                self.len(),
                len
            )));
        }
        Ok(())
    }
}

/// Checks that query and support layouts describe the same clouds.
pub fn check_pair(queries: &BatchLayout, supports: &BatchLayout) -> Result<()> {
    if queries.num_clouds() != supports.num_clouds() {
        return Err(layout_error(format!(
            "{} query clouds but {} support clouds",
            queries.num_clouds(),
            supports.num_clouds()
        )));
    }
    Ok(())
}

fn layout_error(msg: impl Into<String>) -> NeighborError {
    NeighborError::InvalidBatchLayout(msg.into())
}
