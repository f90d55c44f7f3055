//! # pointnbr
//!
//! `pointnbr` is a Rust library for neighbor search in point clouds, designed to be used in
//! Rust as well as compiled to WebAssembly (WASM). For every query point it finds the support
//! points within a radius, or the k closest support points, and returns flat index and
//! distance arrays ready for point-cloud convolution, clustering or resampling pipelines.
//!
//! ## Features
//!
//! - **Generic precision**: one implementation for `f32` and `f64` coordinates of any dimension.
//! - **Batched clouds**: thousands of independent clouds in one call, never leaking neighbors
//!   across cloud boundaries.
//! - **Reproducible capping**: oversized radius results are subsampled with a seeded,
//!   per-query random stream, so parallel execution stays deterministic.
//! - **Two encodings**: variable-length rows with offsets, or fixed-width rows padded with `-1`.
//! - **Parallel**: clouds and queries are processed with `rayon`.
//!
//! ## Main Interface
//!
//! The entry points are [`radius_search`], [`batch_radius_search`], [`knn_search`] and
//! [`batch_knn_search`]. [`KdTree`] can also be built and queried directly when an index
//! should outlive a single call.

mod batch;
mod bounds;
mod encoder;
mod error;
mod kdtree;
mod knn;
mod metric;
mod params;
mod radius;
mod sampling;
mod search;
pub mod wasm;

pub use batch::BatchLayout;
pub use bounds::BoundingBox;
pub use encoder::FixedWidth;
pub use encoder::Layout;
pub use encoder::NeighborEncoder;
pub use encoder::NeighborOutput;
pub use encoder::VariableLength;
pub use encoder::SENTINEL_DIST;
pub use encoder::SENTINEL_INDEX;
pub use error::NeighborError;
pub use error::Result;
pub use kdtree::IndexConfig;
pub use kdtree::KdTree;
pub use kdtree::Neighbor;
pub use knn::KnnQuery;
pub use metric::Coordinate;
pub use metric::Metric;
pub use params::KnnParams;
pub use params::OutputMode;
pub use params::RadiusParams;
pub use radius::RadiusQuery;
pub use search::batch_knn_search;
pub use search::batch_radius_search;
pub use search::knn_search;
pub use search::radius_search;
