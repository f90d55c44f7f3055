use crate::batch::BatchLayout;
use crate::encoder::{Layout, NeighborOutput};
use crate::error::NeighborError;
use crate::params::{KnnParams, OutputMode, RadiusParams};
use crate::search;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

#[wasm_bindgen(typescript_custom_section)]
const TS_CONSTANTS_SENTINEL: &'static str = r#"
export const SENTINEL_INDEX = -1;
export const SENTINEL_DIST = -1.0;
export const MODE_VARIABLE = 0;
export const MODE_PADDED = 1;
"#;

/// Flattened neighbors returned to JavaScript.
#[wasm_bindgen(js_name = NeighborResult)]
pub struct NeighborResultWASM {
    inner: NeighborOutput,
}

#[wasm_bindgen(js_class = NeighborResult)]
impl NeighborResultWASM {
    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Vec<i64> {
        self.inner.indices.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn dists(&self) -> Vec<f32> {
        self.inner.dists.clone()
    }

    /// Per-query offsets for mode 0, empty for padded results.
    #[wasm_bindgen(getter)]
    pub fn offsets(&self) -> Vec<u32> {
        match &self.inner.layout {
            Layout::Offsets(offsets) => offsets.iter().map(|&o| o as u32).collect(),
            Layout::Padded { .. } => Vec::new(),
        }
    }

    /// Row width for padded results, 0 for mode 0.
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> usize {
        match &self.inner.layout {
            Layout::Offsets(_) => 0,
            Layout::Padded { width } => *width,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn padded(&self) -> bool {
        matches!(self.inner.layout, Layout::Padded { .. })
    }

    #[wasm_bindgen(getter)]
    pub fn num_neighbors(&self) -> usize {
        self.inner.num_neighbors
    }

    #[wasm_bindgen(getter)]
    pub fn num_queries(&self) -> usize {
        self.inner.num_queries
    }
}

#[wasm_bindgen(js_name = radiusSearch)]
pub fn radius_search(
    queries: &[f64],
    supports: &[f64],
    dim: usize,
    radius: f64,
    max_num: i32,
    mode: i32,
    sorted: bool,
    random_seed: f64,
) -> Result<NeighborResultWASM, JsValue> {
    let params = radius_params(radius, max_num, mode, sorted, random_seed).map_err(to_js)?;
    search::radius_search(queries, supports, dim, &params)
        .map(|inner| NeighborResultWASM { inner })
        .map_err(to_js)
}

#[wasm_bindgen(js_name = batchRadiusSearch)]
pub fn batch_radius_search(
    queries: &[f64],
    supports: &[f64],
    q_batches: &[i64],
    s_batches: &[i64],
    dim: usize,
    radius: f64,
    max_num: i32,
    mode: i32,
    sorted: bool,
    random_seed: f64,
) -> Result<NeighborResultWASM, JsValue> {
    let params = radius_params(radius, max_num, mode, sorted, random_seed).map_err(to_js)?;
    let (q_layout, s_layout) = layouts(queries, supports, q_batches, s_batches, dim).map_err(to_js)?;
    search::batch_radius_search(queries, supports, &q_layout, &s_layout, dim, &params)
        .map(|inner| NeighborResultWASM { inner })
        .map_err(to_js)
}

#[wasm_bindgen(js_name = knnSearch)]
pub fn knn_search(queries: &[f64], supports: &[f64], dim: usize, k: i32) -> Result<NeighborResultWASM, JsValue> {
    let params = knn_params(k).map_err(to_js)?;
    search::knn_search(queries, supports, dim, &params)
        .map(|inner| NeighborResultWASM { inner })
        .map_err(to_js)
}

#[wasm_bindgen(js_name = batchKnnSearch)]
pub fn batch_knn_search(
    queries: &[f64],
    supports: &[f64],
    q_batches: &[i64],
    s_batches: &[i64],
    dim: usize,
    k: i32,
) -> Result<NeighborResultWASM, JsValue> {
    let params = knn_params(k).map_err(to_js)?;
    let (q_layout, s_layout) = layouts(queries, supports, q_batches, s_batches, dim).map_err(to_js)?;
    search::batch_knn_search(queries, supports, &q_layout, &s_layout, dim, &params)
        .map(|inner| NeighborResultWASM { inner })
        .map_err(to_js)
}

/// JavaScript numbers carry the seed; any negative value asks for a fresh one.
fn radius_params(radius: f64, max_num: i32, mode: i32, sorted: bool, random_seed: f64) -> Result<RadiusParams, NeighborError> {
    if max_num < 0 {
        return Err(NeighborError::InvalidParameter(format!("max_num must be non-negative, got {}", max_num)));
    }
    let random_seed = if random_seed.is_finite() && random_seed >= 0.0 { Some(random_seed as u64) } else { None };

    Ok(RadiusParams::new(radius)
        .with_max_num(max_num as usize)
        .with_mode(OutputMode::try_from(mode)?)
        .with_sorted(sorted)
        .with_random_seed(random_seed))
}

fn knn_params(k: i32) -> Result<KnnParams, NeighborError> {
    if k < 0 {
        return Err(NeighborError::InvalidParameter(format!("k must be non-negative, got {}", k)));
    }
    Ok(KnnParams::new(k as usize))
}

fn layouts(
    queries: &[f64],
    supports: &[f64],
    q_batches: &[i64],
    s_batches: &[i64],
    dim: usize,
) -> Result<(BatchLayout, BatchLayout), NeighborError> {
    if dim == 0 {
        return Err(NeighborError::InvalidParameter("dimension must be at least 1".into()));
    }
    let q_layout = BatchLayout::from_offsets(q_batches, queries.len() / dim)?;
    let s_layout = BatchLayout::from_offsets(s_batches, supports.len() / dim)?;
    Ok((q_layout, s_layout))
}

fn to_js(e: NeighborError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_params_from_js_numbers() {
        let params = radius_params(0.5, 4, 1, true, 42.0).unwrap();
        assert_eq!(params.max_num, 4);
        assert_eq!(params.mode, OutputMode::Padded);
        assert_eq!(params.random_seed, Some(42));

        let params = radius_params(0.5, 0, 0, false, -1.0).unwrap();
        assert_eq!(params.random_seed, None);

        assert!(radius_params(0.5, -1, 0, false, 0.0).is_err());
        assert!(radius_params(0.5, 1, 3, false, 0.0).is_err());
    }

    #[test]
    fn test_knn_params_rejects_negative_k() {
        assert!(matches!(knn_params(-2), Err(NeighborError::InvalidParameter(_))));
        assert_eq!(knn_params(3).unwrap().k, 3);
    }
}
