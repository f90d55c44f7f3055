#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `count` points of dimension `dim` uniform in `[-extent, extent]`.
pub fn random_cloud(count: usize, dim: usize, extent: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count * dim).map(|_| rng.gen_range(-extent..extent)).collect()
}

pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Indices of all supports within `radius` of `query`, ascending.
pub fn brute_radius(query: &[f64], supports: &[f64], dim: usize, radius: f64) -> Vec<usize> {
    (0..supports.len() / dim)
        .filter(|&j| distance(query, &supports[j * dim..(j + 1) * dim]) <= radius)
        .collect()
}

/// The `k` nearest supports of `query` as (index, distance), ties by index.
pub fn brute_knn(query: &[f64], supports: &[f64], dim: usize, k: usize) -> Vec<(usize, f64)> {
    let mut all: Vec<(usize, f64)> = (0..supports.len() / dim)
        .map(|j| (j, distance(query, &supports[j * dim..(j + 1) * dim])))
        .collect();
    all.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
    all.truncate(k);
    all
}
