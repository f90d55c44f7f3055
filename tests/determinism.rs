mod common;

use common::random_cloud;
use pointnbr::{batch_radius_search, radius_search, BatchLayout, OutputMode, RadiusParams};

#[test]
fn test_same_seed_same_output() {
    let dim = 3;
    let supports = random_cloud(100, dim, 1.0, 31);
    let queries = random_cloud(50, dim, 1.0, 32);

    let params = RadiusParams::new(1.01).with_max_num(2).with_random_seed(Some(42));
    let a = radius_search(&queries, &supports, dim, &params).unwrap();
    let b = radius_search(&queries, &supports, dim, &params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_same_seed_same_output_batched_padded() {
    let dim = 3;
    let supports = random_cloud(100, dim, 1.0, 33);
    let queries = random_cloud(50, dim, 1.0, 34);
    let s_layout = BatchLayout::from_counts(&[50, 50], 100).unwrap();
    let q_layout = BatchLayout::from_counts(&[25, 25], 50).unwrap();

    let params = RadiusParams::new(1.0)
        .with_max_num(15)
        .with_mode(OutputMode::Padded)
        .with_random_seed(Some(42));

    let first = batch_radius_search(&queries, &supports, &q_layout, &s_layout, dim, &params).unwrap();
    for _ in 0..5 {
        let again = batch_radius_search(&queries, &supports, &q_layout, &s_layout, dim, &params).unwrap();
        assert_eq!(first.indices, again.indices);
        assert_eq!(first.dists, again.dists);
    }
}

#[test]
fn test_different_seeds_differ() {
    let supports = random_cloud(1000, 2, 1.0, 35);
    let query = [0.0, 0.0];

    let params = RadiusParams::new(10.0).with_max_num(10);
    let a = radius_search(&query, &supports, 2, &params.with_random_seed(Some(1))).unwrap();
    let b = radius_search(&query, &supports, 2, &params.with_random_seed(Some(2))).unwrap();
    assert_eq!(a.num_neighbors, 10);
    assert_ne!(a.indices, b.indices);
}

#[test]
fn test_no_seed_is_not_reproducible() {
    let supports = random_cloud(1000, 2, 1.0, 36);
    let query = [0.0, 0.0];

    let params = RadiusParams::new(10.0).with_max_num(10).with_random_seed(None);
    let a = radius_search(&query, &supports, 2, &params).unwrap();
    let b = radius_search(&query, &supports, 2, &params).unwrap();
    assert_ne!(a.indices, b.indices);
}

#[test]
fn test_uncapped_results_ignore_seed() {
    let supports = random_cloud(200, 3, 1.0, 37);
    let queries = random_cloud(20, 3, 1.0, 38);

    let params = RadiusParams::new(0.5).with_sorted(true);
    let a = radius_search(&queries, &supports, 3, &params.with_random_seed(Some(1))).unwrap();
    let b = radius_search(&queries, &supports, 3, &params.with_random_seed(None)).unwrap();
    assert_eq!(a, b);
}
