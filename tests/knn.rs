mod common;

use common::{brute_knn, random_cloud};
use pointnbr::{knn_search, KdTree, KnnParams, Layout, Metric, NeighborError};

#[test]
fn test_unit_square_two_nearest() {
    let supports = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let out = knn_search(&[0.5, 0.5], &supports, 2, &KnnParams::new(2)).unwrap();

    // All corners are equidistant, ties go to the lower index
    assert_eq!(out.indices, vec![0, 1]);
    assert!(out.dists[0] <= out.dists[1]);
    assert!((out.dists[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
}

#[test]
fn test_matches_brute_force() {
    let dim = 4;
    let k = 12;
    let supports = random_cloud(1500, dim, 3.0, 21);
    let queries = random_cloud(100, dim, 3.0, 22);

    let out = knn_search(&queries, &supports, dim, &KnnParams::new(k)).unwrap();
    assert_eq!(out.layout, Layout::Padded { width: k });
    assert_eq!(out.num_neighbors, 100 * k);

    for q in 0..100 {
        let expected = brute_knn(&queries[q * dim..(q + 1) * dim], &supports, dim, k);
        let row = out.row(q);
        assert_eq!(row.len(), k);
        for (got, want) in row.iter().zip(&expected) {
            assert_eq!(got.0 as usize, want.0, "Query {} neighbor mismatch", q);
            assert!((got.1 as f64 - want.1).abs() < 1e-5);
        }
    }
}

#[test]
fn test_k_larger_than_supports_is_padded() {
    let supports = [0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 1.0, 0.0, 0.0];
    let out = knn_search(&[0.0, 0.0, 0.0], &supports, 3, &KnnParams::new(5)).unwrap();

    assert_eq!(out.indices, vec![0, 2, 1, -1, -1]);
    assert_eq!(out.dists, vec![0.0, 1.0, 3.0, -1.0, -1.0]);
    assert_eq!(out.num_neighbors, 3);
}

#[test]
fn test_k_zero_and_empty_supports() {
    let supports = [0.0, 0.0];
    let out = knn_search(&[1.0, 1.0], &supports, 2, &KnnParams::new(0)).unwrap();
    assert!(out.indices.is_empty());
    assert_eq!(out.num_queries, 1);

    let empty: Vec<f64> = Vec::new();
    let out = knn_search(&[1.0, 1.0], &empty, 2, &KnnParams::new(2)).unwrap();
    assert_eq!(out.indices, vec![-1, -1]);
}

#[test]
fn test_no_duplicates_with_repeated_points() {
    let mut supports = Vec::new();
    for _ in 0..40 {
        supports.extend_from_slice(&[1.0, 2.0]);
    }
    let tree = KdTree::build(&supports, 2).unwrap();
    let result = tree.k_nearest(&[1.0, 2.0], 10).unwrap();

    let indices: Vec<usize> = result.iter().map(|n| n.index).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
}

#[test]
fn test_manhattan_metric() {
    let supports = [2.0, 0.0, 1.2, 1.2];
    let euclid = knn_search(&[0.0, 0.0], &supports, 2, &KnnParams::new(1)).unwrap();
    let manhattan = knn_search(&[0.0, 0.0], &supports, 2, &KnnParams::new(1).with_metric(Metric::Manhattan)).unwrap();

    assert_eq!(euclid.indices, vec![1]);
    assert_eq!(manhattan.indices, vec![0]);
    assert_eq!(manhattan.dists, vec![2.0]);
}

#[test]
fn test_oversized_output_is_allocation_failure() {
    let supports = random_cloud(500, 3, 1.0, 27);
    let queries = random_cloud(2, 3, 1.0, 28);

    for k in [usize::MAX, usize::MAX / 2] {
        let err = knn_search(&queries, &supports, 3, &KnnParams::new(k)).unwrap_err();
        assert!(
            matches!(err, NeighborError::AllocationFailure { .. }),
            "k = {} should fail to reserve its output, got {:?}",
            k,
            err
        );
    }
}
