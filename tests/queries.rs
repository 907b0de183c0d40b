use kdbucket::{DistanceMetric, KdTree, Manhattan, SquaredEuclidean, TreeOptions, WeightedSquaredEuclidean};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;

const N_POINTS: usize = 10_000;
const N_QUERIES: usize = 1_000;

fn random_points(rng: &mut StdRng, count: usize, dims: usize) -> Vec<f64> {
    (0..count * dims).map(|_| rng.gen_range(0.0..100.0)).collect()
}

fn build_tree(points: &[f64], dims: usize) -> KdTree<f64, usize> {
    let mut tree = KdTree::new(dims).unwrap();
    for (i, p) in points.chunks(dims).enumerate() {
        tree.insert(p, i).unwrap();
    }
    tree
}

/// All `(distance, index)` pairs sorted nearest first.
fn brute_force<M: DistanceMetric<f64>>(points: &[f64], dims: usize, query: &[f64], metric: &M) -> Vec<(f64, usize)> {
    let mut all: Vec<(f64, usize)> = points
        .chunks(dims)
        .enumerate()
        .map(|(i, p)| (metric.distance(query, p), i))
        .collect();
    all.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    all
}

/// Squared Euclidean distance that counts point evaluations.
#[derive(Default)]
struct CountingMetric {
    evaluations: Cell<usize>,
}

impl DistanceMetric<f64> for CountingMetric {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self.evaluations.set(self.evaluations.get() + 1);
        SquaredEuclidean.distance(a, b)
    }

    fn distance_to_bounds(&self, point: &[f64], min: &[f64], max: &[f64]) -> f64 {
        SquaredEuclidean.distance_to_bounds(point, min, max)
    }
}

#[test]
fn test_queries_skip_most_of_the_tree() {
    let mut rng = StdRng::seed_from_u64(31);
    let points = random_points(&mut rng, N_POINTS, 3);
    let tree = build_tree(&points, 3);
    let metric = CountingMetric::default();

    for _ in 0..N_QUERIES {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
        tree.nearest_neighbour(&q, &metric).unwrap();
    }
    let per_query = metric.evaluations.get() / N_QUERIES;
    assert!(per_query > 0);
    assert!(per_query < N_POINTS / 20, "{} evaluations per nearest query", per_query);

    metric.evaluations.set(0);
    for _ in 0..N_QUERIES {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
        tree.nearest_neighbours(&q, 10, false, &metric).unwrap();
        tree.within(&q, 4.0, &metric, false).unwrap();
    }
    let per_query = metric.evaluations.get() / (2 * N_QUERIES);
    assert!(per_query < N_POINTS / 20, "{} evaluations per k-nearest or radius query", per_query);
}

#[test]
fn test_nearest_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(42);
    let points = random_points(&mut rng, N_POINTS, 3);
    let tree = build_tree(&points, 3);
    assert_eq!(tree.len(), N_POINTS);

    for _ in 0..N_QUERIES {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
        let (d, &i) = tree.nearest_neighbour(&q, &SquaredEuclidean).unwrap().expect("Tree is not empty");
        let expected = brute_force(&points, 3, &q, &SquaredEuclidean)[0];
        assert_eq!(d, expected.0, "Distance mismatch for query {:?}", q);
        assert_eq!(i, expected.1, "Payload mismatch for query {:?}", q);
    }
}

#[test]
fn test_k_nearest_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(7);
    let points = random_points(&mut rng, N_POINTS, 3);
    let tree = build_tree(&points, 3);

    for _ in 0..N_QUERIES {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
        let found = tree.nearest_neighbours(&q, 10, true, &SquaredEuclidean).unwrap();
        assert_eq!(found.len(), 10);
        for pair in found.windows(2) {
            assert!(pair[0].0 <= pair[1].0, "Results are not sorted: {:?}", found);
        }
        let expected: Vec<f64> = brute_force(&points, 3, &q, &SquaredEuclidean)
            .iter()
            .take(10)
            .map(|(d, _)| *d)
            .collect();
        let got: Vec<f64> = found.iter().map(|(d, _)| *d).collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn test_unsorted_k_nearest_holds_same_set() {
    let mut rng = StdRng::seed_from_u64(99);
    let points = random_points(&mut rng, 2_000, 2);
    let tree = build_tree(&points, 2);

    for _ in 0..100 {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
        let mut unsorted: Vec<usize> = tree
            .nearest_neighbours(&q, 7, false, &SquaredEuclidean)
            .unwrap()
            .into_iter()
            .map(|(_, &i)| i)
            .collect();
        let mut sorted: Vec<usize> = tree
            .nearest_neighbours(&q, 7, true, &SquaredEuclidean)
            .unwrap()
            .into_iter()
            .map(|(_, &i)| i)
            .collect();
        unsorted.sort_unstable();
        sorted.sort_unstable();
        assert_eq!(unsorted, sorted);
    }
}

#[test]
fn test_radius_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(1234);
    let points = random_points(&mut rng, N_POINTS, 3);
    let tree = build_tree(&points, 3);

    for _ in 0..200 {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
        let r = rng.gen_range(1.0..15.0);
        let r2 = r * r;
        let mut got: Vec<usize> = Vec::new();
        let n = tree
            .find_neighbours(&q, r2, &SquaredEuclidean, |d, _, &i| {
                assert!(d <= r2);
                got.push(i);
            })
            .unwrap();
        assert_eq!(n, got.len());
        got.sort_unstable();

        let mut expected: Vec<usize> = brute_force(&points, 3, &q, &SquaredEuclidean)
            .into_iter()
            .filter(|(d, _)| *d <= r2)
            .map(|(_, i)| i)
            .collect();
        expected.sort_unstable();
        assert_eq!(got, expected);
    }
}

#[test]
fn test_radius_boundary_is_inclusive() {
    let mut tree = KdTree::new(3).unwrap();
    tree.insert(&[3.0, 4.0, 0.0], "on").unwrap();
    tree.insert(&[0.0, 0.0, 5.0], "on").unwrap();
    tree.insert(&[3.0, 4.0, 0.5], "off").unwrap();
    tree.insert(&[1.0, 1.0, 1.0], "in").unwrap();

    let found = tree.within(&[0.0, 0.0, 0.0], 25.0, &SquaredEuclidean, true).unwrap();
    let labels: Vec<&str> = found.iter().map(|(_, l)| **l).collect();
    assert_eq!(labels, vec!["in", "on", "on"]);
    assert_eq!(found[1].0, 25.0);

    let none = tree.within(&[0.0, 0.0, 0.0], 0.0, &SquaredEuclidean, false).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_single_precision() {
    let mut rng = StdRng::seed_from_u64(5);
    let points: Vec<f32> = (0..3000 * 2).map(|_| rng.gen_range(0.0f32..100.0)).collect();
    let mut tree: KdTree<f32, usize> = KdTree::new(2).unwrap();
    for (i, p) in points.chunks(2).enumerate() {
        tree.insert(p, i).unwrap();
    }

    for _ in 0..200 {
        let q = [rng.gen_range(0.0f32..100.0), rng.gen_range(0.0f32..100.0)];
        let (d, &i) = tree.nearest_neighbour(&q, &SquaredEuclidean).unwrap().unwrap();
        let best = points
            .chunks(2)
            .map(|p| SquaredEuclidean.distance(&q[..], p))
            .fold(f32::INFINITY, f32::min);
        assert_eq!(d, best);
        assert_eq!(SquaredEuclidean.distance(&q[..], &points[i * 2..i * 2 + 2]), best);
    }
}

#[test]
fn test_other_metrics_match_linear_scan() {
    let mut rng = StdRng::seed_from_u64(77);
    let points = random_points(&mut rng, 3_000, 3);
    let tree = build_tree(&points, 3);
    let weighted = WeightedSquaredEuclidean::new(vec![1.0, 4.0, 0.25]);

    for _ in 0..200 {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];

        let (d, _) = tree.nearest_neighbour(&q, &Manhattan).unwrap().unwrap();
        assert_eq!(d, brute_force(&points, 3, &q, &Manhattan)[0].0);

        let got: Vec<f64> = tree
            .nearest_neighbours(&q, 5, true, &weighted)
            .unwrap()
            .iter()
            .map(|(d, _)| *d)
            .collect();
        let expected: Vec<f64> = brute_force(&points, 3, &q, &weighted)
            .iter()
            .take(5)
            .map(|(d, _)| *d)
            .collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn test_small_buckets_and_skewed_split() {
    let mut rng = StdRng::seed_from_u64(2024);
    let points = random_points(&mut rng, 5_000, 2);
    let opts = TreeOptions::default().bucket_size(2).split(kdbucket::Fraction::new(0.2));
    let mut tree = KdTree::with_options(2, opts).unwrap();
    for (i, p) in points.chunks(2).enumerate() {
        tree.insert(p, i).unwrap();
    }
    assert!(tree.depth() > 10);

    for _ in 0..300 {
        let q = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
        let (d, _) = tree.nearest_neighbour(&q, &SquaredEuclidean).unwrap().unwrap();
        assert_eq!(d, brute_force(&points, 2, &q, &SquaredEuclidean)[0].0);
    }
}
