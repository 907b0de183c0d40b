use kdbucket::{KdTree, SquaredEuclidean};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn main() {
    // Initialize Rayon explicitly so thread creation happens
    // before the query batch we want to profile.
    rayon::ThreadPoolBuilder::new().build_global().unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let coords: Vec<f64> = (0..1_000_000 * 3).map(|_| rng.gen_range(0.0..100.0)).collect();
    let queries: Vec<f64> = (0..200_000 * 3).map(|_| rng.gen_range(0.0..100.0)).collect();

    // Incremental insertion of a million points
    let tree: KdTree<f64, usize> = KdTree::from_points(3, &coords, 0..).unwrap();
    println!("size {}, depth {}, leaves {}", tree.len(), tree.depth(), tree.leaf_count());

    // Batched k-nearest queries (this is the hot path)
    let found = tree.par_nearest_neighbours(&queries, 8, true, &SquaredEuclidean).unwrap();
    println!("answered {} queries", found.len());
}
