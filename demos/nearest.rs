use kdbucket::{KdTree, Manhattan, SquaredEuclidean, TreeOptions};

fn main() -> kdbucket::Result<()> {
    // A small tree of named cities in 2D.
    let mut tree = KdTree::with_options(2, TreeOptions::default().bucket_size(4))?;
    let cities = [
        ([52.37, 4.90], "Amsterdam"),
        ([51.92, 4.48], "Rotterdam"),
        ([52.09, 5.12], "Utrecht"),
        ([51.44, 5.47], "Eindhoven"),
        ([53.22, 6.57], "Groningen"),
        ([50.85, 5.69], "Maastricht"),
        ([52.08, 4.30], "The Hague"),
        ([51.59, 4.78], "Breda"),
    ];
    for (point, name) in cities {
        tree.insert(&point, name)?;
    }
    println!("{} cities, depth {}", tree.len(), tree.depth());

    let here = [52.0, 5.0];
    if let Some((d, name)) = tree.nearest_neighbour(&here, &SquaredEuclidean)? {
        println!("nearest: {} (squared distance {:.4})", name, d);
    }

    println!("three nearest by Manhattan distance:");
    for (d, name) in tree.nearest_neighbours(&here, 3, true, &Manhattan)? {
        println!("  {} ({:.2})", name, d);
    }

    println!("within 0.5 degrees:");
    for (d, name) in tree.within(&here, 0.25, &SquaredEuclidean, true)? {
        println!("  {} ({:.4})", name, d);
    }

    Ok(())
}
