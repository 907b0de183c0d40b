//! # kdbucket
//!
//! `kdbucket` is a Rust library providing an adaptive, bucketed k-d tree for
//! nearest-neighbour and radius queries over points with attached payloads. It is
//! designed to be used in Rust as well as compiled to WebAssembly (WASM).
//!
//! ## Features
//!
//! - **Incremental**: Points are inserted one at a time, no bulk build step is needed.
//! - **Adaptive buckets**: Leaves split along their widest axis; buckets of coincident points grow instead of splitting forever.
//! - **NaN-safe**: NaN coordinates never corrupt the tree, they only make pruning less effective.
//! - **Non-recursive queries**: Traversal uses an explicit stack, so deep trees cannot overflow the call stack.
//! - **Pluggable metrics**: Any [`DistanceMetric`] with a consistent box lower bound can drive the queries.
//! - **Parallel batches**: Query many points at once on the `rayon` thread pool.
//!
//! ## Example
//!
//! ```rust
//! use kdbucket::{KdTree, SquaredEuclidean};
//!
//! let mut tree = KdTree::new(3)?;
//! tree.insert(&[1.0, 2.0, 5.0], "a")?;
//! tree.insert(&[2.0, 3.0, 6.0], "b")?;
//!
//! let (distance, payload) = tree.nearest_neighbour(&[1.0, 2.0, 5.5], &SquaredEuclidean)?.unwrap();
//! assert_eq!(*payload, "a");
//! assert_eq!(distance, 0.25);
//! # Ok::<(), kdbucket::ErrorKind>(())
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`KdTree`] struct, which owns the points and
//! answers the queries.

mod batch;
mod bounds;
pub mod distance;
mod error;
mod heap;
mod iter;
mod kdtree;
mod node;
mod query;
pub mod split;
mod wasm;

pub use bounds::Bounds;
pub use distance::DistanceMetric;
pub use distance::Manhattan;
pub use distance::SquaredEuclidean;
pub use distance::WeightedSquaredEuclidean;
pub use error::ErrorKind;
pub use error::Result;
pub use heap::BoundedHeap;
pub use iter::Iter;
pub use kdtree::DEFAULT_BUCKET_SIZE;
pub use kdtree::KdTree;
pub use kdtree::TreeOptions;
pub use split::Fraction;
pub use split::Midpoint;
pub use split::SplitStrategy;
pub use wasm::KdTreeWASM;
