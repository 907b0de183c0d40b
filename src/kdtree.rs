use crate::bounds::Bounds;
use crate::error::{ErrorKind, Result, check_buffer, check_dimensions};
use crate::node::{Leaf, Node, NodeKind, ROOT, Stem};
use crate::split::{Midpoint, SplitStrategy};
use num_traits::Float;

/// Bucket size of a fresh leaf unless configured otherwise.
pub const DEFAULT_BUCKET_SIZE: usize = 24;

/// Construction options for a [`KdTree`].
#[derive(Debug)]
pub struct TreeOptions<T: Float> {
    /// Number of points a leaf holds before it tries to split.
    pub bucket_size: usize,
    /// Multiplier applied to each axis width when choosing the split axis.
    /// `None` weighs every axis equally.
    pub weights: Option<Vec<f64>>,
    /// Chooses the split value between a leaf's bounds.
    pub split: Box<dyn SplitStrategy<T>>,
}

impl<T: Float + 'static> Default for TreeOptions<T> {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            weights: None,
            split: Box::new(Midpoint),
        }
    }
}

impl<T: Float + 'static> TreeOptions<T> {
    pub fn bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn split(mut self, split: impl SplitStrategy<T> + 'static) -> Self {
        self.split = Box::new(split);
        self
    }
}

/// An adaptive bucketed k-d tree mapping points to payloads.
///
/// Points are inserted one at a time. Leaves hold up to `bucket_size` points and
/// split along their widest (weighted) axis when they overflow. When no split can
/// separate a bucket, for example because all of its points coincide, the bucket
/// doubles its capacity instead. There is no rebalancing and no removal.
///
/// Coordinates may be `f32` or `f64`. NaN coordinates are accepted: they never
/// corrupt the structure, but a NaN point is never returned by a query and a NaN
/// query finds nothing.
///
/// Queries take `&self` and can run in parallel; insertion takes `&mut self`.
#[derive(Debug)]
pub struct KdTree<T: Float, P> {
    pub(crate) dims: usize,
    pub(crate) nodes: Vec<Node<T, P>>,
    pub(crate) max_depth: usize,
    weights: Box<[T]>,
    bucket_size: usize,
    split: Box<dyn SplitStrategy<T>>,
}

impl<T: Float + 'static, P> KdTree<T, P> {
    /// Creates an empty tree with default options.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ZeroDimensions`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        Self::with_options(dimensions, TreeOptions::default())
    }

    /// Creates an empty tree whose split axis is chosen by weighted width.
    ///
    /// `weight(i)` scales the extent of axis `i` when leaves pick the axis to
    /// split on.
    pub fn with_weights(dimensions: usize, weight: impl Fn(usize) -> f64) -> Result<Self> {
        let weights = (0..dimensions).map(weight).collect();
        Self::with_options(dimensions, TreeOptions::default().weights(weights))
    }

    /// Creates an empty tree from explicit options.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ZeroDimensions`], [`ErrorKind::ZeroBucketSize`], or
    /// [`ErrorKind::DimensionMismatch`] if the weights do not have one entry per
    /// dimension.
    pub fn with_options(dimensions: usize, options: TreeOptions<T>) -> Result<Self> {
        if dimensions == 0 {
            return Err(ErrorKind::ZeroDimensions);
        }
        if options.bucket_size == 0 {
            return Err(ErrorKind::ZeroBucketSize);
        }
        let weights: Box<[T]> = match options.weights {
            Some(w) => {
                check_dimensions(&w, dimensions)?;
                w.into_iter()
                    .map(|x| T::from(x).unwrap_or_else(T::one))
                    .collect()
            }
            None => vec![T::one(); dimensions].into(),
        };

        let root = Node {
            bounds: Bounds {
                min: vec![T::infinity(); dimensions].into(),
                max: vec![T::neg_infinity(); dimensions].into(),
            },
            count: 0,
            parent: None,
            kind: NodeKind::Leaf(Leaf::new(options.bucket_size, dimensions)),
        };

        Ok(KdTree {
            dims: dimensions,
            nodes: vec![root],
            max_depth: 0,
            weights,
            bucket_size: options.bucket_size,
            split: options.split,
        })
    }

    /// Builds a tree from a flat coordinate buffer with stride `dimensions`.
    ///
    /// Payloads are paired with points in order; extra payloads are ignored.
    pub fn from_points(
        dimensions: usize,
        coords: &[T],
        payloads: impl IntoIterator<Item = P>,
    ) -> Result<Self> {
        let mut tree = Self::new(dimensions)?;
        tree.insert_all(coords, payloads)?;
        Ok(tree)
    }
}

impl<T: Float, P> KdTree<T, P> {
    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.nodes[ROOT].count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// Depth of the deepest leaf; zero while the root is still a leaf.
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Initial capacity of every leaf.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Leaf(_)))
            .count()
    }

    /// Box around every stored point, `None` for an empty tree.
    pub fn bounds(&self) -> Option<&Bounds<T>> {
        if self.is_empty() {
            None
        } else {
            Some(&self.nodes[ROOT].bounds)
        }
    }

    /// Adds a point and its payload.
    ///
    /// Coincident points are allowed; use [`insert_if_absent`](Self::insert_if_absent)
    /// to reject them.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DimensionMismatch`] if `point` has the wrong length.
    pub fn insert(&mut self, point: &[T], payload: P) -> Result<()> {
        check_dimensions(point, self.dims)?;
        self.add(point, payload, false);
        Ok(())
    }

    /// Adds a point unless one with exactly the same coordinates is stored.
    ///
    /// Coordinates are compared with `==`, so `-0.0` matches `0.0` and a point
    /// containing NaN is never considered present. Returns `false` when the point
    /// was rejected, leaving the tree's contents unchanged.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DimensionMismatch`] if `point` has the wrong length.
    pub fn insert_if_absent(&mut self, point: &[T], payload: P) -> Result<bool> {
        check_dimensions(point, self.dims)?;
        Ok(self.add(point, payload, true))
    }

    /// Inserts every point of a flat buffer with stride `dimensions()`.
    ///
    /// Returns the number of points inserted: the shorter of the point count and
    /// the payload count.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::PartialPoint`] if the buffer ends with a partial point. Nothing
    /// is inserted in that case.
    pub fn insert_all(&mut self, coords: &[T], payloads: impl IntoIterator<Item = P>) -> Result<usize> {
        check_buffer(coords, self.dims)?;
        let mut inserted = 0;
        for (point, payload) in coords.chunks_exact(self.dims).zip(payloads) {
            self.add(point, payload, false);
            inserted += 1;
        }
        Ok(inserted)
    }

    fn add(&mut self, point: &[T], payload: P, reject_duplicates: bool) -> bool {
        let mut id = ROOT;
        let mut depth = 0;
        loop {
            let node = &mut self.nodes[id];
            let (duplicate, full) = match &node.kind {
                NodeKind::Stem(stem) => {
                    let next = stem.child_for(point);
                    node.count += 1;
                    node.bounds.extend(point);
                    id = next;
                    depth += 1;
                    continue;
                }
                NodeKind::Leaf(leaf) => (reject_duplicates && leaf.contains(point), leaf.is_full()),
            };

            if duplicate {
                self.rollback(id);
                return false;
            }
            // A successful split turns this node into a stem; descend again.
            if full && self.split(id, depth) {
                continue;
            }

            let node = &mut self.nodes[id];
            if node.count == 0 {
                node.bounds = Bounds::from_point(point);
            } else {
                node.bounds.extend(point);
            }
            node.count += 1;
            if let NodeKind::Leaf(leaf) = &mut node.kind {
                leaf.push(point, payload);
            }
            return true;
        }
    }

    /// Undoes the count increments made while descending to `leaf`.
    fn rollback(&mut self, leaf: usize) {
        let mut cursor = self.nodes[leaf].parent;
        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            debug_assert!(node.count > 1, "Stem count underflow during rollback");
            node.count -= 1;
            cursor = node.parent;
        }
    }

    /// Splits the full leaf `id`, or doubles its capacity if no split separates
    /// its points. Returns `true` if the leaf became a stem.
    fn split(&mut self, id: usize, depth: usize) -> bool {
        let dims = self.dims;
        let node = &mut self.nodes[id];
        let NodeKind::Leaf(leaf) = &mut node.kind else {
            return false;
        };

        let axis = node.bounds.widest_axis(&self.weights);
        if !node.bounds.is_splittable(axis) {
            leaf.grow();
            return false;
        }
        let split_value = self
            .split
            .split_value(node.bounds.min[axis], node.bounds.max[axis]);
        let Some((left, right)) = leaf.partition(axis, split_value, dims, self.bucket_size) else {
            leaf.grow();
            return false;
        };

        let left_id = self.nodes.len();
        let right_id = left_id + 1;
        for child in [left, right] {
            self.nodes.push(Node {
                bounds: Bounds::from_points(&child.coords, dims),
                count: child.len(),
                parent: Some(id),
                kind: NodeKind::Leaf(child),
            });
        }
        self.nodes[id].kind = NodeKind::Stem(Stem {
            split_dim: axis,
            split_value,
            left: left_id,
            right: right_id,
        });
        self.max_depth = self.max_depth.max(depth + 1);
        true
    }
}
