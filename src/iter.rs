use crate::kdtree::KdTree;
use crate::node::{LeafIter, Node, NodeKind, ROOT};
use num_traits::Float;

/// Depth-first iterator over every stored `(point, payload)` pair.
///
/// Leaves are visited left subtree first. Within a leaf, pairs come in
/// insertion order.
#[derive(Debug)]
pub struct Iter<'a, T, P> {
    nodes: &'a [Node<T, P>],
    dims: usize,
    pending: Vec<usize>,
    current: Option<LeafIter<'a, T, P>>,
    remaining: usize,
}

impl<'a, T: Float, P> Iterator for Iter<'a, T, P> {
    type Item = (&'a [T], &'a P);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(item);
            }
            let id = self.pending.pop()?;
            match &self.nodes[id].kind {
                NodeKind::Leaf(leaf) => self.current = Some(leaf.iter(self.dims)),
                NodeKind::Stem(stem) => {
                    self.pending.push(stem.right);
                    self.pending.push(stem.left);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Float, P> ExactSizeIterator for Iter<'_, T, P> {}

impl<T: Float, P> KdTree<T, P> {
    /// Iterates over every stored point and its payload.
    pub fn iter(&self) -> Iter<'_, T, P> {
        Iter {
            nodes: &self.nodes,
            dims: self.dims,
            pending: vec![ROOT],
            current: None,
            remaining: self.len(),
        }
    }

    /// Calls `visitor` once for every stored point and its payload.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&[T], &P),
    {
        for (point, payload) in self.iter() {
            visitor(point, payload);
        }
    }
}

impl<'a, T: Float, P> IntoIterator for &'a KdTree<T, P> {
    type Item = (&'a [T], &'a P);
    type IntoIter = Iter<'a, T, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
