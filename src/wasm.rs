use crate::distance::SquaredEuclidean;
use crate::kdtree::KdTree;
use js_sys::Array;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

/// JavaScript-facing tree over `f64` coordinates with `u32` ids as payloads.
///
/// Distances and radii are squared Euclidean.
#[wasm_bindgen(js_name = KdTree)]
pub struct KdTreeWASM {
    inner: KdTree<f64, u32>,
}

#[wasm_bindgen(js_class = KdTree)]
impl KdTreeWASM {
    #[wasm_bindgen(constructor)]
    pub fn new(dimensions: usize) -> Result<KdTreeWASM, JsError> {
        Ok(KdTreeWASM {
            inner: KdTree::new(dimensions)?,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(getter)]
    pub fn depth(&self) -> usize {
        self.inner.depth()
    }

    pub fn insert(&mut self, point: &[f64], id: u32) -> Result<(), JsError> {
        Ok(self.inner.insert(point, id)?)
    }

    #[wasm_bindgen(js_name = insertIfAbsent)]
    pub fn insert_if_absent(&mut self, point: &[f64], id: u32) -> Result<bool, JsError> {
        Ok(self.inner.insert_if_absent(point, id)?)
    }

    /// Inserts a flat buffer of points, numbering them from `first_id`.
    ///
    /// Fails without inserting anything if the ids would run past `u32::MAX`.
    #[wasm_bindgen(js_name = insertAll)]
    pub fn insert_all(&mut self, points: &[f64], first_id: u32) -> Result<usize, JsError> {
        let count = points.len() / self.inner.dimensions();
        let ids = id_block(first_id, count)
            .ok_or_else(|| JsError::new("KdTree error: ids would overflow u32"))?;
        Ok(self.inner.insert_all(points, ids)?)
    }

    pub fn nearest(&self, point: &[f64]) -> Result<Option<u32>, JsError> {
        let found = self.inner.nearest_neighbour(point, &SquaredEuclidean)?;
        Ok(found.map(|(_, &id)| id))
    }

    #[wasm_bindgen(js_name = nearestK)]
    pub fn nearest_k(&self, point: &[f64], k: usize) -> Result<Vec<u32>, JsError> {
        let found = self.inner.nearest_neighbours(point, k, true, &SquaredEuclidean)?;
        Ok(found.into_iter().map(|(_, &id)| id).collect())
    }

    /// Returns `[id, distance]` pairs, nearest first.
    #[wasm_bindgen(js_name = nearestKWithDistances)]
    pub fn nearest_k_with_distances(&self, point: &[f64], k: usize) -> Result<Array, JsError> {
        let found = self.inner.nearest_neighbours(point, k, true, &SquaredEuclidean)?;
        Ok(found
            .into_iter()
            .map(|(d, &id)| Array::of2(&JsValue::from(id), &JsValue::from_f64(d)))
            .collect())
    }

    pub fn within(&self, point: &[f64], radius: f64) -> Result<Vec<u32>, JsError> {
        let found = self.inner.within(point, radius, &SquaredEuclidean, true)?;
        Ok(found.into_iter().map(|(_, &id)| id).collect())
    }

    /// Nearest id for every point of a flat buffer; `undefined` where none exists.
    #[wasm_bindgen(js_name = nearestBatch)]
    pub fn nearest_batch(&self, points: &[f64]) -> Result<Array, JsError> {
        let found = self.inner.par_nearest_neighbour(points, &SquaredEuclidean)?;
        Ok(found
            .into_iter()
            .map(|hit| match hit {
                Some((_, &id)) => JsValue::from(id),
                None => JsValue::UNDEFINED,
            })
            .collect())
    }

    /// Every stored point as a flat coordinate buffer, in traversal order.
    pub fn points(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.inner.len() * self.inner.dimensions());
        self.inner.for_each(|p, _| out.extend_from_slice(p));
        out
    }

    /// Every stored id, in the same order as [`points`](Self::points).
    pub fn ids(&self) -> Vec<u32> {
        self.inner.iter().map(|(_, &id)| id).collect()
    }
}

/// Consecutive ids `first_id..first_id + count`, or `None` if they do not fit in `u32`.
fn id_block(first_id: u32, count: usize) -> Option<impl Iterator<Item = u32>> {
    let count = u32::try_from(count).ok()?;
    first_id.checked_add(count.saturating_sub(1))?;
    Some((0..count).map(move |i| first_id + i))
}
