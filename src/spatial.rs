//! Spatial hash used to find collision candidates.
//!
//! Buckets hold agent indices into the owning population. Queries only
//! look at the query point's own cell, not the 8 surrounding ones, so two
//! colliding agents on opposite sides of a cell boundary are not reported.

use crate::model::Position;
use rustc_hash::FxHashMap;

/// Default cell edge length (world units).
pub const DEFAULT_CELL_SIZE: f64 = 20.0;

/// Grid cell key: floor-divided (x, y) coordinates.
pub type CellKey = (i64, i64);

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: FxHashMap<CellKey, Vec<usize>>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: FxHashMap::default(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell_key(&self, position: Position) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i64,
            (position.y / self.cell_size).floor() as i64,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Append agent `idx` to the bucket of `position`, keeping insertion order.
    pub fn insert(&mut self, idx: usize, position: Position) {
        let key = self.cell_key(position);
        self.cells.entry(key).or_default().push(idx);
    }

    /// Agents hashed into the same cell as `position` (empty if none).
    pub fn neighbors_of(&self, position: Position) -> &[usize] {
        self.cells
            .get(&self.cell_key(position))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of non-empty cells.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Total number of indexed agents.
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
