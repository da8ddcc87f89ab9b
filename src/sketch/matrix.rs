//! The `width × width × depth` cell array

use super::cell::{Cell, CellOutcome, CellSnapshot};
use crate::graph::{EdgeKey, NodeId};
use dashmap::DashMap;

/// Sparse arena of cells addressed by flat index.
///
/// A position that was never written is absent, which is indistinguishable
/// from a cell in its initial state (no rank, zero weight, no contributors).
/// Each cell is read and written under its shard lock, so its three fields are
/// always observed together.
#[derive(Debug)]
pub struct SketchMatrix {
    width: usize,
    depth: usize,
    conflict_limit: usize,
    cells: DashMap<usize, Cell>,
}

impl SketchMatrix {
    pub fn new(width: usize, depth: usize, conflict_limit: usize) -> Self {
        Self {
            width,
            depth,
            conflict_limit,
            cells: DashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Flat index of `(x, y, layer)`
    pub fn index(&self, x: usize, y: usize, layer: usize) -> usize {
        debug_assert!(x < self.width && y < self.width && layer < self.depth);
        (x * self.width + y) * self.depth + layer
    }

    /// Offer an edge to the cell at `index` with priority `incoming`.
    pub fn offer(&self, index: usize, incoming: u32, key: &EdgeKey, weight: f64) -> CellOutcome {
        self.cells
            .entry(index)
            .or_default()
            .apply(incoming, key, weight, self.conflict_limit)
    }

    /// Rank and weight of the cell at `index`, read as one unit
    pub fn rank_and_weight(&self, index: usize) -> (Option<u32>, f64) {
        self.cells
            .get(&index)
            .map(|cell| (cell.rank(), cell.weight()))
            .unwrap_or((None, 0.0))
    }

    pub fn snapshot(&self, index: usize) -> Option<CellSnapshot> {
        self.cells.get(&index).map(|cell| cell.snapshot())
    }

    /// Whether any surviving contributor list holds exactly `(source, dest)`
    pub fn contains_pair(&self, source: &NodeId, dest: &NodeId) -> bool {
        self.cells.iter().any(|cell| cell.contains(source, dest))
    }

    /// Number of cells that have admitted at least one edge
    pub fn occupied(&self) -> usize {
        self.cells.len()
    }
}
