//! A single sketch cell and its admission rule

use crate::graph::{EdgeKey, NodeId};
use serde::Serialize;
use std::collections::VecDeque;

/// What an incoming edge did to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    /// Strictly higher rank (or first occupant): prior state replaced
    Admitted,
    /// Tying rank: weight accumulated, contributor appended if new
    Merged,
    /// Strictly lower rank: no effect
    Dropped,
}

/// Aggregate state for one `(x, y, layer)` position.
///
/// `rank`, `weight` and `contributors` only ever change together through
/// [`Cell::apply`]. `rank == None` sorts below every admitted rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    rank: Option<u32>,
    weight: f64,
    contributors: VecDeque<EdgeKey>,
}

impl Cell {
    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn contributors(&self) -> impl Iterator<Item = &EdgeKey> {
        self.contributors.iter()
    }

    pub fn contains(&self, source: &NodeId, dest: &NodeId) -> bool {
        self.contributors.iter().any(|k| k.matches(source, dest))
    }

    /// Apply one edge with priority `incoming` to this cell.
    pub fn apply(
        &mut self,
        incoming: u32,
        key: &EdgeKey,
        weight: f64,
        conflict_limit: usize,
    ) -> CellOutcome {
        match self.rank {
            Some(current) if incoming < current => CellOutcome::Dropped,
            Some(current) if incoming == current => {
                self.weight += weight;
                if !self.contributors.contains(key) {
                    self.contributors.push_back(key.clone());
                    while self.contributors.len() > conflict_limit {
                        self.contributors.pop_front();
                    }
                }
                CellOutcome::Merged
            }
            _ => {
                self.rank = Some(incoming);
                self.weight = weight;
                self.contributors.clear();
                self.contributors.push_back(key.clone());
                CellOutcome::Admitted
            }
        }
    }

    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            rank: self.rank,
            weight: self.weight,
            contributors: self.contributors.iter().cloned().collect(),
        }
    }
}

/// A consistent, owned copy of a cell's state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub rank: Option<u32>,
    pub weight: f64,
    pub contributors: Vec<EdgeKey>,
}
