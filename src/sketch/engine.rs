//! SketchEngine: the public entry point for the graph sketch

use super::cell::{CellOutcome, CellSnapshot};
use super::hash::{HashFamily, XxHashFamily};
use super::matrix::SketchMatrix;
use super::rank::{RankGenerator, ShuffleRankGenerator};
use crate::graph::{Edge, NodeId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised when constructing a sketch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SketchError {
    #[error("{name} must be positive")]
    ZeroDimension { name: &'static str },

    #[error("pattern_length ({pattern_length}) must be at least depth ({depth})")]
    PatternTooShort { pattern_length: usize, depth: usize },

    #[error("width ({width}) squared times depth ({depth}) does not fit in usize")]
    TooManyCells { width: usize, depth: usize },
}

/// Result type for sketch construction
pub type SketchResult<T> = Result<T, SketchError>;

fn default_conflict_limit() -> usize {
    3
}

/// Sketch dimensions, immutable once an engine is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchConfig {
    /// Buckets per axis
    pub width: usize,
    /// Number of independent hash layers
    pub depth: usize,
    /// Length of each node's rank permutation
    pub pattern_length: usize,
    /// Maximum contributors remembered per cell
    #[serde(default = "default_conflict_limit")]
    pub conflict_limit: usize,
}

impl SketchConfig {
    pub fn new(width: usize, depth: usize, pattern_length: usize, conflict_limit: usize) -> Self {
        Self {
            width,
            depth,
            pattern_length,
            conflict_limit,
        }
    }

    pub fn validate(&self) -> SketchResult<()> {
        for (name, value) in [
            ("width", self.width),
            ("depth", self.depth),
            ("pattern_length", self.pattern_length),
            ("conflict_limit", self.conflict_limit),
        ] {
            if value == 0 {
                return Err(SketchError::ZeroDimension { name });
            }
        }
        if self.pattern_length < self.depth {
            return Err(SketchError::PatternTooShort {
                pattern_length: self.pattern_length,
                depth: self.depth,
            });
        }
        if self.cell_count().is_none() {
            return Err(SketchError::TooManyCells {
                width: self.width,
                depth: self.depth,
            });
        }
        Ok(())
    }

    /// Number of addressable cells, `None` when it overflows `usize`
    pub fn cell_count(&self) -> Option<usize> {
        self.width
            .checked_mul(self.width)
            .and_then(|cells| cells.checked_mul(self.depth))
    }
}

/// Per-layer outcome counts for one or more `update` calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub edges: usize,
    pub admitted: usize,
    pub merged: usize,
    pub dropped: usize,
}

impl UpdateStats {
    fn record(&mut self, outcome: CellOutcome) {
        match outcome {
            CellOutcome::Admitted => self.admitted += 1,
            CellOutcome::Merged => self.merged += 1,
            CellOutcome::Dropped => self.dropped += 1,
        }
    }

    pub fn absorb(&mut self, other: UpdateStats) {
        self.edges += other.edges;
        self.admitted += other.admitted;
        self.merged += other.merged;
        self.dropped += other.dropped;
    }
}

/// Where a pair lands at one layer and with what priority
struct LayerProbe {
    index: usize,
    rank: u32,
}

/// Bounded-memory sketch of a directed, weighted edge stream.
///
/// Answers approximate edge-weight and exact-pair membership queries over the
/// edges that survive rank-based eviction. Updates are serialized internally;
/// queries take `&self` and may run alongside an update, observing each cell
/// either before or after that update touched it.
pub struct SketchEngine {
    config: SketchConfig,
    hash: Arc<dyn HashFamily>,
    ranks: Arc<dyn RankGenerator>,
    matrix: SketchMatrix,
    writer: Mutex<()>,
}

impl SketchEngine {
    /// Create an engine with the default xxh3 hash family and shuffle ranks
    pub fn new(config: SketchConfig) -> SketchResult<Self> {
        Self::with_seed(config, 0)
    }

    /// Create an engine whose default strategies are keyed by `seed`
    pub fn with_seed(config: SketchConfig, seed: u64) -> SketchResult<Self> {
        Self::with_strategies(
            config,
            Arc::new(XxHashFamily::new(seed)),
            Arc::new(ShuffleRankGenerator::new(seed)),
        )
    }

    /// Create an engine with injected hash and rank strategies
    pub fn with_strategies(
        config: SketchConfig,
        hash: Arc<dyn HashFamily>,
        ranks: Arc<dyn RankGenerator>,
    ) -> SketchResult<Self> {
        config.validate()?;
        debug!(
            width = config.width,
            depth = config.depth,
            pattern_length = config.pattern_length,
            conflict_limit = config.conflict_limit,
            "sketch engine created"
        );
        Ok(Self {
            matrix: SketchMatrix::new(config.width, config.depth, config.conflict_limit),
            config,
            hash,
            ranks,
            writer: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    fn probe(&self, source: &NodeId, dest: &NodeId) -> Vec<LayerProbe> {
        let SketchConfig {
            width,
            depth,
            pattern_length,
            ..
        } = self.config;
        let rs = self.ranks.ranks(source, pattern_length);
        let rd = self.ranks.ranks(dest, pattern_length);
        let rank_at = |ranks: &[u32], layer: usize| ranks.get(layer).copied().unwrap_or(0);
        (0..depth)
            .map(|layer| {
                let x = self.hash.bucket(layer, source, width) % width;
                let y = self.hash.bucket(layer, dest, width) % width;
                LayerProbe {
                    index: self.matrix.index(x, y, layer),
                    rank: rank_at(&rs, layer).min(rank_at(&rd, layer)),
                }
            })
            .collect()
    }

    /// Apply a batch of edges in order.
    ///
    /// Batches never interleave: a second caller waits until the first batch
    /// has been fully applied.
    pub fn update<'a, I>(&self, batch: I) -> UpdateStats
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stats = UpdateStats::default();
        for edge in batch {
            let key = edge.key();
            for probe in self.probe(&edge.source, &edge.dest) {
                stats.record(self.matrix.offer(probe.index, probe.rank, &key, edge.weight));
            }
            stats.edges += 1;
        }
        trace!(
            edges = stats.edges,
            admitted = stats.admitted,
            merged = stats.merged,
            dropped = stats.dropped,
            "batch applied"
        );
        stats
    }

    /// Estimated weight of `source -> dest`.
    ///
    /// Minimum weight over the layers whose cell rank equals the pair's rank
    /// there; `0.0` when no layer matches.
    pub fn edge_weight(&self, source: &NodeId, dest: &NodeId) -> f64 {
        self.probe(source, dest)
            .into_iter()
            .filter_map(|probe| match self.matrix.rank_and_weight(probe.index) {
                (Some(rank), weight) if rank == probe.rank => Some(weight),
                _ => None,
            })
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Whether `(source, dest)` is still listed as a contributor in any cell.
    ///
    /// Exact-pair membership over surviving state, not path reachability.
    /// Visits every occupied cell.
    pub fn member(&self, source: &NodeId, dest: &NodeId) -> bool {
        self.matrix.contains_pair(source, dest)
    }

    /// Copy of the cell at `(x, y, layer)`, `None` while it is still empty
    pub fn cell(&self, x: usize, y: usize, layer: usize) -> Option<CellSnapshot> {
        if x >= self.config.width || y >= self.config.width || layer >= self.config.depth {
            return None;
        }
        self.matrix.snapshot(self.matrix.index(x, y, layer))
    }

    /// The `(x, y)` bucket pair `source -> dest` maps to at each layer
    pub fn placement(&self, source: &NodeId, dest: &NodeId) -> Vec<(usize, usize)> {
        (0..self.config.depth)
            .map(|layer| {
                (
                    self.hash.bucket(layer, source, self.config.width) % self.config.width,
                    self.hash.bucket(layer, dest, self.config.width) % self.config.width,
                )
            })
            .collect()
    }

    pub fn occupied_cells(&self) -> usize {
        self.matrix.occupied()
    }
}

impl std::fmt::Debug for SketchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SketchEngine")
            .field("config", &self.config)
            .field("occupied_cells", &self.matrix.occupied())
            .finish()
    }
}
