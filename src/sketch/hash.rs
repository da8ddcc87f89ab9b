//! Keyed hash family: node identifier -> bucket index, one function per layer

use crate::graph::NodeId;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Maps a node to a bucket in `[0, width)` for a given layer.
///
/// Implementations must be pure: identical `(layer, node, width)` always yields
/// the same bucket for the lifetime of the engine, otherwise cells written
/// under one pattern can no longer be located by later queries. Distinct layers
/// should disagree on placement with high probability. The engine reduces any
/// bucket modulo `width`, so an out-of-range value wraps instead of addressing
/// another layer's cells.
pub trait HashFamily: Send + Sync {
    fn bucket(&self, layer: usize, node: &NodeId, width: usize) -> usize;

    /// The node's pattern vector: one bucket per layer
    fn pattern(&self, node: &NodeId, depth: usize, width: usize) -> Vec<usize> {
        (0..depth).map(|layer| self.bucket(layer, node, width)).collect()
    }
}

const LAYER_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// xxh3-64 keyed by a per-layer seed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XxHashFamily {
    seed: u64,
}

impl XxHashFamily {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn layer_seed(&self, layer: usize) -> u64 {
        // layer 0 must not collapse onto the rank generator's keying
        self.seed
            .wrapping_add((layer as u64).wrapping_add(1).wrapping_mul(LAYER_STRIDE))
    }
}

impl HashFamily for XxHashFamily {
    fn bucket(&self, layer: usize, node: &NodeId, width: usize) -> usize {
        debug_assert!(width > 0);
        let h = xxh3_64_with_seed(node.as_bytes(), self.layer_seed(layer));
        (h % width as u64) as usize
    }
}
