//! Rank generator: node identifier -> priority permutation

use crate::graph::NodeId;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Maps a node to a permutation of `[0, pattern_length)`.
///
/// Entry `i` is the node's priority at layer `i`. Must be a pure function of
/// `(node, pattern_length)`, independent of the hash layer, and return exactly
/// `pattern_length` entries. A layer past the end of a short vector is read as
/// rank 0, the lowest priority.
pub trait RankGenerator: Send + Sync {
    fn ranks(&self, node: &NodeId, pattern_length: usize) -> Vec<u32>;
}

/// Seeded Fisher-Yates shuffle of `0..pattern_length`
///
/// The shuffle RNG is ChaCha8 seeded from xxh3 of the node bytes, never from
/// the process-randomized std hasher, so a seed yields the same permutation on
/// every platform and build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShuffleRankGenerator {
    seed: u64,
}

impl ShuffleRankGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl RankGenerator for ShuffleRankGenerator {
    fn ranks(&self, node: &NodeId, pattern_length: usize) -> Vec<u32> {
        let mut rng = ChaCha8Rng::seed_from_u64(xxh3_64_with_seed(node.as_bytes(), self.seed));
        let mut perm: Vec<u32> = (0..pattern_length as u32).collect();
        perm.shuffle(&mut rng);
        perm
    }
}
