//! Shared helpers for prsketch integration tests
//!
//! Deterministic strategy doubles and an exact edge-weight oracle.

#![allow(dead_code)]

use prsketch::{Edge, HashFamily, NodeId, RankGenerator};
use std::collections::HashMap;

/// Letters encode as their alphabet position (`A = 1`), digits as their value.
pub fn encode(node: &NodeId) -> usize {
    let s = node.as_str();
    if let Ok(n) = s.parse::<usize>() {
        return n;
    }
    s.bytes()
        .fold(0, |acc, b| acc * 26 + (b.to_ascii_uppercase() - b'A') as usize + 1)
}

/// `hash(layer, n) = (enc(n) + layer) mod width`
pub struct NumericHash;

impl HashFamily for NumericHash {
    fn bucket(&self, layer: usize, node: &NodeId, width: usize) -> usize {
        (encode(node) + layer) % width
    }
}

/// `rank(n)[i] = (enc(n) * (i + 1)) mod pattern_length`
pub struct NumericRank;

impl RankGenerator for NumericRank {
    fn ranks(&self, node: &NodeId, pattern_length: usize) -> Vec<u32> {
        let e = encode(node);
        (0..pattern_length)
            .map(|i| ((e * (i + 1)) % pattern_length) as u32)
            .collect()
    }
}

/// Exact per-pair weight totals for the same stream the sketch saw
#[derive(Debug, Default)]
pub struct ExactGraph {
    weights: HashMap<(NodeId, NodeId), f64>,
}

impl ExactGraph {
    pub fn add(&mut self, edges: &[Edge]) {
        for edge in edges {
            *self
                .weights
                .entry((edge.source.clone(), edge.dest.clone()))
                .or_default() += edge.weight;
        }
    }

    pub fn weight(&self, source: &NodeId, dest: &NodeId) -> f64 {
        self.weights
            .get(&(source.clone(), dest.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn contains(&self, source: &NodeId, dest: &NodeId) -> bool {
        self.weights.contains_key(&(source.clone(), dest.clone()))
    }

    pub fn pairs(&self) -> impl Iterator<Item = &(NodeId, NodeId)> {
        self.weights.keys()
    }
}

pub fn n(id: &str) -> NodeId {
    NodeId::from(id)
}
