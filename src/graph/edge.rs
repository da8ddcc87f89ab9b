//! Weighted directed edges as delivered by the ingestion layer

use super::node::NodeId;
use serde::{Deserialize, Serialize};

/// Weight assigned when the source does not supply one
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

fn default_weight() -> f64 {
    DEFAULT_EDGE_WEIGHT
}

/// A directed, weighted edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node
    pub source: NodeId,
    /// Destination node
    pub dest: NodeId,
    /// Edge weight, 1.0 when absent from the input
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Edge {
    /// Create an edge with the default weight
    pub fn new(source: impl Into<NodeId>, dest: impl Into<NodeId>) -> Self {
        Self::weighted(source, dest, DEFAULT_EDGE_WEIGHT)
    }

    /// Create an edge with an explicit weight
    pub fn weighted(source: impl Into<NodeId>, dest: impl Into<NodeId>, weight: f64) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            weight,
        }
    }

    /// The exact `(source, dest)` pair this edge contributes to a cell
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source.clone(), self.dest.clone())
    }
}

/// The exact `(source, dest)` pair recorded in a cell's contributor list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: NodeId,
    pub dest: NodeId,
}

impl EdgeKey {
    pub fn new(source: impl Into<NodeId>, dest: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Compare against a borrowed pair without cloning
    pub fn matches(&self, source: &NodeId, dest: &NodeId) -> bool {
        &self.source == source && &self.dest == dest
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.dest)
    }
}
