//! Query pairs and the result records published to subscribers

use crate::graph::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node ids in query lists may be written as bare integers (`[0, 5]`)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Text(String),
    Integer(i64),
}

impl From<RawNodeId> for NodeId {
    fn from(raw: RawNodeId) -> Self {
        match raw {
            RawNodeId::Text(s) => NodeId::from(s),
            RawNodeId::Integer(i) => NodeId::from(i.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct RawPair(RawNodeId, RawNodeId);

impl From<RawPair> for QueryPair {
    fn from(raw: RawPair) -> Self {
        QueryPair::new(raw.0, raw.1)
    }
}

/// A `(source, dest)` pair to poll. Serializes as a two-element list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawPair", into = "(NodeId, NodeId)")]
pub struct QueryPair {
    pub source: NodeId,
    pub dest: NodeId,
}

impl QueryPair {
    pub fn new(source: impl Into<NodeId>, dest: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

impl From<QueryPair> for (NodeId, NodeId) {
    fn from(pair: QueryPair) -> Self {
        (pair.source, pair.dest)
    }
}

impl std::fmt::Display for QueryPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.dest)
    }
}

/// Answers for one pair at one poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: QueryPair,
    pub edge_weight: f64,
    /// Exact-pair membership, not path reachability
    pub reachability: bool,
}

/// Everything published by one poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    /// Zero-based poll counter
    pub sequence: u64,
    pub polled_at: DateTime<Utc>,
    pub results: Vec<QueryResult>,
}

impl std::fmt::Display for QueryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "--- Query Results (#{}, {}) ---",
            self.sequence,
            self.polled_at.to_rfc3339()
        )?;
        for result in &self.results {
            writeln!(f, "{}", result.query)?;
            writeln!(f, "  Edge Weight: {}", result.edge_weight)?;
            writeln!(f, "  Reachable: {}", result.reachability)?;
        }
        Ok(())
    }
}
