//! prsketch: Rank Sketch for Streaming Graphs
//!
//! A bounded-memory probabilistic summary of a directed, weighted edge stream.
//! Edges hash into a `width × width × depth` cell matrix; each cell keeps only
//! the highest-ranked edges that reached it, so memory stays fixed no matter
//! how long the stream runs.
//!
//! # Core Concepts
//!
//! - **Layers**: `depth` independent hash functions, each giving one estimate
//! - **Ranks**: per-node priority permutations; an edge's rank at a layer is the
//!   smaller of its endpoints' ranks, and higher ranks evict lower ones
//! - **Contributors**: the bounded list of exact pairs credited to a cell
//!
//! Two queries are answered: [`SketchEngine::edge_weight`] (minimum over the
//! layers where the pair still holds its cell) and [`SketchEngine::member`]
//! (whether the exact pair survives in any contributor list). Both may return
//! false negatives; `member` never returns a false positive.
//!
//! # Example
//!
//! ```
//! use prsketch::{Edge, NodeId, SketchConfig, SketchEngine};
//!
//! let engine = SketchEngine::new(SketchConfig::new(1000, 5, 8, 3)).unwrap();
//! engine.update(&[Edge::new("0", "5"), Edge::new("0", "5")]);
//! assert_eq!(engine.edge_weight(&NodeId::from("0"), &NodeId::from("5")), 2.0);
//! assert!(engine.member(&NodeId::from("0"), &NodeId::from("5")));
//! ```

pub mod adapter;
pub mod config;
mod graph;
pub mod query;
pub mod sketch;

pub use adapter::{CancellationToken, IngestError, IngestPipeline, IngestReport};
pub use config::{ConfigError, SessionConfig};
pub use graph::{Edge, EdgeKey, NodeId, DEFAULT_EDGE_WEIGHT};
pub use query::{QueryPair, QueryPoller, QueryReport, QueryResult};
pub use sketch::{
    CellSnapshot, HashFamily, RankGenerator, SketchConfig, SketchEngine, SketchError,
    SketchResult, UpdateStats,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
