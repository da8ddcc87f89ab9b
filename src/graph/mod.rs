//! Graph value types shared by the sketch, ingestion and query layers

mod edge;
mod node;

pub use edge::{Edge, EdgeKey, DEFAULT_EDGE_WEIGHT};
pub use node::NodeId;
