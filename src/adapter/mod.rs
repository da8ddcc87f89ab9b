//! Ingestion adapter layer
//!
//! Turns a line-oriented edge list into ordered batches for the sketch engine.

mod cancel;
mod ingest;
mod parse;
mod reader;

pub use cancel::CancellationToken;
pub use ingest::{join_ingest, IngestPipeline, IngestReport};
pub use parse::{parse_edge_line, LineError};
pub use reader::{EdgeFileReader, IngestError, IngestResult, DEFAULT_BATCH_SIZE};
