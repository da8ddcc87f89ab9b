//! Ingest pipeline: edge source -> batches -> sketch engine
//!
//! Batches are applied strictly in arrival order. Cancellation is checked
//! between batches, never in the middle of one.

use super::cancel::CancellationToken;
use super::reader::{EdgeFileReader, IngestError, IngestResult, DEFAULT_BATCH_SIZE};
use crate::sketch::{SketchEngine, UpdateStats};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Batches handed to the engine
    pub batches: usize,
    /// Edges handed to the engine
    pub edges: usize,
    /// Malformed lines skipped
    pub skipped: usize,
    /// Whether the run stopped on cancellation before the input was exhausted
    pub cancelled: bool,
    /// Per-layer outcomes across all batches
    pub stats: UpdateStats,
}

/// Feeds edge batches from a line-oriented source into a shared engine.
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    engine: Arc<SketchEngine>,
    batch_size: usize,
    strict: bool,
}

impl IngestPipeline {
    pub fn new(engine: Arc<SketchEngine>) -> Self {
        Self {
            engine,
            batch_size: DEFAULT_BATCH_SIZE,
            strict: false,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Abort on the first malformed line instead of skipping it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn engine(&self) -> &Arc<SketchEngine> {
        &self.engine
    }

    /// Ingest every batch from `reader`, in order.
    pub fn ingest_reader<R: BufRead>(
        &self,
        reader: R,
        cancel: &CancellationToken,
    ) -> IngestResult<IngestReport> {
        self.drain(
            EdgeFileReader::new(reader, self.batch_size).strict(self.strict),
            cancel,
        )
    }

    /// Ingest an edge-list file from disk.
    pub fn ingest_file(
        &self,
        path: impl Into<PathBuf>,
        cancel: &CancellationToken,
    ) -> IngestResult<IngestReport> {
        let path = path.into();
        info!(path = %path.display(), batch_size = self.batch_size, "ingesting edge file");
        let reader = EdgeFileReader::open(&path, self.batch_size)?.strict(self.strict);
        self.drain(reader, cancel)
    }

    /// Run [`ingest_file`](Self::ingest_file) on tokio's blocking pool.
    pub fn spawn_file(
        &self,
        path: impl Into<PathBuf>,
        cancel: CancellationToken,
    ) -> JoinHandle<IngestResult<IngestReport>> {
        let pipeline = self.clone();
        let path = path.into();
        tokio::task::spawn_blocking(move || pipeline.ingest_file(path, &cancel))
    }

    fn drain<R: BufRead>(
        &self,
        mut reader: EdgeFileReader<R>,
        cancel: &CancellationToken,
    ) -> IngestResult<IngestReport> {
        let mut report = IngestReport::default();
        loop {
            if cancel.is_cancelled() {
                debug!(batches = report.batches, "ingestion cancelled");
                report.cancelled = true;
                break;
            }
            let Some(batch) = reader.next_batch()? else {
                break;
            };
            let stats = self.engine.update(&batch);
            info!(
                batch_id = report.batches,
                edges = batch.len(),
                "processed batch"
            );
            report.batches += 1;
            report.edges += batch.len();
            report.stats.absorb(stats);
        }
        report.skipped = reader.skipped();
        Ok(report)
    }
}

/// Await a task from [`IngestPipeline::spawn_file`], folding a panicked or
/// aborted task into [`IngestError::Task`].
pub async fn join_ingest(
    handle: &mut JoinHandle<IngestResult<IngestReport>>,
) -> IngestResult<IngestReport> {
    handle
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
}
