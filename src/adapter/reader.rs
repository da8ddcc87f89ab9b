//! Incremental edge-list reader producing bounded batches

use super::parse::{parse_edge_line, LineError};
use crate::graph::Edge;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while reading edges
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: LineError },

    #[error("ingest task failed: {0}")]
    Task(String),
}

/// Result type for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Default number of edges per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Reads an edge list line by line and yields batches of at most
/// `batch_size` edges, so a large file is never held in memory at once.
///
/// In lenient mode (the default) malformed lines are logged and counted;
/// in strict mode the first one aborts the read.
#[derive(Debug)]
pub struct EdgeFileReader<R> {
    reader: R,
    batch_size: usize,
    strict: bool,
    line_no: usize,
    skipped: usize,
    buf: String,
}

impl EdgeFileReader<BufReader<File>> {
    /// Open a file on disk
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> IngestResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), batch_size))
    }
}

impl<R: BufRead> EdgeFileReader<R> {
    pub fn new(reader: R, batch_size: usize) -> Self {
        Self {
            reader,
            batch_size: batch_size.max(1),
            strict: false,
            line_no: 0,
            skipped: 0,
            buf: String::new(),
        }
    }

    /// Fail on the first malformed line instead of skipping it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    /// Malformed lines skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Read the next batch; `None` once the input is exhausted.
    pub fn next_batch(&mut self) -> IngestResult<Option<Vec<Edge>>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                break;
            }
            self.line_no += 1;
            match parse_edge_line(&self.buf) {
                Ok(Some(edge)) => batch.push(edge),
                Ok(None) => {}
                Err(reason) if self.strict => {
                    return Err(IngestError::Malformed {
                        line: self.line_no,
                        reason,
                    });
                }
                Err(reason) => {
                    warn!(line = self.line_no, %reason, "skipping malformed edge line");
                    self.skipped += 1;
                }
            }
        }
        Ok(if batch.is_empty() { None } else { Some(batch) })
    }
}

impl<R: BufRead> Iterator for EdgeFileReader<R> {
    type Item = IngestResult<Vec<Edge>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
