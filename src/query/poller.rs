//! Periodic query polling and fan-out to subscribers

use super::types::{QueryPair, QueryReport, QueryResult};
use crate::adapter::CancellationToken;
use crate::sketch::SketchEngine;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Reports buffered per subscriber before the slowest one starts lagging
const CHANNEL_CAPACITY: usize = 64;

/// Answer every pair against the current sketch state
pub fn evaluate(engine: &SketchEngine, pairs: &[QueryPair]) -> Vec<QueryResult> {
    pairs
        .iter()
        .map(|pair| QueryResult {
            query: pair.clone(),
            edge_weight: engine.edge_weight(&pair.source, &pair.dest),
            reachability: engine.member(&pair.source, &pair.dest),
        })
        .collect()
}

/// Polls a fixed list of pairs on an interval and broadcasts each report.
///
/// Subscribers that fall more than the channel capacity behind skip the
/// oldest reports. Publishing with no subscribers is not an error.
#[derive(Debug)]
pub struct QueryPoller {
    engine: Arc<SketchEngine>,
    pairs: Vec<QueryPair>,
    interval: Duration,
    sender: broadcast::Sender<QueryReport>,
    sequence: u64,
}

impl QueryPoller {
    pub fn new(engine: Arc<SketchEngine>, pairs: Vec<QueryPair>, interval: Duration) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            engine,
            pairs,
            interval,
            sender,
            sequence: 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueryReport> {
        self.sender.subscribe()
    }

    pub fn pairs(&self) -> &[QueryPair] {
        &self.pairs
    }

    /// Evaluate all pairs now and publish the report.
    pub fn poll_once(&mut self) -> QueryReport {
        let report = QueryReport {
            sequence: self.sequence,
            polled_at: Utc::now(),
            results: evaluate(&self.engine, &self.pairs),
        };
        self.sequence += 1;
        let delivered = self.sender.send(report.clone()).unwrap_or(0);
        debug!(sequence = report.sequence, subscribers = delivered, "published query report");
        report
    }

    /// Poll on every tick until `cancel` fires. Returns the number of reports
    /// published. The first poll happens immediately.
    pub async fn run(&mut self, cancel: &CancellationToken) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            pairs = self.pairs.len(),
            interval_ms = self.interval.as_millis() as u64,
            "query poller started"
        );
        let start = self.sequence;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll_once();
                }
            }
        }
        info!(reports = self.sequence - start, "query poller stopped");
        self.sequence - start
    }
}
