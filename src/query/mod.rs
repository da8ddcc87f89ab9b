//! Query distribution: poll the sketch for configured pairs and publish
//! reports to in-process subscribers.

mod poller;
mod types;

pub use poller::{evaluate, QueryPoller};
pub use types::{QueryPair, QueryReport, QueryResult};
