//! Edge-list line format
//!
//! One edge per line: `source<ws>dest[<ws>weight]`, where `<ws>` is any run
//! of tabs or spaces. Blank lines and lines starting with `#` carry no edge.

use crate::graph::Edge;
use thiserror::Error;

/// Why a non-comment line could not be turned into an edge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("missing destination node")]
    MissingDest,

    #[error("invalid weight '{0}'")]
    InvalidWeight(String),

    #[error("unexpected trailing field '{0}'")]
    TrailingField(String),
}

/// Parse one line of an edge list.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_edge_line(line: &str) -> Result<Option<Edge>, LineError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    // non-empty after trim, so there is always a first field
    let source = fields.next().unwrap_or_default();
    let dest = fields.next().ok_or(LineError::MissingDest)?;

    let edge = match fields.next() {
        None => Edge::new(source, dest),
        Some(raw) => {
            let weight: f64 = raw
                .parse()
                .map_err(|_| LineError::InvalidWeight(raw.to_string()))?;
            if !weight.is_finite() {
                return Err(LineError::InvalidWeight(raw.to_string()));
            }
            Edge::weighted(source, dest, weight)
        }
    };

    if let Some(extra) = fields.next() {
        return Err(LineError::TrailingField(extra.to_string()));
    }
    Ok(Some(edge))
}
