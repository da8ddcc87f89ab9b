//! Rank sketch core: hash family, rank generator, cell matrix and engine

mod cell;
mod engine;
mod hash;
mod matrix;
mod rank;

#[cfg(test)]
mod tests;

pub use cell::{Cell, CellOutcome, CellSnapshot};
pub use engine::{SketchConfig, SketchEngine, SketchError, SketchResult, UpdateStats};
pub use hash::{HashFamily, XxHashFamily};
pub use matrix::SketchMatrix;
pub use rank::{RankGenerator, ShuffleRankGenerator};
