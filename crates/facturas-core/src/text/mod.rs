//! Text dump handling.

mod splitter;

pub use splitter::{DocumentSegment, split_segments};
