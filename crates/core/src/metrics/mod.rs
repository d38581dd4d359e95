//! Evaluation metrics for split-point predictions.

mod intervalwise;
mod matching;

pub use intervalwise::{
    DEFAULT_MIN_OVERLAP, IntervalCounts, IntervalMatchSettings, IntervalwiseFMeasure, Scores,
    maximum_matching_size,
};
pub use matching::BipartiteGraph;
