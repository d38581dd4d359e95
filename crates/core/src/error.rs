//! Error types for splerge table-structure data preparation.

use thiserror::Error;

use crate::geometry::Axis;

/// Primary error type for target derivation and evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplergeError {
    #[error("degenerate interval [{start}, {end}): length must be positive")]
    DegenerateInterval { start: usize, end: usize },

    #[error(
        "table {table_id}: no {side} cells adjacent to {axis} boundary {boundary}, \
         even after double split point fallback"
    )]
    InconsistentGridAnnotation {
        table_id: i64,
        axis: Axis,
        boundary: i32,
        side: &'static str,
    },

    #[error("grid has no usable {axis} boundaries")]
    EmptyGrid { axis: Axis },

    #[error("invalid metric state: {0}")]
    InvalidMetricState(String),

    #[error("mask shape mismatch: expected {expected}, got {got}")]
    MaskShapeMismatch { expected: usize, got: usize },

    #[error("invalid annotation: {0}")]
    InvalidAnnotation(String),
}

/// Convenience Result type alias for SplergeError.
pub type Result<T> = std::result::Result<T, SplergeError>;
