//! splerge - training targets and evaluation for split/merge table structure
//! recognition.
//!
//! Hand-annotated tables (cell boxes plus row/column spans) become per-pixel
//! split-point masks for the split model. Binary split-point predictions are
//! turned back into a grid, and the merge masks tell the merge model which
//! grid cells form one spanning cell. Split predictions are scored with an
//! interval-wise F-measure.

pub mod annotation;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod table;

pub use error::{Result, SplergeError};
pub use geometry::{Axis, Interval, Rect, extract_intervals_of_ones};
pub use metrics::{IntervalMatchSettings, IntervalwiseFMeasure};
pub use table::{Cell, Grid, MergeMasks, Table};
