//! Training targets for the split and merge models.
//!
//! A dataset pass feeds every annotated table through a [`TargetBuilder`].
//! Tables from denylisted documents are dropped up front and tables whose
//! annotation does not admit a consistent grid are skipped with a warning,
//! so one bad annotation never aborts the pass.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Result, SplergeError};
use crate::geometry::Bit;
use crate::table::{BoolMatrix, Grid, MergeMasks, Table};

/// Source documents whose ground truth is known to be broken.
pub const DEFAULT_IGNORED_DOCUMENTS: &[&str] = &[
    "eu-015",  // cells lie outside page rect
    "us-035a", // 2nd table has invalid cell coords
];

/// Denylist of source document stems.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableFilter {
    pub ignored_documents: Vec<String>,
}

impl Default for TableFilter {
    fn default() -> Self {
        Self {
            ignored_documents: DEFAULT_IGNORED_DOCUMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl TableFilter {
    /// A filter that lets every document through.
    pub fn allow_all() -> Self {
        Self {
            ignored_documents: Vec::new(),
        }
    }

    pub fn is_ignored(&self, document: &str) -> bool {
        self.ignored_documents.iter().any(|d| d == document)
    }
}

/// A markup table together with the document it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedTable {
    pub document: String,
    pub table: Table,
}

impl AnnotatedTable {
    /// Example key, `{document}-{table id}`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.document, self.table.id)
    }
}

/// Ground-truth masks for training the split model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitTargets {
    pub horz_split_points_mask: Vec<bool>,
    pub vert_split_points_mask: Vec<bool>,
}

impl SplitTargets {
    pub fn from_table(table: &Table) -> Result<Self> {
        Ok(Self {
            horz_split_points_mask: table.horz_split_points_mask()?,
            vert_split_points_mask: table.vert_split_points_mask()?,
        })
    }
}

/// Thresholded split model output for one table image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitPrediction {
    pub horz_split_points_binary: Vec<i32>,
    pub vert_split_points_binary: Vec<i32>,
}

/// Grid and merge masks for training the merge model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeTargets {
    pub grid: Grid,
    pub merge_right_mask: BoolMatrix,
    pub merge_down_mask: BoolMatrix,
}

impl MergeTargets {
    /// Rebuild the grid the split model predicted and derive which of its
    /// cells the annotation says must be merged.
    pub fn from_split_outputs<B: Bit>(
        table: &Table,
        horz_binary: &[B],
        vert_binary: &[B],
    ) -> Result<Self> {
        let grid = Grid::from_rect_and_masks(&table.rect, horz_binary, vert_binary)?;
        let MergeMasks {
            merge_right,
            merge_down,
        } = table.create_merge_masks(&grid)?;
        Ok(Self {
            grid,
            merge_right_mask: merge_right,
            merge_down_mask: merge_down,
        })
    }
}

/// Builds training targets over a whole dataset pass.
#[derive(Clone, Debug, Default)]
pub struct TargetBuilder {
    filter: TableFilter,
}

impl TargetBuilder {
    pub fn new(filter: TableFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &TableFilter {
        &self.filter
    }

    fn keep(&self, table: &AnnotatedTable) -> bool {
        if self.filter.is_ignored(&table.document) {
            debug!(document = %table.document, table = table.table.id, "ignored document");
            return false;
        }
        true
    }

    /// Split targets keyed by example key, in input order.
    pub fn split_targets(&self, tables: &[AnnotatedTable]) -> Result<Vec<(String, SplitTargets)>> {
        let built: Vec<Option<(String, SplitTargets)>> = tables
            .par_iter()
            .filter(|t| self.keep(t))
            .map(|t| skip_inconsistent(t, SplitTargets::from_table(&t.table)))
            .collect::<Result<_>>()?;
        Ok(built.into_iter().flatten().collect())
    }

    /// Merge targets keyed by example key, in input order.
    ///
    /// Split predictions whose lengths do not match their table fail the
    /// whole pass.
    pub fn merge_targets(
        &self,
        tables: &[(AnnotatedTable, SplitPrediction)],
    ) -> Result<Vec<(String, MergeTargets)>> {
        let built: Vec<Option<(String, MergeTargets)>> = tables
            .par_iter()
            .filter(|(t, _)| self.keep(t))
            .map(|(t, prediction)| {
                let targets = MergeTargets::from_split_outputs(
                    &t.table,
                    &prediction.horz_split_points_binary,
                    &prediction.vert_split_points_binary,
                );
                skip_inconsistent(t, targets)
            })
            .collect::<Result<_>>()?;
        Ok(built.into_iter().flatten().collect())
    }
}

/// Data-quality failures drop the table; anything else is the caller's bug.
fn skip_inconsistent<T>(table: &AnnotatedTable, targets: Result<T>) -> Result<Option<(String, T)>> {
    use SplergeError::{EmptyGrid, InconsistentGridAnnotation};

    match targets {
        Ok(targets) => Ok(Some((table.key(), targets))),
        Err(err @ (InconsistentGridAnnotation { .. } | EmptyGrid { .. })) => {
            warn!(key = %table.key(), error = %err, "skipping table");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
