//! Interval-wise F-measure over 1-D split-point masks.
//!
//! Each mask row is reduced to its runs of ones. Markup and predicted runs
//! are matched one-to-one, a pair being eligible when their overlap exceeds
//! `min_overlap` of the shorter run. Precision and recall are taken over the
//! size of a maximum matching, accumulated across every sample seen since
//! the last reset.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rayon::prelude::*;
use tracing::debug;

use super::matching::BipartiteGraph;
use crate::error::{Result, SplergeError};
use crate::geometry::{Bit, Interval, extract_intervals_of_ones};

pub const DEFAULT_MIN_OVERLAP: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalMatchSettings {
    /// Overlap relative to the shorter interval that a pair must exceed.
    pub min_overlap: f64,
}

impl Default for IntervalMatchSettings {
    fn default() -> Self {
        Self {
            min_overlap: DEFAULT_MIN_OVERLAP,
        }
    }
}

/// Size of a maximum matching between two interval sets.
pub fn maximum_matching_size(
    markup: &[Interval],
    predicted: &[Interval],
    settings: &IntervalMatchSettings,
) -> Result<usize> {
    let mut graph = BipartiteGraph::new(markup.len(), predicted.len());
    for (i, m) in markup.iter().enumerate() {
        for (j, p) in predicted.iter().enumerate() {
            if m.overlap_fraction(p)? > settings.min_overlap {
                graph.add_edge(i, j);
            }
        }
    }
    Ok(graph.maximum_matching_size())
}

/// Accumulated interval counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntervalCounts {
    pub markup: u64,
    pub predicted: u64,
    pub matched: u64,
}

impl IntervalCounts {
    fn of_sample(
        markup: &[Interval],
        predicted: &[Interval],
        settings: &IntervalMatchSettings,
    ) -> Result<Self> {
        let matched = maximum_matching_size(markup, predicted, settings)?;
        Ok(Self {
            markup: markup.len() as u64,
            predicted: predicted.len() as u64,
            matched: matched as u64,
        })
    }
}

impl Add for IntervalCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            markup: self.markup + rhs.markup,
            predicted: self.predicted + rhs.predicted,
            matched: self.matched + rhs.matched,
        }
    }
}

impl AddAssign for IntervalCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for IntervalCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Stateful interval-wise F-measure.
///
/// Independent instances (one per worker) can be combined with
/// [`IntervalwiseFMeasure::merge`]; the counters are plain sums.
#[derive(Clone, Debug, Default)]
pub struct IntervalwiseFMeasure {
    settings: IntervalMatchSettings,
    counts: IntervalCounts,
}

impl IntervalwiseFMeasure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: IntervalMatchSettings) -> Self {
        Self {
            settings,
            counts: IntervalCounts::default(),
        }
    }

    /// Restore a metric from previously accumulated counters.
    pub fn from_counts(settings: IntervalMatchSettings, counts: IntervalCounts) -> Self {
        Self { settings, counts }
    }

    pub fn settings(&self) -> &IntervalMatchSettings {
        &self.settings
    }

    pub fn counts(&self) -> IntervalCounts {
        self.counts
    }

    /// Accumulate a batch of paired mask rows.
    ///
    /// Both batches must have the same number of rows and paired rows the
    /// same length; otherwise nothing is accumulated.
    pub fn update<M, P, A, B>(&mut self, markup: &[M], predicted: &[P]) -> Result<()>
    where
        M: AsRef<[A]> + Sync,
        P: AsRef<[B]> + Sync,
        A: Bit + Sync,
        B: Bit + Sync,
    {
        if markup.len() != predicted.len() {
            return Err(SplergeError::MaskShapeMismatch {
                expected: markup.len(),
                got: predicted.len(),
            });
        }
        for (m, p) in markup.iter().zip(predicted) {
            let (m, p) = (m.as_ref(), p.as_ref());
            if m.len() != p.len() {
                return Err(SplergeError::MaskShapeMismatch {
                    expected: m.len(),
                    got: p.len(),
                });
            }
        }

        let settings = self.settings;
        let samples: Vec<Result<IntervalCounts>> = markup
            .par_iter()
            .zip(predicted.par_iter())
            .map(|(m, p)| {
                let m: Vec<Interval> = extract_intervals_of_ones(m.as_ref()).collect();
                let p: Vec<Interval> = extract_intervals_of_ones(p.as_ref()).collect();
                IntervalCounts::of_sample(&m, &p, &settings)
            })
            .collect();
        self.accumulate(samples)
    }

    /// Accumulate samples given directly as interval sets.
    ///
    /// A sample containing a degenerate interval is skipped; the remaining
    /// samples are still counted and the first failure is returned.
    pub fn update_intervals(&mut self, samples: &[(Vec<Interval>, Vec<Interval>)]) -> Result<()> {
        let settings = self.settings;
        let samples: Vec<Result<IntervalCounts>> = samples
            .par_iter()
            .map(|(m, p)| IntervalCounts::of_sample(m, p, &settings))
            .collect();
        self.accumulate(samples)
    }

    fn accumulate(&mut self, samples: Vec<Result<IntervalCounts>>) -> Result<()> {
        let total = samples.len();
        let mut first_err = None;
        for sample in samples {
            match sample {
                Ok(counts) => self.counts += counts,
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        debug!(samples = total, counts = ?self.counts, "interval-wise f-measure update");
        first_err.map_or(Ok(()), Err)
    }

    /// Add the counters of another accumulator.
    pub fn merge(&mut self, other: &IntervalwiseFMeasure) {
        self.counts += other.counts;
    }

    pub fn reset(&mut self) {
        self.counts = IntervalCounts::default();
    }

    pub fn scores(&self) -> Result<Scores> {
        let IntervalCounts {
            markup,
            predicted,
            matched,
        } = self.counts;
        if matched == 0 {
            return Ok(Scores::default());
        }
        if markup == 0 || predicted == 0 {
            return Err(SplergeError::InvalidMetricState(format!(
                "{matched} matches with {markup} markup and {predicted} predicted intervals"
            )));
        }
        if matched > markup.min(predicted) {
            return Err(SplergeError::InvalidMetricState(format!(
                "{matched} matches exceed interval counts ({markup} markup, {predicted} predicted)"
            )));
        }
        let recall = matched as f64 / markup as f64;
        let precision = matched as f64 / predicted as f64;
        Ok(Scores {
            precision,
            recall,
            f1: 2.0 * recall * precision / (recall + precision),
        })
    }

    /// F1 over everything accumulated so far.
    pub fn result(&self) -> Result<f64> {
        Ok(self.scores()?.f1)
    }
}
