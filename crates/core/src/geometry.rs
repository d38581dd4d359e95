//! Geometry primitives: pixel rectangles, 1-D intervals and run extraction.

use std::fmt;
use std::iter::FusedIterator;

use crate::error::{Result, SplergeError};

/// Direction of a split-point signal.
///
/// `Horizontal` split points are horizontal lines separating rows, so their
/// mask runs along the table height. `Vertical` split points separate columns
/// and run along the width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// Axis-aligned rectangle with integer coordinates, top-left origin.
///
/// Used for pixel boxes and, with half-open semantics, for grid spans
/// (`left..right` columns, `top..bottom` rows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Lower edge along the given split axis (`top` for horizontal splits).
    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.top,
            Axis::Vertical => self.left,
        }
    }

    /// Upper edge along the given split axis (`bottom` for horizontal splits).
    pub fn end(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.bottom,
            Axis::Vertical => self.right,
        }
    }

    /// Extent along the given split axis.
    pub fn extent(&self, axis: Axis) -> i32 {
        self.end(axis) - self.start(axis)
    }

    /// Half-open containment: left/top edges inclusive, right/bottom exclusive.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }

    /// Integer center, rounded towards the top-left.
    pub fn center(&self) -> (i32, i32) {
        (self.left + self.width() / 2, self.top + self.height() / 2)
    }
}

/// Half-open 1-D interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the interval; zero for empty or inverted intervals.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the interval, failing when it is not positive.
    pub fn checked_len(&self) -> Result<usize> {
        match self.len() {
            0 => Err(SplergeError::DegenerateInterval {
                start: self.start,
                end: self.end,
            }),
            len => Ok(len),
        }
    }

    /// `max(0, min(end) - max(start))`.
    pub fn intersection_len(&self, other: &Interval) -> usize {
        self.end
            .min(other.end)
            .saturating_sub(self.start.max(other.start))
    }

    /// Intersection length relative to the shorter of the two intervals.
    pub fn overlap_fraction(&self, other: &Interval) -> Result<f64> {
        let shorter = self.checked_len()?.min(other.checked_len()?);
        Ok(self.intersection_len(other) as f64 / shorter as f64)
    }
}

/// A value of a per-pixel indicator sequence.
///
/// Ground-truth masks are `bool`; thresholded model outputs usually arrive as
/// integers where any non-zero value counts as set.
pub trait Bit: Copy {
    fn is_set(self) -> bool;
}

impl Bit for bool {
    #[inline]
    fn is_set(self) -> bool {
        self
    }
}

macro_rules! impl_bit_for_int {
    ($($t:ty),*) => {
        $(
            impl Bit for $t {
                #[inline]
                fn is_set(self) -> bool {
                    self != 0
                }
            }
        )*
    };
}

impl_bit_for_int!(u8, i32, u32, i64);

/// Iterator over the maximal runs of set values in an indicator sequence.
///
/// Clones are independent: a clone taken before iteration replays the same
/// runs from the start.
#[derive(Clone, Debug)]
pub struct IntervalsOfOnes<'a, B> {
    bits: &'a [B],
    pos: usize,
}

impl<B: Bit> Iterator for IntervalsOfOnes<'_, B> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        let start = self.pos + self.bits[self.pos..].iter().position(|b| b.is_set())?;
        let end = self.bits[start..]
            .iter()
            .position(|b| !b.is_set())
            .map_or(self.bits.len(), |offset| start + offset);
        self.pos = end;
        Some(Interval::new(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits.len() - self.pos;
        (0, Some(remaining.div_ceil(2)))
    }
}

impl<B: Bit> FusedIterator for IntervalsOfOnes<'_, B> {}

/// Scan `bits` and yield each maximal run of set values as `[start, end)`,
/// in ascending order.
pub fn extract_intervals_of_ones<B: Bit>(bits: &[B]) -> IntervalsOfOnes<'_, B> {
    IntervalsOfOnes { bits, pos: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_of_ones_empty_and_all_false() {
        assert_eq!(extract_intervals_of_ones::<bool>(&[]).count(), 0);
        assert_eq!(extract_intervals_of_ones(&[false; 7]).count(), 0);
        assert_eq!(extract_intervals_of_ones(&[0i32; 7]).count(), 0);
    }

    #[test]
    fn intervals_of_ones_all_true() {
        let runs: Vec<_> = extract_intervals_of_ones(&[true; 5]).collect();
        assert_eq!(runs, vec![Interval::new(0, 5)]);
    }

    #[test]
    fn intervals_of_ones_mixed_runs() {
        let bits = [1u8, 1, 0, 0, 1, 0, 1, 1, 1];
        let runs: Vec<_> = extract_intervals_of_ones(&bits).collect();
        assert_eq!(
            runs,
            vec![
                Interval::new(0, 2),
                Interval::new(4, 5),
                Interval::new(6, 9)
            ]
        );
    }

    #[test]
    fn intervals_of_ones_is_restartable() {
        let bits = [false, true, true, false, true];
        let iter = extract_intervals_of_ones(&bits);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn interval_intersection() {
        let a = Interval::new(0, 10);
        assert_eq!(a.intersection_len(&Interval::new(5, 20)), 5);
        assert_eq!(a.intersection_len(&Interval::new(10, 20)), 0);
        assert_eq!(a.intersection_len(&Interval::new(15, 20)), 0);
        assert_eq!(Interval::new(15, 20).intersection_len(&a), 0);
    }

    #[test]
    fn interval_overlap_fraction_uses_shorter() {
        let a = Interval::new(0, 10);
        let b = Interval::new(0, 4);
        assert_eq!(a.overlap_fraction(&b), Ok(1.0));
        assert_eq!(
            a.overlap_fraction(&Interval::new(3, 3)),
            Err(SplergeError::DegenerateInterval { start: 3, end: 3 })
        );
    }

    #[test]
    fn rect_center_and_contains() {
        let rect = Rect::new(2, 1, 19, 12);
        assert_eq!(rect.width(), 17);
        assert_eq!(rect.height(), 11);
        assert_eq!(rect.center(), (10, 6));
        assert!(rect.contains(2, 1));
        assert!(!rect.contains(19, 5));
        assert_eq!(rect.extent(Axis::Horizontal), 11);
        assert_eq!(rect.extent(Axis::Vertical), 17);
    }
}
