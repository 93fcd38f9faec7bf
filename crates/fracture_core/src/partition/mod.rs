//! Splitting a relation into overlapping fragments.

pub mod horizontal;
pub mod vertical;

use rand::Rng;

use crate::relation::Relation;

/// Which way the source relation is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    Horizontal,
    Vertical,
    /// Horizontal first, then each half is split vertically, yielding four
    /// fragments.
    HorizontalVertical,
}

/// How the overlapping rows of a horizontal split are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapKind {
    /// One contiguous window of rows at a random offset.
    #[default]
    Block,
    /// Row indices drawn by shuffling all indices.
    Scattered,
}

/// Controls for a horizontal split.
#[derive(Debug, Clone, Copy)]
pub struct RowSplit {
    /// Percentage of rows duplicated into both fragments.
    pub overlap_pct: f64,
    /// Percentage of the non-overlapping rows assigned to the first
    /// fragment.
    pub distribution_pct: f64,
    pub overlap: OverlapKind,
}

/// Controls for a vertical split.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSplit {
    /// Percentage of non-key columns duplicated into both fragments.
    pub overlap_pct: f64,
    /// Percentage of the non-overlapping columns assigned to the first
    /// fragment.
    pub distribution_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    pub kind: SplitKind,
    pub rows: RowSplit,
    pub columns: ColumnSplit,
}

/// Split `rel` according to `opts`.
///
/// Percentages must already be validated to lie in `[0, 100]`; within that
/// range splitting cannot fail.
pub fn split<R: Rng>(rel: Relation, opts: &SplitOptions, rng: &mut R) -> Vec<Relation> {
    match opts.kind {
        SplitKind::Horizontal => {
            let (top, bottom) = horizontal::split_rows(rel, &opts.rows, rng);
            vec![top, bottom]
        }
        SplitKind::Vertical => {
            let (left, right) = vertical::split_columns(rel, &opts.columns, rng);
            vec![left, right]
        }
        SplitKind::HorizontalVertical => {
            let (top, bottom) = horizontal::split_rows(rel, &opts.rows, rng);
            let (top_left, top_right) = vertical::split_columns(top, &opts.columns, rng);
            let (bottom_left, bottom_right) = vertical::split_columns(bottom, &opts.columns, rng);
            vec![top_left, top_right, bottom_left, bottom_right]
        }
    }
}

/// `round(total * pct / 100)` with half-up rounding, the share arithmetic
/// used by every percentage control.
pub(crate) fn round_share(total: usize, pct: f64) -> usize {
    ((total as f64) * pct / 100.0).round() as usize
}
