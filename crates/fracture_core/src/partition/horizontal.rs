//! Row-wise splits with block or scattered overlap.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{OverlapKind, RowSplit, round_share};
use crate::relation::{Column, Relation};

/// Split `rel` into two row fragments sharing `opts.overlap_pct` percent of
/// the rows.
///
/// In both fragments the shared rows come first (ascending original index),
/// followed by the fragment's own rows (ascending original index), so the
/// recorded overlap count always describes the leading rows.
pub fn split_rows<R: Rng>(rel: Relation, opts: &RowSplit, rng: &mut R) -> (Relation, Relation) {
    match opts.overlap {
        OverlapKind::Block => split_rows_block(rel, opts, rng),
        OverlapKind::Scattered => split_rows_scattered(rel, opts, rng),
    }
}

/// Block overlap: one contiguous window of rows at a uniformly random
/// offset is shared. The first fragment's own rows are taken preferentially
/// from immediately above the window, then from immediately below it.
pub fn split_rows_block<R: Rng>(
    rel: Relation,
    opts: &RowSplit,
    rng: &mut R,
) -> (Relation, Relation) {
    let total = rel.num_rows();
    let overlap = round_share(total, opts.overlap_pct);
    let start = rng.random_range(0..=(total - overlap));

    let window: Vec<usize> = (start..start + overlap).collect();
    let to_first = round_share(total - overlap, opts.distribution_pct);
    let above = to_first.min(start);
    let below = to_first - above;

    let first_own: Vec<usize> = (start - above..start)
        .chain(start + overlap..start + overlap + below)
        .collect();
    let second_own: Vec<usize> = (0..start - above)
        .chain(start + overlap + below..total)
        .collect();

    materialize_pair(rel, &window, &first_own, &second_own)
}

/// Scattered overlap: the shared rows are drawn by shuffling all row
/// indices, and the remaining rows are randomly distributed between the two
/// fragments.
pub fn split_rows_scattered<R: Rng>(
    rel: Relation,
    opts: &RowSplit,
    rng: &mut R,
) -> (Relation, Relation) {
    let total = rel.num_rows();
    let overlap = round_share(total, opts.overlap_pct);

    let mut indices: Vec<usize> = (0..total).collect();
    indices.shuffle(rng);

    let mut window = indices[..overlap].to_vec();
    window.sort_unstable();

    let rest = &indices[overlap..];
    let to_first = round_share(rest.len(), opts.distribution_pct);
    let mut first_own = rest[..to_first].to_vec();
    first_own.sort_unstable();
    let mut second_own = rest[to_first..].to_vec();
    second_own.sort_unstable();

    materialize_pair(rel, &window, &first_own, &second_own)
}

/// Build both fragments from row index sets. `window` rows lead in both
/// outputs.
fn materialize_pair(
    rel: Relation,
    window: &[usize],
    first_own: &[usize],
    second_own: &[usize],
) -> (Relation, Relation) {
    let mut first_columns = BTreeMap::new();
    let mut second_columns = BTreeMap::new();

    for (idx, col) in rel.columns {
        let mut first_values = pick_rows(&col.values, window);
        first_values.extend(pick_rows(&col.values, first_own));
        let mut second_values = pick_rows(&col.values, window);
        second_values.extend(pick_rows(&col.values, second_own));

        first_columns.insert(idx, Column::new(col.attr.clone(), first_values));
        second_columns.insert(idx, Column::new(col.attr, second_values));
    }

    let first = Relation {
        columns: first_columns,
        key: rel.key.clone(),
        foreign_key: rel.foreign_key.clone(),
        overlap_columns: rel.overlap_columns.clone(),
        overlap_rows: Some(window.len()),
        key_before_decompose: rel.key_before_decompose.clone(),
    };
    let second = Relation {
        columns: second_columns,
        key: rel.key,
        foreign_key: rel.foreign_key,
        overlap_columns: rel.overlap_columns,
        overlap_rows: Some(window.len()),
        key_before_decompose: rel.key_before_decompose,
    };

    (first, second)
}

fn pick_rows(values: &[String], rows: &[usize]) -> Vec<String> {
    rows.iter().map(|&row| values[row].clone()).collect()
}
