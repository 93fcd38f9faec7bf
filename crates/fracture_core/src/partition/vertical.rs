//! Column-wise splits with mandatory key duplication.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;

use super::{ColumnSplit, round_share};
use crate::relation::Relation;

/// Split `rel` into two column fragments.
///
/// Key columns land in both fragments. Of the non-key columns,
/// `opts.overlap_pct` percent are deep-copied into both, and the remainder
/// is distributed between the fragments with `opts.distribution_pct`
/// percent going to the first. Both fragments record the shared columns
/// (overlap plus keys) in `overlap_columns`; a row overlap count on `rel`
/// passes through unchanged.
pub fn split_columns<R: Rng>(
    rel: Relation,
    opts: &ColumnSplit,
    rng: &mut R,
) -> (Relation, Relation) {
    let key = rel.key.clone();

    let mut non_key: Vec<usize> = rel
        .columns
        .keys()
        .copied()
        .filter(|idx| !key.contains(idx))
        .collect();
    non_key.shuffle(rng);

    let overlap_count = round_share(non_key.len(), opts.overlap_pct);
    let to_first = round_share(non_key.len() - overlap_count, opts.distribution_pct);

    let overlap: BTreeSet<usize> = non_key[..overlap_count].iter().copied().collect();
    let first_only: BTreeSet<usize> = non_key[overlap_count..overlap_count + to_first]
        .iter()
        .copied()
        .collect();

    let shared: BTreeSet<usize> = overlap.union(&key).copied().collect();

    let mut first_columns = BTreeMap::new();
    let mut second_columns = BTreeMap::new();
    for (idx, col) in rel.columns {
        if shared.contains(&idx) {
            first_columns.insert(idx, col.clone());
            second_columns.insert(idx, col);
        } else if first_only.contains(&idx) {
            first_columns.insert(idx, col);
        } else {
            second_columns.insert(idx, col);
        }
    }

    let first = Relation {
        foreign_key: intersect(&rel.foreign_key, &first_columns),
        columns: first_columns,
        key: key.clone(),
        overlap_columns: Some(shared.clone()),
        overlap_rows: rel.overlap_rows,
        key_before_decompose: rel.key_before_decompose.clone(),
    };
    let second = Relation {
        foreign_key: intersect(&rel.foreign_key, &second_columns),
        columns: second_columns,
        key,
        overlap_columns: Some(shared),
        overlap_rows: rel.overlap_rows,
        key_before_decompose: rel.key_before_decompose,
    };

    (first, second)
}

fn intersect(
    set: &BTreeSet<usize>,
    columns: &BTreeMap<usize, crate::relation::Column>,
) -> BTreeSet<usize> {
    set.iter()
        .copied()
        .filter(|idx| columns.contains_key(idx))
        .collect()
}
