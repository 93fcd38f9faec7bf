//! Unique key discovery.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::errors::Result;
use crate::relation::Relation;

/// Finds a minimal unique column combination of a relation.
pub trait KeyDiscoverer {
    /// The smallest combination of columns whose value tuples are unique
    /// across all rows, or the empty set when none exists within the
    /// implementation's search bounds.
    fn discover(&self, rel: &Relation) -> Result<BTreeSet<usize>>;
}

/// Exhaustive search for a unique column combination.
///
/// Combination sizes are tried in ascending order, so the first hit is
/// minimal. Within one size, combinations are generated in ascending index
/// order, which keeps ties deterministic. The search stops at combinations
/// of `max_size` columns; relations needing a wider key report as having
/// none.
#[derive(Debug, Clone, Copy)]
pub struct UccDiscoverer {
    max_size: usize,
}

impl Default for UccDiscoverer {
    fn default() -> Self {
        UccDiscoverer { max_size: 3 }
    }
}

impl UccDiscoverer {
    pub fn with_max_size(max_size: usize) -> Self {
        UccDiscoverer { max_size }
    }
}

impl KeyDiscoverer for UccDiscoverer {
    fn discover(&self, rel: &Relation) -> Result<BTreeSet<usize>> {
        let indices = rel.column_indices();
        for size in 1..=self.max_size.min(indices.len()) {
            for combo in combinations(&indices, size) {
                if is_unique(rel, &combo) {
                    debug!(key = ?combo, "discovered unique key");
                    return Ok(combo.into_iter().collect());
                }
            }
        }
        debug!(max_size = self.max_size, "no unique key within bounds");
        Ok(BTreeSet::new())
    }
}

fn is_unique(rel: &Relation, combo: &[usize]) -> bool {
    let columns: Vec<&[String]> = combo
        .iter()
        .filter_map(|idx| rel.column(*idx).map(|col| col.values.as_slice()))
        .collect();
    if columns.len() != combo.len() {
        return false;
    }

    let num_rows = rel.num_rows();
    let mut seen: HashSet<Vec<&str>> = HashSet::with_capacity(num_rows);
    for row in 0..num_rows {
        let tuple: Vec<&str> = columns.iter().map(|values| values[row].as_str()).collect();
        if !seen.insert(tuple) {
            return false;
        }
    }
    true
}

/// All `size`-element combinations of `pool`, in ascending index order.
fn combinations(pool: &[usize], size: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(size);
    extend_combination(pool, size, 0, &mut current, &mut out);
    out
}

fn extend_combination(
    pool: &[usize],
    size: usize,
    start: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for i in start..pool.len() {
        if pool.len() - i < size - current.len() {
            break;
        }
        current.push(pool[i]);
        extend_combination(pool, size, i + 1, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{Attribute, Column, DataType};

    fn column(name: &str, values: &[&str]) -> Column {
        Column::new(
            Attribute::new(name, DataType::Utf8),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn single_column_key() {
        let rel = Relation::from_columns([
            (0, column("id", &["1", "2", "3"])),
            (1, column("city", &["berlin", "berlin", "paris"])),
        ]);
        let key = UccDiscoverer::default().discover(&rel).unwrap();
        assert_eq!(BTreeSet::from([0]), key);
    }

    #[test]
    fn two_column_key_when_no_single_column_is_unique() {
        let rel = Relation::from_columns([
            (0, column("first", &["ada", "ada", "alan"])),
            (1, column("last", &["lovelace", "byron", "lovelace"])),
        ]);
        let key = UccDiscoverer::default().discover(&rel).unwrap();
        assert_eq!(BTreeSet::from([0, 1]), key);
    }

    #[test]
    fn prefers_the_lowest_indices_on_ties() {
        // Both columns are unique on their own; the lower index wins.
        let rel = Relation::from_columns([
            (0, column("a", &["1", "2"])),
            (1, column("b", &["x", "y"])),
        ]);
        let key = UccDiscoverer::default().discover(&rel).unwrap();
        assert_eq!(BTreeSet::from([0]), key);
    }

    #[test]
    fn duplicate_rows_have_no_key() {
        let rel = Relation::from_columns([
            (0, column("a", &["1", "1"])),
            (1, column("b", &["x", "x"])),
        ]);
        let key = UccDiscoverer::default().discover(&rel).unwrap();
        assert!(key.is_empty());
    }

    #[test]
    fn search_stops_at_max_size() {
        // Unique only over all four columns: rows enumerate the four-bit
        // patterns.
        let mut bits: Vec<Vec<String>> = vec![Vec::new(); 4];
        for row in 0..16u32 {
            for (bit, values) in bits.iter_mut().enumerate() {
                values.push(((row >> bit) & 1).to_string());
            }
        }
        let rel = Relation::from_columns(bits.into_iter().enumerate().map(|(idx, values)| {
            (
                idx,
                Column::new(Attribute::new(format!("b{idx}"), DataType::Utf8), values),
            )
        }));

        assert!(
            UccDiscoverer::default()
                .discover(&rel)
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            BTreeSet::from([0, 1, 2, 3]),
            UccDiscoverer::with_max_size(4).discover(&rel).unwrap()
        );
    }
}
