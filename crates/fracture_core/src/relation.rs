//! In-memory representation of a single tabular relation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::{FractureError, Result, internal};

/// Declared type of a column.
///
/// Cell values are always carried as strings; the datatype records how the
/// value noise stage should treat them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    Utf8,
    Float64,
}

impl DataType {
    pub const fn is_numeric(&self) -> bool {
        matches!(self, DataType::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataType::Utf8 => write!(f, "Utf8"),
            DataType::Float64 => write!(f, "Float64"),
        }
    }
}

/// A named (or anonymous) column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Option<String>,
    pub datatype: DataType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Attribute {
            name: Some(name.into()),
            datatype,
        }
    }

    pub fn unnamed(datatype: DataType) -> Self {
        Attribute {
            name: None,
            datatype,
        }
    }
}

/// A column header plus its cell values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub attr: Attribute,
    pub values: Vec<String>,
}

impl Column {
    pub fn new(attr: Attribute, values: Vec<String>) -> Self {
        Column { attr, values }
    }
}

/// A relation flowing through the pipeline.
///
/// Columns are keyed by stable indices assigned at ingestion. No
/// transformation renumbers them; splits and decompositions carry subsets of
/// the original indices, and merging two columns keeps the surviving index
/// only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    pub columns: BTreeMap<usize, Column>,
    /// Minimal unique key of this fragment.
    pub key: BTreeSet<usize>,
    /// Declared foreign key columns, if any.
    pub foreign_key: BTreeSet<usize>,
    /// Columns shared with a sibling fragment after a vertical split.
    /// Includes the key columns.
    pub overlap_columns: Option<BTreeSet<usize>>,
    /// Number of leading rows shared with a sibling fragment after a
    /// horizontal split.
    pub overlap_rows: Option<usize>,
    /// Key columns of the relation before decomposition split it apart.
    /// Noise stages treat these as keys even when `key` has moved on.
    pub key_before_decompose: BTreeSet<usize>,
}

impl Relation {
    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (usize, Column)>,
    {
        Relation {
            columns: columns.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Row count, taken from the first column. All columns hold the same
    /// number of values.
    pub fn num_rows(&self) -> usize {
        self.columns
            .values()
            .next()
            .map(|col| col.values.len())
            .unwrap_or(0)
    }

    /// Column indices in ascending order.
    pub fn column_indices(&self) -> Vec<usize> {
        self.columns.keys().copied().collect()
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(&idx)
    }

    pub fn column_mut(&mut self, idx: usize) -> Option<&mut Column> {
        self.columns.get_mut(&idx)
    }

    /// Columns that act as a key for noise-eligibility purposes, which is
    /// the union of the current key, the declared foreign key, and the key
    /// the relation had before decomposition.
    pub fn key_like_columns(&self) -> BTreeSet<usize> {
        self.key
            .iter()
            .chain(self.foreign_key.iter())
            .chain(self.key_before_decompose.iter())
            .copied()
            .collect()
    }

    /// Merge the column at `absorbed` into the column at `survivor`.
    ///
    /// Cell values are joined pairwise with a single space, the merged
    /// column is typed [`DataType::Utf8`], and `absorbed` disappears from
    /// the relation. Key and overlap memberships of `absorbed` transfer to
    /// `survivor`.
    pub fn merge_columns(&mut self, survivor: usize, absorbed: usize) -> Result<()> {
        if survivor == absorbed {
            return Err(internal!("cannot merge column {survivor} into itself"));
        }
        if !self.columns.contains_key(&survivor) {
            return Err(FractureError::UnknownColumn(survivor));
        }
        let absorbed_col = self
            .columns
            .remove(&absorbed)
            .ok_or(FractureError::UnknownColumn(absorbed))?;

        let col = self
            .columns
            .get_mut(&survivor)
            .ok_or(FractureError::UnknownColumn(survivor))?;

        for (value, other) in col.values.iter_mut().zip(absorbed_col.values) {
            value.push(' ');
            value.push_str(&other);
        }
        col.attr.datatype = DataType::Utf8;
        col.attr.name = match (col.attr.name.take(), absorbed_col.attr.name) {
            (Some(a), Some(b)) => Some(format!("{a}_{b}")),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };

        for set in [
            &mut self.key,
            &mut self.foreign_key,
            &mut self.key_before_decompose,
        ] {
            if set.remove(&absorbed) {
                set.insert(survivor);
            }
        }
        if let Some(overlap) = self.overlap_columns.as_mut() {
            if overlap.remove(&absorbed) {
                overlap.insert(survivor);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_column(name: &str, values: &[&str]) -> Column {
        Column::new(
            Attribute::new(name, DataType::Utf8),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn num_rows_from_first_column() {
        let rel = Relation::from_columns([
            (0, string_column("a", &["1", "2", "3"])),
            (2, string_column("b", &["x", "y", "z"])),
        ]);
        assert_eq!(3, rel.num_rows());
        assert_eq!(2, rel.num_columns());
        assert_eq!(vec![0, 2], rel.column_indices());
    }

    #[test]
    fn num_rows_empty_relation() {
        let rel = Relation::default();
        assert_eq!(0, rel.num_rows());
    }

    #[test]
    fn merge_joins_values_and_names() {
        let mut rel = Relation::from_columns([
            (0, string_column("first", &["ada", "alan"])),
            (1, string_column("last", &["lovelace", "turing"])),
        ]);
        rel.merge_columns(0, 1).unwrap();

        assert_eq!(1, rel.num_columns());
        let col = rel.column(0).unwrap();
        assert_eq!(Some("first_last"), col.attr.name.as_deref());
        assert_eq!(DataType::Utf8, col.attr.datatype);
        assert_eq!(vec!["ada lovelace", "alan turing"], col.values);
    }

    #[test]
    fn merge_transfers_key_membership() {
        let mut rel = Relation::from_columns([
            (0, string_column("id", &["1"])),
            (3, string_column("code", &["a"])),
        ]);
        rel.key = BTreeSet::from([3]);
        rel.overlap_columns = Some(BTreeSet::from([3]));

        rel.merge_columns(0, 3).unwrap();
        assert!(rel.key.contains(&0));
        assert!(!rel.key.contains(&3));
        assert!(rel.overlap_columns.as_ref().unwrap().contains(&0));
    }

    #[test]
    fn merge_missing_column_errors() {
        let mut rel = Relation::from_columns([(0, string_column("a", &["1"]))]);
        assert!(rel.merge_columns(0, 7).is_err());
        assert!(rel.merge_columns(0, 0).is_err());
        // Failed merges leave the relation untouched.
        assert_eq!(1, rel.num_columns());
    }

    #[test]
    fn merge_forces_utf8() {
        let mut rel = Relation::from_columns([
            (
                0,
                Column::new(
                    Attribute::new("a", DataType::Float64),
                    vec!["1.5".to_string()],
                ),
            ),
            (
                1,
                Column::new(
                    Attribute::new("b", DataType::Float64),
                    vec!["2.5".to_string()],
                ),
            ),
        ]);
        rel.merge_columns(0, 1).unwrap();
        assert_eq!(DataType::Utf8, rel.column(0).unwrap().attr.datatype);
        assert_eq!(vec!["1.5 2.5"], rel.column(0).unwrap().values);
    }
}
