//! Schema decomposition along functional dependencies.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::errors::{FractureError, Result};
use crate::partition::round_share;
use crate::relation::Relation;

/// One sub-relation proposed by a [`Decomposer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompositionPiece {
    pub columns: BTreeSet<usize>,
    pub key: BTreeSet<usize>,
    pub foreign_key: BTreeSet<usize>,
}

/// Proposes a decomposition of a relation into sub-relations.
pub trait Decomposer {
    /// An ordered list of sub-relations covering all columns of `rel`.
    ///
    /// `degree_pct` selects how much of the found decomposition to apply:
    /// 0 keeps the relation whole (a single piece), 100 applies every
    /// extraction step.
    fn decompose(&self, rel: &Relation, degree_pct: f64) -> Result<Vec<DecompositionPiece>>;
}

/// Decomposition along single-column functional dependencies.
///
/// Non-key columns are scanned in ascending index order. A column `a` that
/// functionally determines at least one other remaining non-key column is
/// extracted together with its dependents into a piece keyed by `a`, and
/// `a` stays behind in the remainder as a foreign key. Columns already
/// extracted are not considered again, so each column belongs to exactly
/// one piece.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdDecomposer;

impl Decomposer for FdDecomposer {
    fn decompose(&self, rel: &Relation, degree_pct: f64) -> Result<Vec<DecompositionPiece>> {
        let steps = extraction_steps(rel);
        let keep = round_share(steps.len(), degree_pct);
        debug!(found = steps.len(), keep, "functional dependency steps");

        let mut pieces = Vec::with_capacity(keep + 1);
        let mut extracted: BTreeSet<usize> = BTreeSet::new();
        let mut determinants: BTreeSet<usize> = BTreeSet::new();
        for (determinant, dependents) in steps.into_iter().take(keep) {
            extracted.extend(&dependents);
            determinants.insert(determinant);

            let mut columns = dependents;
            columns.insert(determinant);
            pieces.push(DecompositionPiece {
                columns,
                key: BTreeSet::from([determinant]),
                foreign_key: BTreeSet::new(),
            });
        }

        // The remainder keeps everything not pulled out above, with the
        // original key and the determinants as foreign keys.
        let columns: BTreeSet<usize> = rel
            .column_indices()
            .into_iter()
            .filter(|idx| !extracted.contains(idx))
            .collect();
        let mut foreign_key: BTreeSet<usize> = rel
            .foreign_key
            .iter()
            .copied()
            .filter(|idx| columns.contains(idx))
            .collect();
        foreign_key.extend(&determinants);
        pieces.push(DecompositionPiece {
            columns,
            key: rel.key.clone(),
            foreign_key,
        });

        Ok(pieces)
    }
}

/// Extraction steps in determinant order: `(determinant, dependents)`.
///
/// Rechecking after each extraction is unnecessary: removing columns can
/// only shrink the dependent sets of later determinants, never create new
/// dependencies.
fn extraction_steps(rel: &Relation) -> Vec<(usize, BTreeSet<usize>)> {
    let mut available: Vec<usize> = rel
        .column_indices()
        .into_iter()
        .filter(|idx| !rel.key.contains(idx))
        .collect();
    let mut steps = Vec::new();

    let mut i = 0;
    while i < available.len() {
        let determinant = available[i];
        let dependents: BTreeSet<usize> = available
            .iter()
            .copied()
            .filter(|&other| other != determinant && determines(rel, determinant, other))
            .collect();
        if dependents.is_empty() {
            i += 1;
            continue;
        }
        available.retain(|idx| *idx != determinant && !dependents.contains(idx));
        steps.push((determinant, dependents));
        // The retain shifted the next candidate down to position `i`.
    }
    steps
}

/// Whether every distinct value of column `a` maps to a single value of
/// column `b`.
fn determines(rel: &Relation, a: usize, b: usize) -> bool {
    let (Some(col_a), Some(col_b)) = (rel.column(a), rel.column(b)) else {
        return false;
    };
    let mut mapping: HashMap<&str, &str> = HashMap::new();
    for (va, vb) in col_a.values.iter().zip(&col_b.values) {
        match mapping.insert(va.as_str(), vb.as_str()) {
            Some(prev) if prev != vb => return false,
            _ => {}
        }
    }
    true
}

/// Materialize decomposition pieces as sub-relations.
///
/// Columns appearing in more than one piece are copied; columns unique to
/// one piece move out of `rel` without cloning. Every sub-relation inherits
/// the row overlap count unchanged, intersects the column overlap with its
/// own columns, and records the parent key so later noise stages keep
/// treating those columns as keys.
pub fn apply_decomposition(rel: Relation, pieces: &[DecompositionPiece]) -> Result<Vec<Relation>> {
    let mut uses: BTreeMap<usize, usize> = BTreeMap::new();
    for piece in pieces {
        for idx in &piece.columns {
            *uses.entry(*idx).or_insert(0) += 1;
        }
    }

    let parent_key = rel.key;
    let overlap_columns = rel.overlap_columns;
    let overlap_rows = rel.overlap_rows;
    let mut columns = rel.columns;

    let mut outputs = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let mut piece_columns = BTreeMap::new();
        for &idx in &piece.columns {
            let remaining = uses
                .get_mut(&idx)
                .ok_or(FractureError::UnknownColumn(idx))?;
            *remaining -= 1;
            let col = if *remaining == 0 {
                columns.remove(&idx)
            } else {
                columns.get(&idx).cloned()
            };
            piece_columns.insert(idx, col.ok_or(FractureError::UnknownColumn(idx))?);
        }

        outputs.push(Relation {
            columns: piece_columns,
            key: piece.key.clone(),
            foreign_key: piece.foreign_key.clone(),
            overlap_columns: overlap_columns.as_ref().map(|overlap| {
                overlap
                    .iter()
                    .copied()
                    .filter(|idx| piece.columns.contains(idx))
                    .collect()
            }),
            overlap_rows,
            key_before_decompose: parent_key.clone(),
        });
    }
    Ok(outputs)
}
