//! Cell value corruption.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, warn};

use crate::errors::{FractureError, Result};
use crate::noise::numeric::{ColumnStats, replace_numeric};
use crate::noise::{MethodLibrary, NumericMethod, StringMethod};
use crate::partition::round_share;
use crate::relation::Relation;

/// Controls for value noise.
#[derive(Debug, Clone)]
pub struct ValueNoiseOptions {
    /// Percentage of candidate columns (or overlap rows) that receive
    /// noise.
    pub noise_pct: f64,
    /// Percentage of entries mutated inside each chosen column or row.
    pub inside_pct: f64,
    /// Whether key-like columns may be touched.
    pub keys_eligible: bool,
    pub string_methods: Vec<StringMethod>,
    pub numeric_methods: Vec<NumericMethod>,
}

/// Rewrites cell values in the overlapping parts of a fragment.
///
/// The provenance markers left by the partitioner decide the shape of the
/// pass: vertical overlap gets column-wise noise, horizontal overlap gets
/// row-wise noise over the shared leading rows, and a fragment carrying
/// both markers gets the column pass first with the row pass skipping the
/// columns it already touched.
///
/// One perturbator should span all sub-relations of a decomposed fragment
/// so that numeric column statistics are computed once, from values as they
/// stood before any mutation.
pub struct ValuePerturbator<'a> {
    library: &'a MethodLibrary<'a>,
    options: ValueNoiseOptions,
    stats: HashMap<usize, Option<ColumnStats>>,
}

impl<'a> ValuePerturbator<'a> {
    pub fn new(library: &'a MethodLibrary<'a>, options: ValueNoiseOptions) -> Self {
        ValuePerturbator {
            library,
            options,
            stats: HashMap::new(),
        }
    }

    pub fn perturb<R: Rng>(&mut self, rel: &mut Relation, rng: &mut R) -> Result<()> {
        match (rel.overlap_columns.is_some(), rel.overlap_rows.is_some()) {
            (true, false) => {
                self.perturb_columns(rel, rng)?;
                Ok(())
            }
            (false, true) => self.perturb_rows(rel, &BTreeSet::new(), rng),
            (true, true) => {
                let touched = self.perturb_columns(rel, rng)?;
                self.perturb_rows(rel, &touched, rng)
            }
            (false, false) => {
                debug!("fragment has no recorded overlap, skipping value noise");
                Ok(())
            }
        }
    }

    /// Column-wise pass over the vertical overlap. Returns the set of
    /// columns that were selected.
    fn perturb_columns<R: Rng>(
        &mut self,
        rel: &mut Relation,
        rng: &mut R,
    ) -> Result<BTreeSet<usize>> {
        let overlap = rel.overlap_columns.clone().unwrap_or_default();
        let candidates: Vec<usize> = overlap
            .iter()
            .copied()
            .filter(|idx| rel.columns.contains_key(idx))
            .filter(|idx| self.options.keys_eligible || !rel.key.contains(idx))
            .collect();

        let (mut numeric, mut string): (Vec<usize>, Vec<usize>) =
            candidates.into_iter().partition(|idx| {
                rel.column(*idx)
                    .is_some_and(|col| col.attr.datatype.is_numeric())
            });

        let total = numeric.len() + string.len();
        let quota = round_share(total, self.options.noise_pct);
        let numeric_share = allocate_numeric_share(
            quota,
            total,
            numeric.len(),
            string.len(),
            self.options.numeric_methods.len(),
            self.options.string_methods.len(),
        );
        let string_share = quota.saturating_sub(numeric_share).min(string.len());

        numeric.shuffle(rng);
        numeric.truncate(numeric_share);
        string.shuffle(rng);
        string.truncate(string_share);

        let entries = round_share(rel.num_rows(), self.options.inside_pct);
        debug!(
            numeric = numeric.len(),
            string = string.len(),
            entries_per_column = entries,
            "column-wise value noise"
        );

        for &idx in &numeric {
            self.perturb_numeric_column(rel, idx, entries, rng)?;
        }
        for &idx in &string {
            self.perturb_string_column(rel, idx, entries, rng)?;
        }

        Ok(numeric.into_iter().chain(string).collect())
    }

    fn perturb_numeric_column<R: Rng>(
        &mut self,
        rel: &mut Relation,
        idx: usize,
        entries: usize,
        rng: &mut R,
    ) -> Result<()> {
        if self.options.numeric_methods.is_empty() {
            debug!(column = idx, "no numeric methods enabled, column unchanged");
            return Ok(());
        }
        let Some(stats) = self.stats_for(rel, idx) else {
            warn!(column = idx, "no parseable numeric values, column unchanged");
            return Ok(());
        };

        let mut rows: Vec<usize> = (0..rel.num_rows()).collect();
        rows.shuffle(rng);
        rows.truncate(entries);

        let col = rel
            .column_mut(idx)
            .ok_or(FractureError::UnknownColumn(idx))?;
        for row in rows {
            let Some(&method) = self.options.numeric_methods.choose(rng) else {
                break;
            };
            match replace_numeric(&col.values[row], stats, method, rng) {
                Some(replacement) => col.values[row] = replacement,
                None => warn!(column = idx, row, "cell is not numeric, kept as is"),
            }
        }
        Ok(())
    }

    fn perturb_string_column<R: Rng>(
        &self,
        rel: &mut Relation,
        idx: usize,
        entries: usize,
        rng: &mut R,
    ) -> Result<()> {
        let mut rows: Vec<usize> = (0..rel.num_rows()).collect();
        rows.shuffle(rng);
        rows.truncate(entries);

        let col = rel
            .column_mut(idx)
            .ok_or(FractureError::UnknownColumn(idx))?;
        for row in rows {
            let replacement = self.replace_string(&col.values[row], rng);
            col.values[row] = replacement;
        }
        Ok(())
    }

    /// Row-wise pass over the horizontal overlap, skipping `excluded`
    /// columns.
    fn perturb_rows<R: Rng>(
        &mut self,
        rel: &mut Relation,
        excluded: &BTreeSet<usize>,
        rng: &mut R,
    ) -> Result<()> {
        let overlap = rel.overlap_rows.unwrap_or(0);
        let mut rows: Vec<usize> = (0..overlap).collect();
        rows.shuffle(rng);
        rows.truncate(round_share(overlap, self.options.noise_pct));

        let key_like = rel.key_like_columns();
        let mut perturbable: Vec<usize> = rel
            .column_indices()
            .into_iter()
            .filter(|idx| self.options.keys_eligible || !key_like.contains(idx))
            .filter(|idx| !excluded.contains(idx))
            .collect();

        debug!(
            rows = rows.len(),
            columns = perturbable.len(),
            "row-wise value noise"
        );

        for row in rows {
            perturbable.shuffle(rng);
            let take = round_share(perturbable.len(), self.options.inside_pct);
            let chosen: Vec<usize> = perturbable.iter().take(take).copied().collect();
            for idx in chosen {
                self.perturb_entry(rel, idx, row, rng)?;
            }
        }
        Ok(())
    }

    fn perturb_entry<R: Rng>(
        &mut self,
        rel: &mut Relation,
        idx: usize,
        row: usize,
        rng: &mut R,
    ) -> Result<()> {
        let numeric = rel
            .column(idx)
            .ok_or(FractureError::UnknownColumn(idx))?
            .attr
            .datatype
            .is_numeric();

        if numeric {
            if self.options.numeric_methods.is_empty() {
                debug!(column = idx, "no numeric methods enabled, cell unchanged");
                return Ok(());
            }
            let Some(stats) = self.stats_for(rel, idx) else {
                warn!(column = idx, "no parseable numeric values, cell unchanged");
                return Ok(());
            };
            let Some(&method) = self.options.numeric_methods.choose(rng) else {
                return Ok(());
            };
            let col = rel
                .column_mut(idx)
                .ok_or(FractureError::UnknownColumn(idx))?;
            match replace_numeric(&col.values[row], stats, method, rng) {
                Some(replacement) => col.values[row] = replacement,
                None => warn!(column = idx, row, "cell is not numeric, kept as is"),
            }
        } else {
            let col = rel
                .column_mut(idx)
                .ok_or(FractureError::UnknownColumn(idx))?;
            let replacement = self.replace_string(&col.values[row], rng);
            col.values[row] = replacement;
        }
        Ok(())
    }

    /// Replace one string cell.
    ///
    /// Enabled methods applicable to this literal are tried first in random
    /// order. When none produces an acceptable result, the applicable but
    /// not enabled methods get a try, and failing even that the cell is
    /// emptied. An empty result counts as acceptable only for the
    /// missing-value method.
    fn replace_string<R: Rng>(&self, value: &str, rng: &mut R) -> String {
        let applicable: Vec<StringMethod> = StringMethod::ALL
            .iter()
            .copied()
            .filter(|method| method.is_applicable(value))
            .collect();

        let (mut enabled, mut disabled): (Vec<StringMethod>, Vec<StringMethod>) = applicable
            .into_iter()
            .partition(|method| self.options.string_methods.contains(method));

        enabled.shuffle(rng);
        disabled.shuffle(rng);

        for method in enabled.into_iter().chain(disabled) {
            let candidate = self.library.apply_string(method, value, rng);
            if candidate == value {
                continue;
            }
            if candidate.is_empty() && method != StringMethod::MissingValue {
                continue;
            }
            return candidate;
        }
        String::new()
    }

    /// Column statistics, computed on first use so later mutations of the
    /// column cannot skew them.
    fn stats_for(&mut self, rel: &Relation, idx: usize) -> Option<ColumnStats> {
        *self.stats.entry(idx).or_insert_with(|| {
            rel.column(idx)
                .and_then(|col| ColumnStats::compute(&col.values))
        })
    }
}

/// Split a perturbation quota between numeric and string columns.
///
/// `num_to_perturb` is the total column quota, `num_candidates` the number
/// of candidate columns of both types together. The remaining share, that
/// is `num_to_perturb` minus the returned value, goes to string columns.
/// The branch ordering is deliberate and callers depend on the exact
/// shares:
///
/// - no methods of a type enabled shifts the quota to the other type,
/// - a quota of exactly two with both column types present yields one
///   column of each,
/// - otherwise the quota splits proportionally to the column counts,
///   raised so every enabled method of a type can land on a distinct
///   column of that type when enough columns exist.
pub fn allocate_numeric_share(
    num_to_perturb: usize,
    num_candidates: usize,
    num_numeric: usize,
    num_string: usize,
    num_numeric_methods: usize,
    num_string_methods: usize,
) -> usize {
    if num_to_perturb == 0 || num_candidates == 0 {
        return 0;
    }
    match (num_numeric_methods > 0, num_string_methods > 0) {
        (false, false) => 0,
        (true, false) => num_to_perturb.min(num_numeric),
        (false, true) => num_to_perturb.saturating_sub(num_string).min(num_numeric),
        (true, true) => {
            if num_to_perturb == 2 && num_numeric > 0 && num_string > 0 {
                return 1;
            }
            let proportional = (num_to_perturb * num_numeric).div_ceil(num_candidates);
            let mut share = proportional.max(num_numeric.min(num_numeric_methods));
            let string_share = num_to_perturb.saturating_sub(share);
            let string_floor = num_string.min(num_string_methods);
            if string_share < string_floor {
                share = num_to_perturb.saturating_sub(string_floor);
            }
            share.min(num_numeric)
        }
    }
}
