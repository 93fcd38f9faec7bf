//! Column name corruption.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::errors::{FractureError, Result};
use crate::noise::scheduler::MethodScheduler;
use crate::noise::{MethodLibrary, SchemaMethod};
use crate::partition::round_share;
use crate::relation::Relation;

/// Controls for schema noise.
#[derive(Debug, Clone)]
pub struct SchemaNoiseOptions {
    /// Percentage of eligible columns whose names get rewritten.
    pub noise_pct: f64,
    /// Whether key columns may be renamed.
    pub keys_eligible: bool,
    /// Drop every column name instead of renaming a share of them.
    pub erase_names: bool,
    /// Rename methods to rotate through.
    pub methods: Vec<SchemaMethod>,
}

/// Rewrites a share of a fragment's column names.
///
/// Scheduler state persists across calls, so one perturbator should span
/// all sub-relations of a decomposed fragment: the method rotation then
/// continues from one sub-relation to the next instead of restarting.
pub struct SchemaPerturbator<'a> {
    library: &'a MethodLibrary<'a>,
    options: SchemaNoiseOptions,
    scheduler: MethodScheduler,
}

impl<'a> SchemaPerturbator<'a> {
    pub fn new(library: &'a MethodLibrary<'a>, options: SchemaNoiseOptions) -> Self {
        let scheduler = MethodScheduler::new(&options.methods);
        SchemaPerturbator {
            library,
            options,
            scheduler,
        }
    }

    /// Corrupt column names of `rel` in place.
    ///
    /// In erase mode every name is dropped and nothing else happens.
    /// Otherwise a random share of the eligible columns is renamed through
    /// the method rotation. Unnamed columns rename like columns with an
    /// empty name, which always ends in the fallback producing a fresh one.
    pub fn perturb<R: Rng>(&mut self, rel: &mut Relation, rng: &mut R) -> Result<()> {
        if self.options.erase_names {
            for col in rel.columns.values_mut() {
                col.attr.name = None;
            }
            return Ok(());
        }
        if self.scheduler.is_empty() {
            debug!("no rename methods enabled, skipping schema noise");
            return Ok(());
        }

        let mut eligible = self.eligible_columns(rel);
        let count = round_share(eligible.len(), self.options.noise_pct);
        eligible.shuffle(rng);

        for &idx in eligible.iter().take(count) {
            let col = rel
                .column_mut(idx)
                .ok_or(FractureError::UnknownColumn(idx))?;
            let current = col.attr.name.clone().unwrap_or_default();
            let renamed = self.scheduler.rename(&current, self.library, rng);
            debug!(column = idx, from = %current, to = %renamed, "renamed column");
            col.attr.name = Some(renamed);
        }
        Ok(())
    }

    /// Columns a rename may touch: the vertical overlap when one is
    /// recorded, all columns otherwise, minus the key unless keys are
    /// eligible.
    fn eligible_columns(&self, rel: &Relation) -> Vec<usize> {
        let candidates: Vec<usize> = match rel.overlap_columns.as_ref() {
            Some(overlap) => overlap
                .iter()
                .copied()
                .filter(|idx| rel.columns.contains_key(idx))
                .collect(),
            None => rel.column_indices(),
        };
        candidates
            .into_iter()
            .filter(|idx| self.options.keys_eligible || !rel.key.contains(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::oracle::lexicon::{Language, StaticLexicon};
    use crate::relation::{Attribute, Column, DataType};

    fn string_column(name: &str, values: &[&str]) -> Column {
        Column::new(
            Attribute::new(name, DataType::Utf8),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    fn sample_relation() -> Relation {
        let mut rel = Relation::from_columns([
            (0, string_column("id", &["1", "2", "3"])),
            (1, string_column("customer name", &["a", "b", "c"])),
            (2, string_column("street", &["d", "e", "f"])),
            (3, string_column("order total", &["g", "h", "i"])),
        ]);
        rel.key = BTreeSet::from([0]);
        rel
    }

    fn options(noise_pct: f64, methods: Vec<SchemaMethod>) -> SchemaNoiseOptions {
        SchemaNoiseOptions {
            noise_pct,
            keys_eligible: false,
            erase_names: false,
            methods,
        }
    }

    fn names(rel: &Relation) -> Vec<Option<String>> {
        rel.columns
            .values()
            .map(|col| col.attr.name.clone())
            .collect()
    }

    #[test]
    fn full_noise_changes_every_eligible_name() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(71);
        let mut rel = Relation::from_columns([
            (0, string_column("id", &["1", "2", "3"])),
            (1, string_column("customer first name", &["a", "b", "c"])),
            (2, string_column("street", &["d", "e", "f"])),
            (3, string_column("total order price", &["g", "h", "i"])),
        ]);
        rel.key = BTreeSet::from([0]);
        let before = names(&rel);

        let mut perturbator = SchemaPerturbator::new(
            &library,
            options(
                100.0,
                vec![SchemaMethod::RemoveVowels, SchemaMethod::ShuffleWords],
            ),
        );
        perturbator.perturb(&mut rel, &mut rng).unwrap();

        let after = names(&rel);
        // Key stays, everything else changed.
        assert_eq!(before[0], after[0]);
        for idx in 1..4 {
            assert_ne!(before[idx], after[idx], "column {idx} kept its name");
            assert!(after[idx].as_deref().is_some_and(|n| !n.is_empty()));
        }
    }

    #[test]
    fn half_noise_changes_half_the_columns() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(72);
        let mut rel = Relation::from_columns([
            (0, string_column("alpha", &["1"])),
            (1, string_column("beta", &["2"])),
            (2, string_column("gamma", &["3"])),
            (3, string_column("delta", &["4"])),
        ]);
        let before = names(&rel);

        let mut perturbator =
            SchemaPerturbator::new(&library, options(50.0, SchemaMethod::ALL.to_vec()));
        perturbator.perturb(&mut rel, &mut rng).unwrap();

        let changed = names(&rel)
            .iter()
            .zip(&before)
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(2, changed);
    }

    #[test]
    fn keys_renamed_only_when_eligible() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(73);
        let mut rel = sample_relation();

        let mut opts = options(100.0, SchemaMethod::ALL.to_vec());
        opts.keys_eligible = true;
        let mut perturbator = SchemaPerturbator::new(&library, opts);
        perturbator.perturb(&mut rel, &mut rng).unwrap();

        assert_ne!(Some("id"), rel.column(0).unwrap().attr.name.as_deref());
    }

    #[test]
    fn overlap_restricts_eligible_columns() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(74);
        let mut rel = sample_relation();
        rel.overlap_columns = Some(BTreeSet::from([0, 2]));
        let before = names(&rel);

        let mut perturbator =
            SchemaPerturbator::new(&library, options(100.0, SchemaMethod::ALL.to_vec()));
        perturbator.perturb(&mut rel, &mut rng).unwrap();

        let after = names(&rel);
        // Only column 2 is overlap and non-key.
        assert_eq!(before[0], after[0]);
        assert_eq!(before[1], after[1]);
        assert_ne!(before[2], after[2]);
        assert_eq!(before[3], after[3]);
    }

    #[test]
    fn erase_mode_drops_all_names() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(75);
        let mut rel = sample_relation();

        let mut opts = options(0.0, vec![]);
        opts.erase_names = true;
        let mut perturbator = SchemaPerturbator::new(&library, opts);
        perturbator.perturb(&mut rel, &mut rng).unwrap();

        assert!(rel.columns.values().all(|col| col.attr.name.is_none()));
    }

    #[test]
    fn empty_method_set_is_a_no_op() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(76);
        let mut rel = sample_relation();
        let before = names(&rel);

        let mut perturbator = SchemaPerturbator::new(&library, options(100.0, vec![]));
        perturbator.perturb(&mut rel, &mut rng).unwrap();

        assert_eq!(before, names(&rel));
    }

    #[test]
    fn unnamed_columns_receive_a_fresh_name() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(77);
        let mut rel = Relation::from_columns([(
            0,
            Column::new(
                Attribute::unnamed(DataType::Utf8),
                vec!["x".to_string(), "y".to_string()],
            ),
        )]);

        let mut perturbator =
            SchemaPerturbator::new(&library, options(100.0, SchemaMethod::ALL.to_vec()));
        perturbator.perturb(&mut rel, &mut rng).unwrap();

        let name = rel.column(0).unwrap().attr.name.clone();
        assert!(name.is_some_and(|n| !n.is_empty()));
    }
}
