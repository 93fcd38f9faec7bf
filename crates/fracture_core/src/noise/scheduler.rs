//! Rotation scheduler deciding which rename method each column receives.

use rand::Rng;
use rand::seq::SliceRandom;

use super::{MethodLibrary, SchemaMethod, text};

/// Stateful rotation over the enabled rename methods.
///
/// One scheduler serves every column renamed within a fragment. Methods are
/// drawn from a pool that drains as they get used, so consecutive columns
/// receive different methods until the whole enabled set has been exercised
/// and the pool refills. Two context-sensitive methods are checked before
/// the random walk: [`SchemaMethod::ShuffleWords`] fires only on multi-word
/// names and [`SchemaMethod::RemoveVowels`] only on names containing a
/// vowel. When their check fails they leave the pool for the duration of
/// the current column and are re-added once it resolves, so a single
/// unsuitable name does not cost them their turn elsewhere.
#[derive(Debug)]
pub struct MethodScheduler {
    all: Vec<SchemaMethod>,
    pool: Vec<SchemaMethod>,
}

impl MethodScheduler {
    pub fn new(enabled: &[SchemaMethod]) -> Self {
        let mut all: Vec<SchemaMethod> = Vec::with_capacity(enabled.len());
        for &method in enabled {
            if !all.contains(&method) {
                all.push(method);
            }
        }
        let pool = all.clone();
        MethodScheduler { all, pool }
    }

    /// Whether no methods are enabled at all.
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Produce a replacement for `name`.
    ///
    /// With a non-empty enabled set the result always differs from the
    /// input, except for the degenerate shuffle of a multi-word name whose
    /// words are all identical.
    pub fn rename<R: Rng>(&mut self, name: &str, library: &MethodLibrary, rng: &mut R) -> String {
        let mut deferred = Vec::new();
        let result = self.rename_inner(name, library, &mut deferred, rng);
        // Deferred methods return to the pool once the column is resolved.
        self.pool.append(&mut deferred);
        result
    }

    fn rename_inner<R: Rng>(
        &mut self,
        name: &str,
        library: &MethodLibrary,
        deferred: &mut Vec<SchemaMethod>,
        rng: &mut R,
    ) -> String {
        if self.pool.is_empty() {
            self.pool = self.all.clone();
        }

        // The context-sensitive methods get first pick while they still sit
        // in the pool: apply on a suitable name, defer otherwise.
        for special in [SchemaMethod::ShuffleWords, SchemaMethod::RemoveVowels] {
            if let Some(pos) = self.pool.iter().position(|m| *m == special) {
                self.pool.remove(pos);
                if special_applies(special, name) {
                    return library.apply_schema(special, name, rng);
                }
                deferred.push(special);
                if self.pool.is_empty() {
                    // Mid-column refill, leaving the deferred methods out.
                    self.pool = self
                        .all
                        .iter()
                        .copied()
                        .filter(|m| !deferred.contains(m))
                        .collect();
                }
            }
        }

        // Random walk over the rest of the pool. The first acceptable
        // result wins and retires its method for this cycle.
        self.pool.shuffle(rng);
        let mut idx = 0;
        while idx < self.pool.len() {
            let candidate = library.apply_schema(self.pool[idx], name, rng);
            if acceptable(name, &candidate) {
                self.pool.remove(idx);
                return candidate;
            }
            idx += 1;
        }

        // The pool produced nothing. The special methods get another look:
        // they may have been consumed by an earlier column and so never
        // checked above.
        for special in [SchemaMethod::ShuffleWords, SchemaMethod::RemoveVowels] {
            if self.all.contains(&special) && special_applies(special, name) {
                return library.apply_schema(special, name, rng);
            }
        }

        // Retry methods already used up in this cycle.
        let mut used: Vec<SchemaMethod> = self
            .all
            .iter()
            .copied()
            .filter(|m| !self.pool.contains(m) && !deferred.contains(m))
            .collect();
        used.shuffle(rng);
        for method in used {
            let candidate = library.apply_schema(method, name, rng);
            if acceptable(name, &candidate) {
                return candidate;
            }
        }

        // Last resort, cannot fail to produce a different name.
        if rng.random_bool(0.5) {
            text::add_random_prefix(name, rng)
        } else {
            text::random_name_differing(name, rng)
        }
    }
}

/// Acceptance test for the generic selection paths: the rename must change
/// the name and must not degrade it to nothing.
fn acceptable(original: &str, candidate: &str) -> bool {
    candidate != original && !candidate.is_empty() && candidate != " "
}

fn special_applies(method: SchemaMethod, name: &str) -> bool {
    match method {
        SchemaMethod::ShuffleWords => text::has_multiple_words(name),
        SchemaMethod::RemoveVowels => text::contains_vowel(name),
        _ => false,
    }
}
