//! Catalogue of noise methods applied to schema names and cell values.

pub mod numeric;
pub mod scheduler;
pub mod text;

use std::collections::HashMap;

use rand::Rng;
use tracing::debug;

use crate::oracle::lexicon::{Language, Lexicon};

/// Rename methods for column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaMethod {
    RandomName,
    RemoveVowels,
    AbbreviateFirstLetters,
    AbbreviateRandom,
    AddPrefix,
    ShuffleLetters,
    ShuffleWords,
    Synonym,
    Translate,
}

impl SchemaMethod {
    pub const ALL: [SchemaMethod; 9] = [
        SchemaMethod::RandomName,
        SchemaMethod::RemoveVowels,
        SchemaMethod::AbbreviateFirstLetters,
        SchemaMethod::AbbreviateRandom,
        SchemaMethod::AddPrefix,
        SchemaMethod::ShuffleLetters,
        SchemaMethod::ShuffleWords,
        SchemaMethod::Synonym,
        SchemaMethod::Translate,
    ];
}

/// Corruption methods for string cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMethod {
    Typo,
    KeyboardError,
    OcrError,
    PhoneticError,
    ChangeFormat,
    ShuffleWords,
    Abbreviate,
    Synonym,
    Translate,
    MissingValue,
}

impl StringMethod {
    pub const ALL: [StringMethod; 10] = [
        StringMethod::Typo,
        StringMethod::KeyboardError,
        StringMethod::OcrError,
        StringMethod::PhoneticError,
        StringMethod::ChangeFormat,
        StringMethod::ShuffleWords,
        StringMethod::Abbreviate,
        StringMethod::Synonym,
        StringMethod::Translate,
        StringMethod::MissingValue,
    ];

    /// Whether the method can do anything useful with this literal value.
    pub fn is_applicable(&self, value: &str) -> bool {
        match self {
            StringMethod::Typo
            | StringMethod::Abbreviate
            | StringMethod::Synonym
            | StringMethod::Translate
            | StringMethod::MissingValue => true,
            StringMethod::ShuffleWords => text::has_multiple_words(value),
            StringMethod::KeyboardError => text::has_keyboard_confusable(value),
            StringMethod::OcrError => text::has_ocr_confusable(value),
            StringMethod::PhoneticError => text::has_phonetic_confusable(value),
            StringMethod::ChangeFormat => text::has_format_symbol(value),
        }
    }
}

/// Corruption methods for numeric cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericMethod {
    ChangeValue,
    ChangeToOutlier,
}

impl NumericMethod {
    pub const ALL: [NumericMethod; 2] = [NumericMethod::ChangeValue, NumericMethod::ChangeToOutlier];
}

/// Dispatches method enums onto the text functions and the lexicon.
///
/// Lexicon failures degrade to an empty string so that callers reject the
/// result and move on to another method.
pub struct MethodLibrary<'a> {
    lexicon: &'a dyn Lexicon,
    translate_from: Language,
    translate_to: Language,
}

impl<'a> MethodLibrary<'a> {
    pub fn new(lexicon: &'a dyn Lexicon, translate_from: Language, translate_to: Language) -> Self {
        MethodLibrary {
            lexicon,
            translate_from,
            translate_to,
        }
    }

    pub fn apply_schema<R: Rng>(&self, method: SchemaMethod, name: &str, rng: &mut R) -> String {
        match method {
            SchemaMethod::RandomName => text::random_name_differing(name, rng),
            SchemaMethod::RemoveVowels => text::remove_vowels(name),
            SchemaMethod::AbbreviateFirstLetters => text::abbreviate_first_letters(name),
            SchemaMethod::AbbreviateRandom => text::abbreviate_random(name, rng),
            SchemaMethod::AddPrefix => text::add_random_prefix(name, rng),
            SchemaMethod::ShuffleLetters => text::shuffle_letters(name, rng),
            SchemaMethod::ShuffleWords => text::shuffle_words(name, rng),
            SchemaMethod::Synonym => self.synonym(name),
            SchemaMethod::Translate => self.translate(name),
        }
    }

    pub fn apply_string<R: Rng>(&self, method: StringMethod, value: &str, rng: &mut R) -> String {
        match method {
            StringMethod::Typo => text::generate_typo(value, rng),
            StringMethod::KeyboardError => text::keyboard_error(value, rng),
            StringMethod::OcrError => text::ocr_error(value, rng),
            StringMethod::PhoneticError => text::phonetic_error(value, rng),
            StringMethod::ChangeFormat => text::change_format(value, rng),
            StringMethod::ShuffleWords => text::shuffle_words(value, rng),
            StringMethod::Abbreviate => text::abbreviate_random(value, rng),
            StringMethod::Synonym => self.synonym(value),
            StringMethod::Translate => self.translate(value),
            StringMethod::MissingValue => String::new(),
        }
    }

    fn synonym(&self, word: &str) -> String {
        match self.lexicon.synonym(word) {
            Ok(replacement) => replacement,
            Err(e) => {
                debug!(%e, word, "synonym lookup failed");
                String::new()
            }
        }
    }

    fn translate(&self, text: &str) -> String {
        match self
            .lexicon
            .translate(text, self.translate_from, self.translate_to)
        {
            Ok(replacement) => replacement,
            Err(e) => {
                debug!(%e, text, "translation failed");
                String::new()
            }
        }
    }
}

/// Relabel values with integers assigned in order of first appearance.
///
/// Rows holding equal values receive equal labels, so applying the remap
/// twice yields the same partition into equivalence classes even though the
/// labels themselves may shift.
pub fn map_column(values: &[String]) -> Vec<String> {
    let mut labels: HashMap<&str, usize> = HashMap::new();
    let mut next = 0;
    values
        .iter()
        .map(|v| {
            let label = *labels.entry(v.as_str()).or_insert_with(|| {
                let assigned = next;
                next += 1;
                assigned
            });
            label.to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::oracle::lexicon::StaticLexicon;

    fn strings(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn map_column_first_appearance_order() {
        assert_eq!(
            strings(&["0", "1", "0", "2"]),
            map_column(&strings(&["b", "a", "b", "c"]))
        );
    }

    #[test]
    fn map_column_stable_partition() {
        let input = strings(&["1", "0", "1", "2"]);
        let once = map_column(&input);
        assert_eq!(strings(&["0", "1", "0", "2"]), once);
        // Labels shifted relative to the input, but re-applying keeps the
        // same equivalence classes.
        let twice = map_column(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_value_empties_cell() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(51);
        assert_eq!(
            "",
            library.apply_string(StringMethod::MissingValue, "anything", &mut rng)
        );
    }

    #[test]
    fn synonym_miss_degrades_to_empty() {
        let lexicon = StaticLexicon;
        let library = MethodLibrary::new(&lexicon, Language::English, Language::German);
        let mut rng = StdRng::seed_from_u64(52);
        assert_eq!(
            "",
            library.apply_schema(SchemaMethod::Synonym, "zzgarblezz", &mut rng)
        );
    }

    #[test]
    fn applicability_gates() {
        assert!(StringMethod::Typo.is_applicable(""));
        assert!(StringMethod::ShuffleWords.is_applicable("two words"));
        assert!(!StringMethod::ShuffleWords.is_applicable("single"));
        assert!(StringMethod::OcrError.is_applicable("Box 5"));
        assert!(!StringMethod::OcrError.is_applicable("nrm"));
        assert!(StringMethod::ChangeFormat.is_applicable("a/b"));
        assert!(!StringMethod::ChangeFormat.is_applicable("ab"));
    }
}
