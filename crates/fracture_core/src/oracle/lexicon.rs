//! Lexical lookups backing the synonym and translation noise methods.

use crate::errors::{FractureError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    German,
}

/// Word-level lexical service.
///
/// Implementations are expected to be cheap to call per cell; failures are
/// reported as errors and degrade to "method not applied" upstream.
pub trait Lexicon {
    /// A synonym for `word`, or an error when none is known.
    fn synonym(&self, word: &str) -> Result<String>;

    /// Translate `text` word by word. Unknown words pass through unchanged.
    fn translate(&self, text: &str, from: Language, to: Language) -> Result<String>;
}

/// Built-in lexicon over a fixed table of attribute-style vocabulary.
///
/// Lookups are case-insensitive; replacements copy the capitalization of
/// the first letter. Translation supports English and German, both
/// directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLexicon;

const SYNONYMS: &[(&str, &str)] = &[
    ("id", "identifier"),
    ("name", "title"),
    ("phone", "telephone"),
    ("mobile", "cell"),
    ("address", "location"),
    ("city", "town"),
    ("country", "nation"),
    ("state", "province"),
    ("street", "road"),
    ("zip", "postcode"),
    ("code", "symbol"),
    ("price", "cost"),
    ("cost", "expense"),
    ("amount", "quantity"),
    ("quantity", "volume"),
    ("number", "count"),
    ("count", "total"),
    ("total", "sum"),
    ("date", "day"),
    ("year", "period"),
    ("customer", "client"),
    ("client", "patron"),
    ("product", "item"),
    ("item", "article"),
    ("order", "purchase"),
    ("company", "firm"),
    ("employee", "worker"),
    ("manager", "supervisor"),
    ("salary", "wage"),
    ("description", "summary"),
    ("type", "kind"),
    ("category", "class"),
    ("status", "condition"),
    ("value", "worth"),
    ("size", "dimension"),
    ("weight", "mass"),
    ("length", "extent"),
    ("color", "shade"),
    ("email", "mail"),
    ("user", "member"),
    ("group", "team"),
    ("region", "area"),
    ("department", "division"),
    ("title", "heading"),
    ("comment", "remark"),
    ("note", "memo"),
    ("begin", "start"),
    ("end", "finish"),
];

/// English/German pairs, English first.
const TRANSLATIONS: &[(&str, &str)] = &[
    ("number", "nummer"),
    ("customer", "kunde"),
    ("city", "stadt"),
    ("country", "land"),
    ("street", "strasse"),
    ("price", "preis"),
    ("cost", "kosten"),
    ("date", "datum"),
    ("year", "jahr"),
    ("month", "monat"),
    ("day", "tag"),
    ("time", "zeit"),
    ("order", "bestellung"),
    ("item", "artikel"),
    ("company", "firma"),
    ("employee", "mitarbeiter"),
    ("salary", "gehalt"),
    ("color", "farbe"),
    ("size", "groesse"),
    ("weight", "gewicht"),
    ("address", "adresse"),
    ("phone", "telefon"),
    ("description", "beschreibung"),
    ("value", "wert"),
    ("amount", "betrag"),
    ("state", "bundesland"),
    ("count", "anzahl"),
    ("total", "summe"),
    ("age", "alter"),
    ("user", "benutzer"),
    ("group", "gruppe"),
    ("area", "gebiet"),
    ("department", "abteilung"),
    ("title", "titel"),
    ("note", "notiz"),
    ("start", "anfang"),
    ("end", "ende"),
    ("first", "erste"),
    ("last", "letzte"),
    ("red", "rot"),
    ("green", "gruen"),
    ("blue", "blau"),
    ("black", "schwarz"),
    ("white", "weiss"),
];

impl Lexicon for StaticLexicon {
    fn synonym(&self, word: &str) -> Result<String> {
        let trimmed = word.trim();
        let lower = trimmed.to_lowercase();
        let replacement = SYNONYMS
            .iter()
            .find(|(from, _)| *from == lower)
            .map(|(_, to)| *to)
            .ok_or_else(|| FractureError::Lexicon(format!("no synonym for '{trimmed}'")))?;
        Ok(copy_capitalization(trimmed, replacement))
    }

    fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if from == to {
            return Ok(text.to_string());
        }
        let translated: Vec<String> = text
            .split_whitespace()
            .map(|word| {
                let lower = word.to_lowercase();
                let hit = match (from, to) {
                    (Language::English, Language::German) => TRANSLATIONS
                        .iter()
                        .find(|(en, _)| *en == lower)
                        .map(|(_, de)| *de),
                    (Language::German, Language::English) => TRANSLATIONS
                        .iter()
                        .find(|(_, de)| *de == lower)
                        .map(|(en, _)| *en),
                    _ => None,
                };
                match hit {
                    Some(replacement) => copy_capitalization(word, replacement),
                    None => word.to_string(),
                }
            })
            .collect();
        Ok(translated.join(" "))
    }
}

/// Uppercase the replacement's first letter when the original starts
/// uppercase.
fn copy_capitalization(original: &str, replacement: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonym_copies_capitalization() {
        let lexicon = StaticLexicon;
        assert_eq!("client", lexicon.synonym("customer").unwrap());
        assert_eq!("Client", lexicon.synonym("Customer").unwrap());
        assert_eq!("Client", lexicon.synonym("CUSTOMER").unwrap());
    }

    #[test]
    fn synonym_miss_is_an_error() {
        let lexicon = StaticLexicon;
        assert!(lexicon.synonym("qwxz").is_err());
    }

    #[test]
    fn translate_word_by_word() {
        let lexicon = StaticLexicon;
        assert_eq!(
            "Kunde nummer",
            lexicon
                .translate("Customer number", Language::English, Language::German)
                .unwrap()
        );
    }

    #[test]
    fn translate_reverse_direction() {
        let lexicon = StaticLexicon;
        assert_eq!(
            "customer",
            lexicon
                .translate("kunde", Language::German, Language::English)
                .unwrap()
        );
    }

    #[test]
    fn translate_unknown_words_pass_through() {
        let lexicon = StaticLexicon;
        assert_eq!(
            "flux stadt",
            lexicon
                .translate("flux city", Language::English, Language::German)
                .unwrap()
        );
    }

    #[test]
    fn translate_same_language_is_identity() {
        let lexicon = StaticLexicon;
        assert_eq!(
            "city",
            lexicon
                .translate("city", Language::English, Language::English)
                .unwrap()
        );
    }
}
