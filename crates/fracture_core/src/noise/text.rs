//! Pure string mangling functions.
//!
//! Everything here takes the value to corrupt (plus a random source where
//! needed) and returns a new string. Callers decide whether the result is
//! acceptable; functions return the input unchanged when they don't apply,
//! e.g. an OCR substitution on a string without confusable characters.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'A', 'E', 'I', 'O', 'U'];

/// Characters commonly confused by OCR software, with their misread
/// counterparts.
const OCR_CONFUSIONS: &[(char, char)] = &[
    ('0', 'O'),
    ('O', '0'),
    ('1', 'l'),
    ('l', '1'),
    ('5', 'S'),
    ('S', '5'),
    ('8', 'B'),
    ('B', '8'),
    ('2', 'Z'),
    ('Z', '2'),
    ('6', 'G'),
    ('G', '6'),
    ('9', 'q'),
    ('q', '9'),
];

/// Consonant pairs that sound alike, lowercase.
const PHONETIC_CONFUSIONS: &[(char, char)] = &[
    ('f', 'v'),
    ('v', 'f'),
    ('c', 'k'),
    ('k', 'c'),
    ('s', 'z'),
    ('z', 's'),
    ('p', 'b'),
    ('b', 'p'),
    ('d', 't'),
    ('t', 'd'),
    ('g', 'j'),
    ('j', 'g'),
];

/// QWERTY neighbors, lowercase.
const KEYBOARD_NEIGHBORS: &[(char, &str)] = &[
    ('q', "wa"),
    ('w', "qes"),
    ('e', "wrd"),
    ('r', "etf"),
    ('t', "ryg"),
    ('y', "tuh"),
    ('u', "yij"),
    ('i', "uok"),
    ('o', "ipl"),
    ('p', "ol"),
    ('a', "qsz"),
    ('s', "awedxz"),
    ('d', "serfcx"),
    ('f', "drtgvc"),
    ('g', "ftyhbv"),
    ('h', "gyujnb"),
    ('j', "huikmn"),
    ('k', "jiolm"),
    ('l', "kop"),
    ('z', "asx"),
    ('x', "zsdc"),
    ('c', "xdfv"),
    ('v', "cfgb"),
    ('b', "vghn"),
    ('n', "bhjm"),
    ('m', "njk"),
];

/// Separator symbols that format changes swap between.
const FORMAT_SYMBOLS: &[char] = &[' ', '-', '_', '.', '/', ','];

pub fn contains_vowel(s: &str) -> bool {
    s.chars().any(|c| VOWELS.contains(&c))
}

pub fn has_multiple_words(s: &str) -> bool {
    s.split_whitespace().nth(1).is_some()
}

pub fn has_ocr_confusable(s: &str) -> bool {
    s.chars().any(|c| ocr_confusion(c).is_some())
}

pub fn has_phonetic_confusable(s: &str) -> bool {
    s.chars().any(|c| phonetic_confusion(c).is_some())
}

pub fn has_keyboard_confusable(s: &str) -> bool {
    s.chars().any(|c| keyboard_neighbors(c).is_some())
}

pub fn has_format_symbol(s: &str) -> bool {
    s.chars().any(|c| FORMAT_SYMBOLS.contains(&c))
}

/// Strip every vowel.
pub fn remove_vowels(s: &str) -> String {
    s.chars().filter(|c| !VOWELS.contains(c)).collect()
}

/// Abbreviate to the uppercased first letter of every word, dot-separated.
/// Words are delimited by spaces, underscores, or hyphens.
pub fn abbreviate_first_letters(s: &str) -> String {
    let mut out = String::new();
    for token in s.split([' ', '_', '-']) {
        let Some(first) = token.chars().next() else {
            continue;
        };
        out.extend(first.to_uppercase());
        out.push('.');
    }
    out
}

/// Cut the string at a random length and terminate it with a dot.
pub fn abbreviate_random<R: Rng>(s: &str, rng: &mut R) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 2 {
        return s.to_string();
    }
    let keep = rng.random_range(1..chars.len());
    let mut out: String = chars[..keep].iter().collect();
    out.push('.');
    out
}

/// Random alphanumeric name of 4 to 12 characters.
pub fn random_name<R: Rng>(rng: &mut R) -> String {
    let len = rng.random_range(4..=12);
    (0..len)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

/// Random name guaranteed to differ from `original`.
pub fn random_name_differing<R: Rng>(original: &str, rng: &mut R) -> String {
    for _ in 0..8 {
        let name = random_name(rng);
        if name != original {
            return name;
        }
    }
    add_random_prefix(original, rng)
}

/// Prepend a short random alphanumeric prefix joined with an underscore.
/// Always produces a string different from the input.
pub fn add_random_prefix<R: Rng>(s: &str, rng: &mut R) -> String {
    let len = rng.random_range(3..=5);
    let prefix: String = (0..len)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect();
    format!("{prefix}_{s}")
}

/// Shuffle all characters.
pub fn shuffle_letters<R: Rng>(s: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    chars.shuffle(rng);
    chars.into_iter().collect()
}

/// Shuffle whitespace-separated words, retrying a few times for an order
/// that differs from the input. Single words pass through unchanged.
pub fn shuffle_words<R: Rng>(s: &str, rng: &mut R) -> String {
    let mut words: Vec<&str> = s.split_whitespace().collect();
    if words.len() < 2 {
        return s.to_string();
    }
    for _ in 0..10 {
        words.shuffle(rng);
        let candidate = words.join(" ");
        if candidate != s {
            return candidate;
        }
    }
    words.join(" ")
}

/// Transpose two adjacent characters or duplicate one.
pub fn generate_typo<R: Rng>(s: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let swappable: Vec<usize> = (0..chars.len().saturating_sub(1))
        .filter(|&i| chars[i] != chars[i + 1])
        .collect();
    if !swappable.is_empty() && rng.random_bool(0.5) {
        if let Some(&at) = swappable.choose(rng) {
            chars.swap(at, at + 1);
            return chars.into_iter().collect();
        }
    }

    let at = rng.random_range(0..chars.len());
    chars.insert(at, chars[at]);
    chars.into_iter().collect()
}

/// Replace one character that neighbors it on a QWERTY keyboard, preserving
/// case.
pub fn keyboard_error<R: Rng>(s: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    let positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| keyboard_neighbors(**c).is_some())
        .map(|(i, _)| i)
        .collect();
    let Some(&at) = positions.choose(rng) else {
        return s.to_string();
    };
    if let Some(neighbors) = keyboard_neighbors(chars[at]) {
        let bytes = neighbors.as_bytes();
        let pick = bytes[rng.random_range(0..bytes.len())] as char;
        chars[at] = if chars[at].is_ascii_uppercase() {
            pick.to_ascii_uppercase()
        } else {
            pick
        };
    }
    chars.into_iter().collect()
}

/// Replace one character with its OCR misread.
pub fn ocr_error<R: Rng>(s: &str, rng: &mut R) -> String {
    substitute_confusable(s, rng, ocr_confusion)
}

/// Replace one character with a similar-sounding one, preserving case.
pub fn phonetic_error<R: Rng>(s: &str, rng: &mut R) -> String {
    substitute_confusable(s, rng, phonetic_confusion)
}

/// Swap one separator symbol present in the string for a different one,
/// replacing all its occurrences.
pub fn change_format<R: Rng>(s: &str, rng: &mut R) -> String {
    let present: Vec<char> = FORMAT_SYMBOLS
        .iter()
        .copied()
        .filter(|&sym| s.contains(sym))
        .collect();
    let Some(&from) = present.choose(rng) else {
        return s.to_string();
    };
    let alternatives: Vec<char> = FORMAT_SYMBOLS
        .iter()
        .copied()
        .filter(|&sym| sym != from)
        .collect();
    let Some(&to) = alternatives.choose(rng) else {
        return s.to_string();
    };
    s.chars().map(|c| if c == from { to } else { c }).collect()
}

fn substitute_confusable<R, F>(s: &str, rng: &mut R, confusion: F) -> String
where
    R: Rng,
    F: Fn(char) -> Option<char>,
{
    let mut chars: Vec<char> = s.chars().collect();
    let positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| confusion(**c).is_some())
        .map(|(i, _)| i)
        .collect();
    let Some(&at) = positions.choose(rng) else {
        return s.to_string();
    };
    if let Some(replacement) = confusion(chars[at]) {
        chars[at] = replacement;
    }
    chars.into_iter().collect()
}

fn ocr_confusion(c: char) -> Option<char> {
    OCR_CONFUSIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

fn phonetic_confusion(c: char) -> Option<char> {
    let lower = c.to_ascii_lowercase();
    let mapped = PHONETIC_CONFUSIONS
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| *to)?;
    Some(if c.is_ascii_uppercase() {
        mapped.to_ascii_uppercase()
    } else {
        mapped
    })
}

fn keyboard_neighbors(c: char) -> Option<&'static str> {
    let lower = c.to_ascii_lowercase();
    KEYBOARD_NEIGHBORS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, neighbors)| *neighbors)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn remove_vowels_strips_both_cases() {
        assert_eq!("Clmn Nm", remove_vowels("Column Name"));
        assert_eq!("", remove_vowels("aeiou"));
        assert_eq!("xyz", remove_vowels("xyz"));
    }

    #[test]
    fn abbreviate_first_letters_all_separators() {
        assert_eq!("T.I.A.C.N.", abbreviate_first_letters("this is a column_name"));
        assert_eq!("A.B.", abbreviate_first_letters("alpha-beta"));
        assert_eq!("X.", abbreviate_first_letters("x"));
    }

    #[test]
    fn phonetic_error_single_confusable_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(21);
        assert_eq!("Vun", phonetic_error("Fun", &mut rng));
    }

    #[test]
    fn ocr_error_single_confusable_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(22);
        assert_eq!("5and", ocr_error("Sand", &mut rng));
    }

    #[test]
    fn confusable_substitutions_skip_clean_input() {
        let mut rng = StdRng::seed_from_u64(23);
        // No OCR-confusable characters at all.
        assert_eq!("name", ocr_error("name", &mut rng));
        assert_eq!("", phonetic_error("", &mut rng));
    }

    #[test]
    fn keyboard_error_changes_one_letter() {
        let mut rng = StdRng::seed_from_u64(24);
        for _ in 0..50 {
            let out = keyboard_error("street", &mut rng);
            assert_eq!(6, out.chars().count());
            let diff = out
                .chars()
                .zip("street".chars())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(1, diff);
        }
    }

    #[test]
    fn keyboard_error_preserves_case() {
        let mut rng = StdRng::seed_from_u64(25);
        for _ in 0..50 {
            let out = keyboard_error("A", &mut rng);
            assert!(out.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn typo_swaps_or_duplicates() {
        let mut rng = StdRng::seed_from_u64(26);
        for _ in 0..100 {
            let out = generate_typo("abcd", &mut rng);
            assert_ne!("abcd", out);
            assert!(out.len() == 4 || out.len() == 5);
        }
    }

    #[test]
    fn typo_on_repeated_chars_duplicates() {
        let mut rng = StdRng::seed_from_u64(27);
        // No differing adjacent pair, only duplication applies.
        assert_eq!("aaa", generate_typo("aa", &mut rng));
    }

    #[test]
    fn shuffle_words_changes_order() {
        let mut rng = StdRng::seed_from_u64(28);
        for _ in 0..20 {
            let out = shuffle_words("one two three", &mut rng);
            assert_ne!("one two three", out);
            let mut words: Vec<&str> = out.split(' ').collect();
            words.sort_unstable();
            assert_eq!(vec!["one", "three", "two"], words);
        }
    }

    #[test]
    fn shuffle_words_single_word_unchanged() {
        let mut rng = StdRng::seed_from_u64(29);
        assert_eq!("word", shuffle_words("word", &mut rng));
    }

    #[test]
    fn change_format_replaces_all_occurrences() {
        let mut rng = StdRng::seed_from_u64(30);
        for _ in 0..50 {
            let out = change_format("a_b_c", &mut rng);
            assert_ne!("a_b_c", out);
            assert!(!out.contains('_'));
            assert_eq!(5, out.chars().count());
        }
    }

    #[test]
    fn change_format_without_symbols_unchanged() {
        let mut rng = StdRng::seed_from_u64(31);
        assert_eq!("abc", change_format("abc", &mut rng));
    }

    #[test]
    fn abbreviate_random_keeps_prefix() {
        let mut rng = StdRng::seed_from_u64(32);
        for _ in 0..50 {
            let out = abbreviate_random("customer", &mut rng);
            assert!(out.ends_with('.'));
            assert!("customer".starts_with(out.trim_end_matches('.')));
            assert_ne!("customer", out);
        }
    }

    #[test]
    fn add_random_prefix_always_differs() {
        let mut rng = StdRng::seed_from_u64(33);
        for _ in 0..50 {
            let out = add_random_prefix("name", &mut rng);
            assert!(out.ends_with("_name"));
            assert_ne!("name", out);
        }
    }

    #[test]
    fn random_name_in_length_range() {
        let mut rng = StdRng::seed_from_u64(34);
        for _ in 0..100 {
            let name = random_name(&mut rng);
            assert!((4..=12).contains(&name.len()));
            assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn predicates() {
        assert!(contains_vowel("xyzu"));
        assert!(!contains_vowel("xyz"));
        assert!(has_multiple_words("a b"));
        assert!(!has_multiple_words("a_b"));
        assert!(has_ocr_confusable("S"));
        assert!(!has_ocr_confusable("and"));
        assert!(has_phonetic_confusable("Fun"));
        assert!(!has_phonetic_confusable("uae"));
        assert!(has_keyboard_confusable("hi"));
        assert!(!has_keyboard_confusable("123"));
        assert!(has_format_symbol("a-b"));
        assert!(!has_format_symbol("ab"));
    }
}
