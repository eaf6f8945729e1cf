//! Canonical drug name form and the lenient matching relation built on it.
//!
//! The two classifiers were trained on label sets with inconsistent naming
//! ("Brufen 30 Tablets" vs "brufen tablets"), so every cross-model comparison
//! in the crate goes through [`normalize_drug_name`] first. Matching is a
//! lenient heuristic (exact, then substring, then shared-word), not an
//! edit-distance algorithm; swapping it out would change verification
//! outcomes for names that only overlap on a word.

use once_cell::sync::Lazy;
use regex::Regex;

static DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("digit regex must compile"));

static DOSAGE_FORM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+(tablets?|capsules?|ml|g|mg|cream|syrup|ointment|gel|spray|solution|drops|sachets|caplets|tape|elixir|paint|mouth\s+wash|oral\s+(?:gel|drops|suspension|inhalation)|eye\s+drops|ear\s+drops)\b",
    )
    .expect("dosage form regex must compile")
});

static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation regex must compile"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));

/// Canonicalizes a raw drug name.
///
/// Lower-cases, strips digits, strips whole-word dosage-form and unit tokens
/// (tablets, ml, mg, syrup, "eye drops", ...), strips punctuation, collapses
/// whitespace, trims. `"Brufen 30 Tablets"` and `"brufen tablets"` both come
/// out as `"brufen"`.
pub fn normalize_drug_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let no_digits = DIGITS_RE.replace_all(&lowered, "");
    let no_forms = DOSAGE_FORM_RE.replace_all(&no_digits, "");
    let no_punctuation = PUNCTUATION_RE.replace_all(&no_forms, "");
    let collapsed = WHITESPACE_RE.replace_all(&no_punctuation, " ");
    collapsed.trim().to_string()
}

/// Decides whether a recognized name refers to the expected drug.
///
/// True when the normalized forms are equal, when one contains the other,
/// or when they share a word longer than two characters. Empty raw inputs
/// never match anything.
pub fn drug_names_match(recognized: &str, expected: &str) -> bool {
    if recognized.is_empty() || expected.is_empty() {
        return false;
    }

    let left = normalize_drug_name(recognized);
    let right = normalize_drug_name(expected);

    if left == right {
        return true;
    }
    if left.contains(right.as_str()) || right.contains(left.as_str()) {
        return true;
    }

    let left_words: Vec<&str> = left.split(' ').filter(|w| w.len() > 2).collect();
    let right_words: Vec<&str> = right.split(' ').filter(|w| w.len() > 2).collect();
    left_words.iter().any(|w| right_words.contains(w))
}

/// Extracts the brand word from a raw name.
///
/// Returns the first normalized word longer than two characters, falling
/// back to the whole normalized string when no word qualifies.
pub fn primary_drug_name(name: &str) -> String {
    let normalized = normalize_drug_name(name);
    normalized
        .split(' ')
        .find(|w| w.len() > 2)
        .map(str::to_string)
        .unwrap_or(normalized)
}

/// Scores how alike two names are on a `[0, 1]` scale.
///
/// 1.0 for identical normalized forms, 0.8 for containment, otherwise the
/// fraction of shared words over the longer word list. Useful for ordering
/// near-miss candidates; [`drug_names_match`] remains the yes/no authority.
pub fn name_similarity(a: &str, b: &str) -> f32 {
    let left = normalize_drug_name(a);
    let right = normalize_drug_name(b);

    if left == right {
        return 1.0;
    }
    if left.contains(right.as_str()) || right.contains(left.as_str()) {
        return 0.8;
    }

    let left_words: Vec<&str> = left.split(' ').filter(|w| w.len() > 2).collect();
    let right_words: Vec<&str> = right.split(' ').filter(|w| w.len() > 2).collect();
    if left_words.is_empty() || right_words.is_empty() {
        return 0.0;
    }

    let common = left_words
        .iter()
        .filter(|w| right_words.contains(w))
        .count();
    common as f32 / left_words.len().max(right_words.len()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_digits_forms_and_punctuation() {
        assert_eq!(normalize_drug_name("Brufen 30 Tablets"), "brufen");
        assert_eq!(normalize_drug_name("brufen tablets"), "brufen");
        assert_eq!(normalize_drug_name("Panadol-500 mg!"), "panadol");
        assert_eq!(normalize_drug_name("Otrivine ADULT Eye Drops"), "otrivine adult");
        assert_eq!(normalize_drug_name("Daktarin Oral Gel 40g"), "daktarin");
        assert_eq!(normalize_drug_name(""), "");
    }

    #[test]
    fn form_words_are_only_stripped_whole() {
        // "gel" inside a longer word stays.
        assert_eq!(normalize_drug_name("Gelusil Tape"), "gelusil");
        assert_eq!(normalize_drug_name("Creamol"), "creamol");
    }

    #[test]
    fn normalization_is_idempotent() {
        let names = [
            "Brufen 30 Tablets",
            "PAROL syrup",
            "Augmentin 1000 mg",
            "  spaced   out  ",
            "Nasonex Spray 50ml",
            "voltaren",
            "",
        ];
        for name in names {
            let once = normalize_drug_name(name);
            assert_eq!(normalize_drug_name(&once), once, "name {name:?}");
        }
    }

    #[test]
    fn matching_accepts_substring_and_shared_words() {
        assert!(drug_names_match("Parol Syrup", "PAROL"));
        assert!(drug_names_match("brufen", "Brufen 30 Tablets"));
        assert!(drug_names_match("panadol extra", "extra strength panadol"));
        assert!(!drug_names_match("brufen", "panadol"));
        assert!(!drug_names_match("", "panadol"));
        assert!(!drug_names_match("panadol", ""));
    }

    #[test]
    fn short_shared_words_do_not_match() {
        // "xl" is too short to count as overlap.
        assert!(!drug_names_match("alfa xl", "beta xl"));
    }

    #[test]
    fn primary_name_is_the_first_long_word() {
        assert_eq!(primary_drug_name("Brufen 30 tablets"), "brufen");
        assert_eq!(primary_drug_name("de icol solution"), "icol");
        assert_eq!(primary_drug_name("ab cd"), "ab cd");
    }

    #[test]
    fn similarity_ranks_exact_over_partial() {
        assert_eq!(name_similarity("Brufen", "brufen 30"), 1.0);
        assert_eq!(name_similarity("Parol Plus", "parol"), 0.8);
        let partial = name_similarity("parol night cold", "parol night flu");
        assert!(partial > 0.5 && partial < 0.8);
        assert_eq!(name_similarity("brufen", "panadol"), 0.0);
    }
}
