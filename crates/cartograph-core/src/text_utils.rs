//! Text helpers shared by the catalog, aggregator, harvester and graph compiler.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static ORCID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").unwrap());

/// Normalize a title for comparison.
///
/// NFKC-composes, lowercases, trims, collapses runs of whitespace and drops
/// punctuation, so `"Assemblage  Theory!"` and `"assemblage theory"` compare equal.
pub fn normalize_title(title: &str) -> String {
    let composed: String = title.nfkc().collect();
    let lowered = composed.to_lowercase();
    let collapsed = WHITESPACE_RE.replace_all(lowered.trim(), " ");
    NON_WORD_RE.replace_all(&collapsed, "").into_owned()
}

/// Uppercased initial of every whitespace-separated word: "Manuel DeLanda" → "MD".
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Reference code for a concept: `#` plus its first three letters, uppercased.
pub fn concept_code(concept: &str) -> String {
    let head: String = concept.chars().take(3).collect();
    format!("#{}", head.to_uppercase())
}

/// All 19xx/20xx years mentioned in `text`, in order of appearance.
pub fn extract_years(text: &str) -> Vec<i32> {
    YEAR_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Whether `orcid` has the `0000-0000-0000-000X` shape.
pub fn is_valid_orcid(orcid: &str) -> bool {
    ORCID_RE.is_match(orcid)
}
