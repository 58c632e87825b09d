use lazy_static::lazy_static;
use regex::Regex;

/// Generic institutional words that carry no identifying signal in a center name.
const COMMON_WORDS: &[&str] = &[
    "secondary",
    "school",
    "model",
    "high",
    "academy",
    "college",
    "grammar",
    "technical",
    "international",
    "primary",
    "institution",
    "basic",
    "nursery",
    "junior",
    "senior",
    "university",
    "polytechnic",
    "education",
    "center",
    "centre",
];

/// Tokens no longer than this are dropped from names.
const MIN_TOKEN_LEN: usize = 3;

lazy_static! {
    // Street-type words, optionally abbreviated with a trailing period. ASCII
    // word boundaries, so accented letters count as separators.
    static ref STREET_TYPE: Regex = Regex::new(
        r"(?-u:\b)(?:street|st|road|rd|avenue|ave|boulevard|blvd|lane|ln|drive|dr)(?-u:\b)\.?"
    )
    .unwrap();
}

#[inline]
fn blank_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

///
/// Canonical form of a center name used for exact and fuzzy comparison.
///
/// Lowercases, turns punctuation into spaces and keeps only tokens that are
/// at least three characters long and not in the common-word list. Returns an
/// empty string when nothing survives.
///
pub fn clean_name(name: Option<&str>) -> String {
    let lowered = name.unwrap_or_default().to_lowercase();
    blank_punctuation(&lowered)
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .filter(|token| !COMMON_WORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical form of an address: street-type words removed, punctuation blanked,
/// whitespace collapsed.
pub fn normalize_address(address: Option<&str>) -> String {
    let lowered = address.unwrap_or_default().to_lowercase();
    let stripped = STREET_TYPE.replace_all(&lowered, " ");
    blank_punctuation(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
