use strsim::levenshtein;

///
/// Percentage similarity of two normalized strings, based on edit distance.
///
/// Returns 0 when either side is empty so that two records with missing names
/// or addresses never look identical. Otherwise the Levenshtein distance is
/// measured against the length of the longer string:
/// `(len(longer) - distance) * 100 / len(longer)`.
///
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (longer, shorter, longer_len) = if b_len > a_len {
        (b, a, b_len)
    } else {
        (a, b, a_len)
    };
    if longer_len == 0 {
        return 100.0;
    }
    let distance = levenshtein(longer, shorter);
    (longer_len - distance) as f64 * 100.0 / longer_len as f64
}
