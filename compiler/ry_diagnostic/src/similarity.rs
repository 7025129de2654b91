//! Text similarity for the approximate line-mapping fallback.
//!
//! Only consulted when a lowered line carries no provenance span. Results
//! are always reported with [`Confidence::Approximate`](crate::Confidence).

/// Levenshtein edit distance between two strings, in characters.
///
/// ```
/// use ry_diagnostic::similarity::edit_distance;
/// assert_eq!(edit_distance("kitten", "sitting"), 3);
/// assert_eq!(edit_distance("abc", ""), 3);
/// ```
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    // Two-row optimization instead of full matrix
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Similarity ratio in `[0, 1]` between two lines, ignoring surrounding
/// whitespace. `1.0` means identical.
#[expect(
    clippy::cast_precision_loss,
    reason = "line lengths are far below f64 mantissa precision"
)]
pub fn line_ratio(a: &str, b: &str) -> f64 {
    let a = a.trim();
    let b = b.trim();
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / longest as f64
}

/// Index of the candidate most similar to `needle`, if any reaches `threshold`.
/// Ties resolve to the earliest candidate.
pub fn best_match<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    threshold: f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        if candidate.trim().is_empty() {
            continue;
        }
        let ratio = line_ratio(needle, candidate);
        if ratio >= threshold && !best.is_some_and(|(_, r)| ratio <= r) {
            best = Some((idx, ratio));
        }
    }
    best
}
