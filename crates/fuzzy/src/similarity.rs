//! Edit-distance similarity between tokens.

use serde::{Deserialize, Serialize};

/// Options controlling the edit-distance computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityOptions {
    /// Count a swap of two adjacent characters as a single edit.
    pub increased_typo_tolerance: bool,
}

/// Levenshtein distance over Unicode scalar values.
///
/// With `increased_typo_tolerance`, adjacent transpositions cost 1 instead of 2
/// (optimal string alignment).
pub fn edit_distance(a: &str, b: &str, options: SimilarityOptions) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Transpositions look two rows back, so keep three rolling rows.
    let width = b.len() + 1;
    let mut before_previous: Vec<usize> = vec![0; width];
    let mut previous: Vec<usize> = (0..width).collect();
    let mut current: Vec<usize> = vec![0; width];

    for i in 1..=a.len() {
        current[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut distance = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);

            if options.increased_typo_tolerance
                && i > 1
                && j > 1
                && a[i - 1] == b[j - 2]
                && a[i - 2] == b[j - 1]
            {
                distance = distance.min(before_previous[j - 2] + 1);
            }

            current[j] = distance;
        }
        std::mem::swap(&mut before_previous, &mut previous);
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Similarity in `[0, 1]`: `1 - distance / max(len(a), len(b))`.
pub fn similarity(a: &str, b: &str, options: SimilarityOptions) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = edit_distance(a, b, options);
    1.0 - (distance as f64 / longest as f64)
}

/// Whether `score` is close enough for a token of `token_len` characters.
///
/// Longer tokens tolerate more typos:
/// - 1-3 chars: exact only
/// - 4-6 chars: one typo (3/4 = 75%)
/// - 7-9 chars: two typos (5/7 = 71%)
/// - 10+ chars: three typos (7/10 = 70%)
pub fn is_close_match(score: f64, token_len: usize) -> bool {
    match token_len {
        0..=3 => score == 1.0,
        4..=6 => score >= 0.75,
        7..=9 => score >= 0.71,
        _ => score >= 0.7,
    }
}
