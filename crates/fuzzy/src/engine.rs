//! Candidate scoring against a query.
//!
//! Each candidate name is tokenized and every candidate token takes its best
//! similarity against any query token. Close matches earn a bonus, the total is
//! capped at the candidate token count and finally normalized by the longer of
//! the two token lists. Long names therefore score lower even when several of
//! their tokens match.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::similarity::{is_close_match, similarity, SimilarityOptions};
use crate::tokenizer::{tokenize, TokenizeOptions};

/// Minimum normalized score for a candidate to be kept.
pub const SCORE_THRESHOLD: f64 = 0.2;

/// Score assigned to exact-match hits.
pub const EXACT_MATCH_SCORE: f64 = 100.0;

/// Candidate lists below this size are scored on the calling thread.
const PARALLEL_MIN_CANDIDATES: usize = 4096;

/// Options for a match run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchOptions {
    /// Treat punctuation and symbols as tokens.
    pub match_symbols: bool,
    /// Keep only names equal to the query (case-insensitive).
    pub exact_match: bool,
    /// Keep every scored candidate regardless of the threshold.
    pub keep_all_results: bool,
    /// Count adjacent transpositions as one typo.
    pub increased_typo_tolerance: bool,
}

impl MatchOptions {
    fn tokenize_options(&self) -> TokenizeOptions {
        TokenizeOptions {
            match_symbols: self.match_symbols,
        }
    }

    fn similarity_options(&self) -> SimilarityOptions {
        SimilarityOptions {
            increased_typo_tolerance: self.increased_typo_tolerance,
        }
    }
}

/// A candidate that survived matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub path: String,
    pub score: f64,
}

/// Aggregate score before normalization, capped at the candidate token count.
///
/// Close matches are counted per (candidate token, query token) pair, so one
/// candidate token that closely matches two query tokens counts twice.
pub fn score_tokens(
    candidate_tokens: &[String],
    query_tokens: &[String],
    options: SimilarityOptions,
) -> f64 {
    let mut total = 0.0;
    let mut close_matches = 0usize;

    for candidate_token in candidate_tokens {
        let token_len = candidate_token.chars().count();
        let mut best = 0.0f64;
        for query_token in query_tokens {
            let token_score = similarity(query_token, candidate_token, options);
            best = best.max(token_score);
            if is_close_match(token_score, token_len) {
                close_matches += 1;
            }
        }
        total += best;
    }

    let token_count = candidate_tokens.len() as f64;
    let boosted = match close_matches {
        0 => total,
        1 => total * 1.2,
        _ => total + token_count,
    };

    boosted.min(token_count)
}

/// Divides `score` by the longer token list (at least 1).
pub fn normalize(score: f64, candidate_len: usize, query_len: usize) -> f64 {
    let longest = candidate_len.max(query_len).max(1);
    score / longest as f64
}

/// Normalized score of a tokenized candidate against a tokenized query.
pub fn score(
    candidate_tokens: &[String],
    query_tokens: &[String],
    options: SimilarityOptions,
) -> f64 {
    let total = score_tokens(candidate_tokens, query_tokens, options);
    normalize(total, candidate_tokens.len(), query_tokens.len())
}

/// Whether a normalized score is kept.
pub fn passes_threshold(score: f64, keep_all_results: bool) -> bool {
    keep_all_results || score >= SCORE_THRESHOLD
}

/// Rounds a score to two decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Returns the final component of a `/` or `\` separated path.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        return path;
    }
    match trimmed.rfind(['/', '\\']) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// Scores candidate paths against a query using their base names.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    options: MatchOptions,
}

impl MatchEngine {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Returns every kept candidate in input order.
    pub fn search<S>(&self, candidates: &[S], query: &str) -> Vec<ScoredMatch>
    where
        S: AsRef<str> + Sync,
    {
        if self.options.exact_match {
            let query_lower = query.to_lowercase();
            return candidates
                .iter()
                .filter_map(|candidate| {
                    let path: &str = candidate.as_ref();
                    (base_name(path).to_lowercase() == query_lower).then(|| ScoredMatch {
                        path: path.to_string(),
                        score: EXACT_MATCH_SCORE,
                    })
                })
                .collect();
        }

        let query_tokens = tokenize(query, self.options.tokenize_options());
        if candidates.len() < PARALLEL_MIN_CANDIDATES {
            candidates
                .iter()
                .filter_map(|path| self.score_candidate(path.as_ref(), &query_tokens))
                .collect()
        } else {
            candidates
                .par_iter()
                .filter_map(|path| self.score_candidate(path.as_ref(), &query_tokens))
                .collect()
        }
    }

    /// Returns the `limit` best candidates, highest score first.
    ///
    /// Equal scores keep their input order.
    pub fn best<S>(&self, candidates: &[S], query: &str, limit: usize) -> Vec<ScoredMatch>
    where
        S: AsRef<str> + Sync,
    {
        let mut matches = self.search(candidates, query);
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        matches
    }

    fn score_candidate(&self, path: &str, query_tokens: &[String]) -> Option<ScoredMatch> {
        let candidate_tokens = tokenize(base_name(path), self.options.tokenize_options());
        let value = score(
            &candidate_tokens,
            query_tokens,
            self.options.similarity_options(),
        );
        passes_threshold(value, self.options.keep_all_results).then(|| ScoredMatch {
            path: path.to_string(),
            score: round_score(value),
        })
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(MatchOptions::default())
    }
}
