//! Typo-tolerant fuzzy matching for file names.
//!
//! This crate provides the scoring core used by global search:
//! - Tokenization of names into normalized sub-words
//! - Edit-distance similarity with optional transposition tolerance
//! - A match engine that scores and thresholds candidate names against a query

pub mod engine;
pub mod similarity;
pub mod tokenizer;

// Re-export main types
pub use engine::{
    base_name, normalize, passes_threshold, round_score, score, score_tokens, MatchEngine,
    MatchOptions, ScoredMatch, EXACT_MATCH_SCORE, SCORE_THRESHOLD,
};
pub use similarity::{edit_distance, is_close_match, similarity, SimilarityOptions};
pub use tokenizer::{tokenize, TokenizeOptions};
