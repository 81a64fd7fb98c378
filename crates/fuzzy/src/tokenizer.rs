//! Name tokenization.
//!
//! A name is normalized into lowercase sub-word tokens:
//! 1. `camelCase` boundaries are split (`fileName` -> `file name`)
//! 2. The text is lowercased
//! 3. Digit runs are separated from everything else (`v2final` -> `v 2 final`)
//! 4. Tokens are extracted either as word/number/symbol runs (symbol mode)
//!    or as runs between common separator characters (default mode)

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").expect("camel case pattern compiles"));

static SYMBOL_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}-]+|\p{N}+|\p{P}|\p{S}+").expect("symbol token pattern compiles")
});

static WORD_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[^\s,._\-=+~"#@$^()%&*;:<>?!{|}\[\]]+"##).expect("word token pattern compiles")
});

/// Options controlling tokenization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeOptions {
    /// Keep punctuation and symbol characters as their own tokens instead of
    /// treating them as separators.
    pub match_symbols: bool,
}

/// Splits `input` into normalized tokens. Never returns empty tokens.
pub fn tokenize(input: &str, options: TokenizeOptions) -> Vec<String> {
    let split_camel = CAMEL_BOUNDARY.replace_all(input, "$1 $2");
    let lowered = split_camel.to_lowercase();
    let separated = separate_digits(&lowered);

    let pattern = if options.match_symbols {
        &*SYMBOL_TOKENS
    } else {
        &*WORD_TOKENS
    };

    pattern
        .find_iter(&separated)
        .map(|token| token.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inserts a space at every digit/non-digit transition.
fn separate_digits(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    let mut previous_is_digit: Option<bool> = None;
    for ch in value.chars() {
        let is_digit = ch.is_ascii_digit();
        if previous_is_digit.is_some_and(|previous| previous != is_digit) {
            out.push(' ');
        }
        out.push(ch);
        previous_is_digit = Some(is_digit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: TokenizeOptions = TokenizeOptions {
        match_symbols: false,
    };
    const SYMBOLS: TokenizeOptions = TokenizeOptions {
        match_symbols: true,
    };

    #[test]
    fn splits_camel_case_and_lowercases() {
        assert_eq!(tokenize("annualReport", WORDS), vec!["annual", "report"]);
        assert_eq!(tokenize("HTMLParser", WORDS), vec!["htmlparser"]);
    }

    #[test]
    fn separates_digits_from_letters() {
        assert_eq!(
            tokenize("Report2024final", WORDS),
            vec!["report", "2024", "final"]
        );
        assert_eq!(tokenize("v2", WORDS), vec!["v", "2"]);
    }

    #[test]
    fn strips_separators_in_word_mode() {
        assert_eq!(
            tokenize("annual_report-2024.pdf", WORDS),
            vec!["annual", "report", "2024", "pdf"]
        );
        assert_eq!(tokenize("(draft) [v1]", WORDS), vec!["draft", "v", "1"]);
        assert!(tokenize("._-+", WORDS).is_empty());
    }

    #[test]
    fn keeps_apostrophes_in_word_mode() {
        assert_eq!(tokenize("Don't panic", WORDS), vec!["don't", "panic"]);
    }

    #[test]
    fn emits_symbols_in_symbol_mode() {
        assert_eq!(
            tokenize("c++ notes.txt", SYMBOLS),
            vec!["c", "++", "notes", ".", "txt"]
        );
        assert_eq!(tokenize("well-known", SYMBOLS), vec!["well-known"]);
        assert_eq!(tokenize("a$b", SYMBOLS), vec!["a", "$", "b"]);
    }

    #[test]
    fn handles_non_ascii_letters() {
        assert_eq!(tokenize("ÜberDatei", WORDS), vec!["über", "datei"]);
        assert_eq!(tokenize("Отчёт 2023", SYMBOLS), vec!["отчёт", "2023"]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("", WORDS).is_empty());
        assert!(tokenize("   ", SYMBOLS).is_empty());
    }

    #[test]
    fn never_produces_empty_tokens_and_is_idempotent() {
        let inputs = [
            "annualReport_2024 (final).PDF",
            "my--file__name..txt",
            "IMG_0001.jpeg",
            "résumé café",
            "x2y3z",
            "$$$ money $$$",
            "",
        ];
        for options in [WORDS, SYMBOLS] {
            for input in inputs {
                let tokens = tokenize(input, options);
                assert!(tokens.iter().all(|token| !token.is_empty()), "{input}");
                let again = tokenize(&tokens.join(" "), options);
                assert_eq!(again, tokens, "re-tokenizing {input:?}");
            }
        }
    }
}
