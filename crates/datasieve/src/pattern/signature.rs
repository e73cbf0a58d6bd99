//! Cell text to shape signature.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Stopwords;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static LETTER_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bt\d+\b").unwrap());
static DIGIT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bn\d+\b").unwrap());

/// Lowercase, drop stopwords, collapse whitespace, blank out `-`, `*`, `#`.
pub fn preprocess(text: &str, stopwords: &Stopwords) -> String {
    let lowered = text.to_lowercase();
    let kept: Vec<&str> = lowered
        .split_whitespace()
        .filter(|word| !stopwords.contains(word))
        .collect();
    kept.join(" ").replace(['-', '*', '#'], " ")
}

/// Maximal runs of word characters.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text).map(|m| m.as_str())
}

/// Most frequent tokens of a column, built once before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonWords {
    words: Vec<String>,
}

impl CommonWords {
    /// Select the top 10% of distinct tokens (at least one) by frequency.
    ///
    /// Bare one- and two-digit numbers are never common words. Equal counts
    /// are ordered by the token text, so row order never changes the result.
    pub fn from_texts<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for text in texts {
            for token in tokens(text).filter(|t| !is_short_number(t)) {
                *counts.entry(token).or_default() += 1;
            }
        }

        let keep = ((counts.len() as f64 * 0.1) as usize).max(1);
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        Self {
            words: ranked
                .into_iter()
                .take(keep)
                .map(|(word, _)| word.to_string())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Template symbol for one token.
pub fn symbol(token: &str, common: &CommonWords) -> String {
    if common.contains(token) {
        return "CW".to_string();
    }

    let letters = token.chars().filter(|c| c.is_alphabetic()).count();
    let digits = token.chars().filter(|c| c.is_numeric()).count();
    let total = token.chars().count();

    if letters == total {
        format!("t{}", letters)
    } else if digits == total {
        format!("n{}", digits)
    } else if letters > 0 && digits > 0 {
        format!("t{}n{}", letters, digits)
    } else {
        token.to_string()
    }
}

/// Signature of a preprocessed cell; empty when it has no tokens.
pub fn signature(text: &str, common: &CommonWords) -> String {
    let symbols: Vec<String> = tokens(text).map(|t| symbol(t, common)).collect();
    normalize(&symbols.join(" "))
}

/// Collapse standalone `t{n}` and `n{n}` markers to `tX` and `nX`.
pub fn normalize(symbols: &str) -> String {
    let letters = LETTER_MARKER.replace_all(symbols, "tX");
    DIGIT_MARKER.replace_all(&letters, "nX").into_owned()
}

fn is_short_number(token: &str) -> bool {
    token.len() <= 2 && token.bytes().all(|b| b.is_ascii_digit())
}
