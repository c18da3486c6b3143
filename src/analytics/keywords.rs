//! Tokenization and keyword ranking
//!
//! Free text is normalized (lowercase, punctuation stripped, whitespace
//! collapsed), split into tokens, filtered by length and stopwords, and
//! counted. Collections fold per-record counts by summation and rank the
//! result by count, breaking ties alphabetically.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ContentRecord, KeywordCount};
use crate::utils::normalize_whitespace;

/// Keyword -> occurrence count. Ordered so iteration is deterministic.
pub type KeywordCounts = BTreeMap<String, u64>;

/// Tokens shorter than this (in characters) are discarded by default
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

/// English and Spanish function words
const BUILTIN_STOPWORDS: &[&str] = &[
    // EN
    "the", "a", "an", "and", "or", "to", "of", "in", "for", "on", "with", "from", "by", "at",
    "as", "is", "are", "was", "were", "be", "been", "this", "that", "these", "those", "it",
    "its", "you", "your", "we", "our", "they", "their", "into", "over", "under", "up", "down",
    "out", "about", "after", "before", "between", "during", "why", "how", "what", "when",
    "where", "who", "which", "things", "one", "them", "not", "but", "can", "will", "has",
    "have", "had", "all", "more", "most", "than", "just", "so", "if", "do", "does", "my",
    // ES
    "el", "la", "los", "las", "de", "del", "y", "en", "un", "una", "unos", "unas", "por",
    "para", "con", "sin", "que", "se", "su", "sus", "al", "es", "son", "como", "mas", "más",
    "lo", "le", "les", "ya", "muy",
];

/// Set of normalized tokens excluded from keyword counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    /// An empty set: every token of sufficient length counts
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in English/Spanish function-word list
    pub fn builtin() -> Self {
        BUILTIN_STOPWORDS.iter().copied().collect()
    }

    /// Add more words, normalized the same way tokens are
    pub fn with_extra<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extend(words);
        self
    }

    /// Add words in place
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let normalized = normalize_text(word.as_ref());
            if !normalized.is_empty() {
                self.words.insert(normalized);
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::empty().with_extra(iter)
    }
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '\u{2018}' | '`')
}

/// Lowercase, strip punctuation and collapse whitespace.
///
/// Apostrophes are dropped ("Lisbon's" -> "lisbons"); any other
/// non-alphanumeric character acts as a separator ("door-to-door" -> "door to door").
pub fn normalize_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !is_apostrophe(*c))
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalize_whitespace(&cleaned)
}

/// Turns text into keyword counts
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: StopWords,
    min_token_len: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(StopWords::builtin(), DEFAULT_MIN_TOKEN_LEN)
    }
}

impl KeywordExtractor {
    /// Create an extractor
    ///
    /// # Arguments
    /// * `stopwords` - Tokens to discard
    /// * `min_token_len` - Tokens with fewer characters are discarded
    pub fn new(stopwords: StopWords, min_token_len: usize) -> Self {
        Self {
            stopwords,
            min_token_len,
        }
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    /// Tokens of `text` that survive the length and stopword filters, in order
    pub fn tokens(&self, text: &str) -> Vec<String> {
        normalize_text(text)
            .split_whitespace()
            .filter(|token| token.chars().count() >= self.min_token_len)
            .filter(|token| !self.stopwords.contains(token))
            .map(str::to_string)
            .collect()
    }

    /// Count keywords in a single text. Empty or all-stopword text gives an empty map.
    pub fn extract(&self, text: &str) -> KeywordCounts {
        let mut counts = KeywordCounts::new();
        for token in self.tokens(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Sum keyword counts over a collection, reading the field chosen by `field`
    pub fn count<'a, I, F>(&self, records: I, field: F) -> KeywordCounts
    where
        I: IntoIterator<Item = &'a ContentRecord>,
        F: Fn(&ContentRecord) -> &str,
    {
        let mut total = KeywordCounts::new();
        for record in records {
            for (keyword, count) in self.extract(field(record)) {
                *total.entry(keyword).or_insert(0) += count;
            }
        }
        total
    }

    /// Ranked top keywords over a collection
    pub fn aggregate<'a, I, F>(&self, records: I, field: F, top_k: usize) -> Vec<KeywordCount>
    where
        I: IntoIterator<Item = &'a ContentRecord>,
        F: Fn(&ContentRecord) -> &str,
    {
        rank(&self.count(records, field), top_k)
    }
}

/// Order counts by count descending, then keyword ascending, keeping `top_k`
pub fn rank(counts: &KeywordCounts, top_k: usize) -> Vec<KeywordCount> {
    let mut ranked: Vec<KeywordCount> = counts
        .iter()
        .map(|(keyword, &count)| KeywordCount::new(keyword.clone(), count))
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
    ranked.truncate(top_k);
    ranked
}

/// Title selector for [`KeywordExtractor::aggregate`]
pub fn title(record: &ContentRecord) -> &str {
    &record.title
}

/// Summary selector for [`KeywordExtractor::aggregate`]
pub fn summary(record: &ContentRecord) -> &str {
    record.summary_text()
}
