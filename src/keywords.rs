//! Keyword extraction: picks the search-worthy words of a chunk.
//!
//! Extraction is a pure function of the chunk text, the stop-word list and
//! the keyword cap: tokenize, filter, rank by length, keep the top few and
//! put them back in reading order.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Words shorter than this are never keywords (except as a last resort).
pub const MIN_KEYWORD_CHARS: usize = 3;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*").expect("Invalid word pattern")
});

const ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "can", "will", "just", "don", "don't", "should", "should've", "now", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
    "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn",
    "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't", "would", "could",
    "might", "must", "shall", "may", "among", "yet", "i'm", "i've", "i'll", "i'd", "we're",
    "we've", "they're", "let's",
];

/// A read-only set of words that never become keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Articles, pronouns, prepositions, auxiliaries and common conjunctions.
    pub fn english() -> Self {
        Self::from_words(ENGLISH_STOP_WORDS.iter().copied())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        StopWords {
            words: words
                .into_iter()
                .map(|w| normalise_apostrophes(&w.as_ref().to_lowercase()))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        StopWords {
            words: HashSet::new(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

/// Keywords of one chunk, lower-cased and de-duplicated, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new(keywords: Vec<String>) -> Self {
        KeywordSet(keywords)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The keywords by importance: longest first, earlier wins ties.
    pub fn ranked(&self) -> Vec<&str> {
        let mut ranked: Vec<&str> = self.0.iter().map(String::as_str).collect();
        // Stable sort keeps reading order among equal lengths.
        ranked.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
        ranked
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub struct KeywordExtractor<'a> {
    stop_words: &'a StopWords,
}

impl<'a> KeywordExtractor<'a> {
    pub fn new(stop_words: &'a StopWords) -> Self {
        Self { stop_words }
    }

    /// Returns at most `max_keywords` keywords; never empty for text with
    /// at least one non-whitespace character.
    pub fn extract(&self, chunk_text: &str, max_keywords: usize) -> KeywordSet {
        let max_keywords = max_keywords.max(1);
        let tokens = tokenize(chunk_text);

        let mut seen = HashSet::new();
        let candidates: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| t.chars().count() >= MIN_KEYWORD_CHARS)
            .filter(|t| !self.stop_words.contains(t))
            .filter(|t| seen.insert(*t))
            .collect();

        if candidates.is_empty() {
            return KeywordSet(fallback_keyword(chunk_text, &tokens).into_iter().collect());
        }

        let mut ranked: Vec<(usize, &str)> = candidates.into_iter().enumerate().collect();
        ranked.sort_by(|(pos_a, a), (pos_b, b)| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then(pos_a.cmp(pos_b))
        });
        ranked.truncate(max_keywords);
        ranked.sort_by_key(|(pos, _)| *pos);

        KeywordSet(ranked.into_iter().map(|(_, w)| w.to_string()).collect())
    }
}

/// Lower-cased words with punctuation stripped; inner apostrophes and
/// hyphens are kept so `don't` and `well-known` stay single words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = normalise_apostrophes(&text.to_lowercase());
    WORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The longest word regardless of stop-word status or length.
fn fallback_keyword(text: &str, tokens: &[String]) -> Option<String> {
    let longest = |words: Vec<String>| {
        words
            .into_iter()
            .enumerate()
            .max_by(|(pos_a, a), (pos_b, b)| {
                a.chars()
                    .count()
                    .cmp(&b.chars().count())
                    .then(pos_b.cmp(pos_a))
            })
            .map(|(_, w)| w)
    };

    if !tokens.is_empty() {
        return longest(tokens.to_vec());
    }
    // Nothing alphanumeric at all (e.g. "♪ ♪"); fall back to raw words.
    longest(
        text.split_whitespace()
            .map(|w| w.to_lowercase())
            .collect(),
    )
}

fn normalise_apostrophes(word: &str) -> String {
    word.replace('’', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, max: usize) -> Vec<String> {
        let stop_words = StopWords::english();
        KeywordExtractor::new(&stop_words)
            .extract(text, max)
            .as_slice()
            .to_vec()
    }

    #[test]
    fn drops_stop_words_and_short_words() {
        assert_eq!(extract("I like to", 2), vec!["like"]);
        assert_eq!(extract("eat an apple", 2), vec!["eat", "apple"]);
    }

    #[test]
    fn ranks_by_length_but_returns_reading_order() {
        // "elephant" and "running" win on length; "big" and "red" are cut.
        assert_eq!(
            extract("A big red elephant is running home", 2),
            vec!["elephant", "running"]
        );
        assert_eq!(
            extract("A big red elephant is running home", 3),
            vec!["elephant", "running", "home"]
        );
    }

    #[test]
    fn earlier_word_wins_length_ties() {
        assert_eq!(extract("cats dogs fish", 2), vec!["cats", "dogs"]);
    }

    #[test]
    fn deduplicates_case_insensitively() {
        assert_eq!(extract("Apple, apple! APPLE pie", 5), vec!["apple", "pie"]);
    }

    #[test]
    fn strips_punctuation_and_keeps_inner_apostrophes() {
        assert_eq!(
            extract("\"Rock'n'roll\" -- well-known, (really)!", 5),
            vec!["rock'n'roll", "well-known", "really"]
        );
    }

    #[test]
    fn falls_back_to_longest_word_when_everything_is_filtered() {
        assert_eq!(extract("It is what it is", 3), vec!["what"]);
        assert_eq!(extract("I", 3), vec!["i"]);
        assert_eq!(extract("♪ ♪♪", 3), vec!["♪♪"]);
    }

    #[test]
    fn whitespace_only_text_has_no_keywords() {
        assert!(extract("   ", 3).is_empty());
    }

    #[test]
    fn zero_cap_behaves_like_one() {
        assert_eq!(extract("eat an apple", 0), vec!["apple"]);
    }

    #[test]
    fn custom_stop_words_are_respected() {
        let stop_words = StopWords::from_words(["Apple"]);
        let keywords = KeywordExtractor::new(&stop_words).extract("eat an apple", 3);
        assert_eq!(keywords.as_slice(), &["eat".to_string()]);
    }

    #[test]
    fn ranked_orders_longest_first() {
        let set = KeywordSet::new(vec!["eat".into(), "apple".into(), "pie".into()]);
        assert_eq!(set.ranked(), vec!["apple", "eat", "pie"]);
    }
}
