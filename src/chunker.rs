//! Divides cue text into contiguous chunks, one per time split.
//!
//! Cuts prefer natural boundaries close to an even word distribution:
//! first the end of a sentence, then a clause boundary (before a
//! conjunction, or after a comma, semicolon or colon). Where no natural
//! boundary lies near the even position, the words are divided evenly,
//! earlier chunks taking the remainder.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|\\[Nn]").expect("Invalid line break pattern"));

static MARKUP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>|\{\\[^}]*\}").expect("Invalid markup pattern"));

const CONJUNCTIONS: &[&str] = &[
    "and", "but", "or", "so", "yet", "nor", "because", "although", "though", "while",
    "whereas", "however", "then", "unless",
];

const CLOSING_MARKS: &[char] = &['"', '\'', '”', '’', ')', ']', '»'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    Sentence,
    Clause,
    Plain,
}

/// Removes `<i>`-style tags and `{\an8}`-style override blocks, and turns
/// line breaks (real ones, `<br>` and `\N`) into single spaces.
pub fn clean_markup(text: &str) -> String {
    let text = LINE_BREAK_PATTERN.replace_all(text, " ");
    let text = MARKUP_PATTERN.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `text` into at most `n` non-empty chunks.
///
/// With `n == 1` the trimmed text is returned as is, inner line breaks
/// included. Otherwise chunks are rebuilt from the whitespace-separated
/// words joined by single spaces, and if there are fewer words than `n`
/// each word becomes its own chunk. Run the text through [`clean_markup`]
/// first to get single-space text either way.
pub fn chunk(text: &str, n: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if n <= 1 {
        return vec![trimmed.to_string()];
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let count = n.min(words.len());
    if count == 1 {
        return vec![trimmed.to_string()];
    }

    let cuts = cut_points(&words, count);
    let mut chunks = Vec::with_capacity(count);
    let mut from = 0;
    for to in cuts.into_iter().chain(std::iter::once(words.len())) {
        chunks.push(words[from..to].join(" "));
        from = to;
    }
    chunks
}

/// Chooses `count - 1` increasing word indices; a cut at `k` starts a new
/// chunk with `words[k]`.
fn cut_points(words: &[&str], count: usize) -> Vec<usize> {
    let total = words.len();
    let slack = total as f64 / count as f64 / 2.0;
    let mut cuts = Vec::with_capacity(count - 1);
    let mut prev = 0;

    for i in 1..count {
        let remaining_words = total - prev;
        let remaining_chunks = count - i + 1;
        let earliest = prev + 1;
        let latest = total - (count - i);
        let ideal = prev as f64 + remaining_words as f64 / remaining_chunks as f64;

        let natural = (earliest..=latest)
            .filter(|k| (*k as f64 - ideal).abs() <= slack)
            .map(|k| (boundary_at(words, k), k))
            .filter(|(kind, _)| *kind != Boundary::Plain)
            .min_by(|(kind_a, a), (kind_b, b)| {
                let dist_a = (*a as f64 - ideal).abs();
                let dist_b = (*b as f64 - ideal).abs();
                kind_a
                    .cmp(kind_b)
                    .then(dist_a.total_cmp(&dist_b))
                    .then(a.cmp(b))
            })
            .map(|(_, k)| k);

        let cut = natural.unwrap_or_else(|| {
            let even = prev + (remaining_words + remaining_chunks - 1) / remaining_chunks;
            even.clamp(earliest, latest)
        });
        cuts.push(cut);
        prev = cut;
    }

    cuts
}

fn boundary_at(words: &[&str], k: usize) -> Boundary {
    let before = words[k - 1].trim_end_matches(CLOSING_MARKS);
    if before.ends_with(['.', '!', '?', '…']) {
        return Boundary::Sentence;
    }
    if before.ends_with([',', ';', ':']) || is_conjunction(words[k]) {
        return Boundary::Clause;
    }
    Boundary::Plain
}

fn is_conjunction(word: &str) -> bool {
    let bare = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    CONJUNCTIONS.contains(&bare.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn single_chunk_returns_text_unchanged() {
        assert_eq!(chunk("I like to eat an apple", 1), vec!["I like to eat an apple"]);
        assert_eq!(chunk("  Hello\nworld ", 1), vec!["Hello\nworld"]);
    }

    #[test]
    fn splits_evenly_without_natural_boundaries() {
        assert_eq!(chunk("I like to eat an apple", 2), vec!["I like to", "eat an apple"]);
        assert_eq!(
            chunk("one two three four five six seven", 3),
            vec!["one two three", "four five", "six seven"]
        );
    }

    #[test]
    fn prefers_sentence_ends_near_the_middle() {
        assert_eq!(
            chunk("Hello there. I like apples a lot", 2),
            vec!["Hello there.", "I like apples a lot"]
        );
        assert_eq!(
            chunk("Stop! \"Who goes there?\" the guard asked loudly", 2),
            vec!["Stop! \"Who goes there?\"", "the guard asked loudly"]
        );
    }

    #[test]
    fn sentence_end_beats_a_closer_conjunction() {
        assert_eq!(
            chunk("We ran home fast. The rain fell and we laughed", 2),
            vec!["We ran home fast.", "The rain fell and we laughed"]
        );
    }

    #[test]
    fn splits_before_conjunctions() {
        assert_eq!(
            chunk("I wanted to go out but it was raining", 2),
            vec!["I wanted to go out", "but it was raining"]
        );
    }

    #[test]
    fn splits_after_commas() {
        assert_eq!(
            chunk("When the sun rose, everyone left the camp", 2),
            vec!["When the sun rose,", "everyone left the camp"]
        );
    }

    #[test]
    fn ignores_distant_natural_boundaries() {
        // The sentence end after "Hi." is too far from the middle.
        assert_eq!(
            chunk("Hi. We walked along the quiet river bank today", 2),
            vec!["Hi. We walked along the", "quiet river bank today"]
        );
    }

    #[test]
    fn never_emits_empty_chunks() {
        assert_eq!(chunk("Hello", 3), vec!["Hello"]);
        assert_eq!(chunk("Hello world", 3), vec!["Hello", "world"]);
        assert!(chunk("   ", 2).is_empty());
    }

    #[test]
    fn rejoined_chunks_reproduce_the_words() {
        let texts = [
            "Well, I never. And then, out of nowhere, a dragon appeared!",
            "a b c d e f g h i j k",
            "So... what now? We wait, or we run.",
        ];
        for text in texts {
            for n in 1..=8 {
                let chunks = chunk(text, n);
                assert!(chunks.len() <= n);
                assert!(chunks.iter().all(|c| !c.trim().is_empty()));
                let rejoined = chunks.join(" ");
                assert_eq!(words_of(&rejoined), words_of(text));
            }
        }
    }

    #[test]
    fn markup_is_removed() {
        assert_eq!(
            clean_markup("{\\an8}<i>Look out</i>, <font color=\"red\">now</font>!"),
            "Look out, now!"
        );
    }

    #[test]
    fn line_breaks_become_word_separators() {
        assert_eq!(clean_markup("<i>Hello</i><br/>world"), "Hello world");
        assert_eq!(clean_markup("Hello<BR>world"), "Hello world");
        assert_eq!(clean_markup("First line\\NSecond line"), "First line Second line");
        assert_eq!(clean_markup("Hello\n  world\r\n"), "Hello world");
    }
}
