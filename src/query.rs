use crate::keywords::KeywordSet;

use serde::Serialize;

/// Order of the single-keyword fallback queries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FallbackOrder {
    /// Keywords as they appear in the text.
    #[default]
    Textual,
    /// Longest keyword first.
    Importance,
}

/// Candidate search strings for one chunk, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchQuery(Vec<String>);

impl SearchQuery {
    pub fn candidates(&self) -> &[String] {
        &self.0
    }

    /// The query covering every keyword.
    pub fn broad(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
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
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryGenerator {
    order: FallbackOrder,
    max_queries: Option<usize>,
}

impl QueryGenerator {
    pub fn new(order: FallbackOrder, max_queries: Option<usize>) -> Self {
        Self { order, max_queries }
    }

    /// The broad query joining all keywords, followed by each keyword on
    /// its own. Repeated candidates are dropped, and the broad query
    /// survives any cap.
    pub fn generate(&self, keywords: &KeywordSet) -> SearchQuery {
        if keywords.is_empty() {
            return SearchQuery::default();
        }

        let broad = keywords
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let singles: Vec<&str> = match self.order {
            FallbackOrder::Textual => keywords.iter().map(String::as_str).collect(),
            FallbackOrder::Importance => keywords.ranked(),
        };

        let mut candidates = vec![broad];
        for single in singles {
            if !candidates.iter().any(|c| c == single) {
                candidates.push(single.to_string());
            }
        }
        if let Some(max) = self.max_queries {
            candidates.truncate(max.max(1));
        }

        SearchQuery(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> KeywordSet {
        KeywordSet::new(words.iter().map(|w| w.to_string()).collect())
    }

    #[test]
    fn broad_query_comes_first() {
        let query = QueryGenerator::default().generate(&keywords(&["eat", "apple"]));
        assert_eq!(query.candidates(), &["eat apple", "eat", "apple"]);
        assert_eq!(query.broad(), Some("eat apple"));
    }

    #[test]
    fn single_keyword_yields_one_query() {
        let query = QueryGenerator::default().generate(&keywords(&["like"]));
        assert_eq!(query.candidates(), &["like"]);
    }

    #[test]
    fn importance_order_puts_longest_first() {
        let generator = QueryGenerator::new(FallbackOrder::Importance, None);
        let query = generator.generate(&keywords(&["eat", "apple", "pie"]));
        assert_eq!(query.candidates(), &["eat apple pie", "apple", "eat", "pie"]);
    }

    #[test]
    fn cap_keeps_the_broad_query() {
        let set = keywords(&["quiet", "river", "bank"]);
        let capped = QueryGenerator::new(FallbackOrder::Textual, Some(2)).generate(&set);
        assert_eq!(capped.candidates(), &["quiet river bank", "quiet"]);
        let minimal = QueryGenerator::new(FallbackOrder::Textual, Some(0)).generate(&set);
        assert_eq!(minimal.candidates(), &["quiet river bank"]);
    }

    #[test]
    fn no_keywords_no_queries() {
        assert!(QueryGenerator::default().generate(&KeywordSet::default()).is_empty());
    }
}
