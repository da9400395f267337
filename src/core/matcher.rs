//! Lexicon matching.
//!
//! A word matches a category when, after case-folding, it equals one of the
//! category's terms, contains a term, or is contained in a term. Each category
//! contributes its weight at most once per word: the term scan for a category
//! stops at the first match. Categories are independent, so one word can
//! collect the weights of several categories.

use crate::core::lexicon::{Lexicon, LexiconEntry};
use serde::Serialize;

/// One category that matched a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMatch {
    pub category: String,
    /// The first term in the category that matched
    pub term: String,
    pub weight: u32,
}

/// Detailed result of scoring a word, for local diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub total: u32,
    /// Matched categories, sorted by name
    pub matched: Vec<CategoryMatch>,
}

/// Score a word against a lexicon.
///
/// Pure and independent of category iteration order. Empty words and empty
/// lexicons score zero.
pub fn score(word: &str, lexicon: &Lexicon) -> u32 {
    let folded = fold(word);
    if folded.is_empty() {
        return 0;
    }
    lexicon
        .entries()
        .filter(|entry| first_match(&folded, entry).is_some())
        .fold(0u32, |total, entry| total.saturating_add(entry.weight))
}

/// Score a word and report which categories matched through which term.
pub fn explain(word: &str, lexicon: &Lexicon) -> ScoreBreakdown {
    let folded = fold(word);
    if folded.is_empty() {
        return ScoreBreakdown::default();
    }

    let mut matched: Vec<CategoryMatch> = lexicon
        .entries()
        .filter_map(|entry| {
            first_match(&folded, entry).map(|term| CategoryMatch {
                category: entry.category.clone(),
                term: term.to_string(),
                weight: entry.weight,
            })
        })
        .collect();
    matched.sort_by(|a, b| a.category.cmp(&b.category));

    let total = matched
        .iter()
        .fold(0u32, |total, m| total.saturating_add(m.weight));

    ScoreBreakdown { total, matched }
}

/// First term of `entry` that matches the already-folded word.
fn first_match<'a>(folded: &str, entry: &'a LexiconEntry) -> Option<&'a str> {
    entry
        .terms
        .iter()
        .map(String::as_str)
        .find(|term| terms_match(folded, term))
}

/// Containment in either direction; equality is the degenerate case.
fn terms_match(word: &str, term: &str) -> bool {
    word == term || word.contains(term) || term.contains(word)
}

fn fold(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::from_entries([
            LexiconEntry::new("self_harm", ["hurt"], 5),
            LexiconEntry::new("violence", ["kill", "stab"], 3),
            LexiconEntry::new("threat", ["kill"], 4),
        ])
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(score("hurt", &lexicon()), 5);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score("HuRt", &lexicon()), 5);
    }

    #[test]
    fn test_word_contains_term() {
        assert_eq!(score("hurtful", &lexicon()), 5);
    }

    #[test]
    fn test_term_contains_word() {
        // "hur" is a substring of the term "hurt"
        assert_eq!(score("hur", &lexicon()), 5);
    }

    #[test]
    fn test_multiple_categories_accumulate() {
        assert_eq!(score("kill", &lexicon()), 7);
    }

    #[test]
    fn test_category_counted_once() {
        let lexicon = Lexicon::from_entries([LexiconEntry::new("v", ["kill", "ill", "k"], 3)]);
        assert_eq!(score("kill", &lexicon), 3);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(score("flower", &lexicon()), 0);
    }

    #[test]
    fn test_empty_word_and_lexicon() {
        assert_eq!(score("", &lexicon()), 0);
        assert_eq!(score("   ", &lexicon()), 0);
        assert_eq!(score("hurt", &Lexicon::empty()), 0);
    }

    #[test]
    fn test_zero_weight_category() {
        let lexicon = Lexicon::from_entries([LexiconEntry::new("muted", ["hurt"], 0)]);
        assert_eq!(score("hurt", &lexicon), 0);
    }

    #[test]
    fn test_weights_saturate() {
        let lexicon = Lexicon::from_entries([
            LexiconEntry::new("a", ["x"], u32::MAX),
            LexiconEntry::new("b", ["x"], 10),
        ]);
        assert_eq!(score("x", &lexicon), u32::MAX);
    }

    #[test]
    fn test_explain_reports_categories() {
        let breakdown = explain("Killing", &lexicon());
        assert_eq!(breakdown.total, 7);
        let categories: Vec<&str> = breakdown
            .matched
            .iter()
            .map(|m| m.category.as_str())
            .collect();
        assert_eq!(categories, vec!["threat", "violence"]);
        assert!(breakdown.matched.iter().all(|m| m.term == "kill"));
    }

    #[test]
    fn test_explain_agrees_with_score() {
        let lexicon = lexicon();
        for word in ["hurt", "kill", "stabbed", "nothing", ""] {
            assert_eq!(explain(word, &lexicon).total, score(word, &lexicon));
        }
    }

    #[test]
    fn test_bundled_lexicon_common_words_score_zero() {
        let bundled = Lexicon::load(crate::core::DEFAULT_LEXICON);
        for word in ["I", "a", "my", "it", "all", "end", "you", "back", "go", "beat", "can't"] {
            assert_eq!(explain(word, &bundled), ScoreBreakdown::default(), "{word}");
        }
        assert!(score("murdered", &bundled) > 0);
    }
}
