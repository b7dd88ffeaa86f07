use serde::Serialize;

use crate::lexicon::{Lexicon, LexiconEntry};

/// Contrast label used when a matched entry carries no antonym at all.
pub const FALLBACK_CONTRAST_LABEL: &str = "다른 결의 키워드";
/// Primary keyword shown for empty input.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "Cloud Dancer";
pub const MAX_KEYWORD_CHIPS: usize = 4;

/// Everything the two searches need, derived from the raw text alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedQuery {
    pub primary_keyword: String,
    /// Empty when no contrast concept was found.
    pub contrast_keyword: String,
    pub close_query: String,
    pub contrast_query: String,
    pub keyword_chips: Vec<String>,
}

impl ResolvedQuery {
    /// Identity of a search round.
    pub fn query_pair(&self) -> (String, String) {
        (self.close_query.clone(), self.contrast_query.clone())
    }

    /// True when the contrast slot can reuse the close result.
    pub fn is_single_query(&self) -> bool {
        self.close_query == self.contrast_query
    }
}

pub struct QueryResolver<'a> {
    lexicon: &'a Lexicon,
}

impl Default for QueryResolver<'static> {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}

impl<'a> QueryResolver<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn resolve(&self, raw_text: &str) -> ResolvedQuery {
        match self.lexicon.match_term(raw_text) {
            Some(entry) => Self::resolve_entry(entry),
            None => Self::resolve_unmatched(raw_text),
        }
    }

    fn resolve_entry(entry: &LexiconEntry) -> ResolvedQuery {
        let contrast_keyword = entry
            .antonym
            .filter(|a| !a.is_empty())
            .or(entry.secondary_antonym.filter(|a| !a.is_empty()))
            .unwrap_or(FALLBACK_CONTRAST_LABEL);

        let keyword_chips = [
            Some(entry.term),
            Some(entry.descriptor),
            entry.antonym,
            entry.secondary_antonym,
        ]
        .into_iter()
        .flatten()
        .filter(|chip| !chip.is_empty())
        .take(MAX_KEYWORD_CHIPS)
        .map(str::to_string)
        .collect();

        ResolvedQuery {
            primary_keyword: entry.term.to_string(),
            contrast_keyword: contrast_keyword.to_string(),
            close_query: with_descriptor(entry.term, entry.descriptor),
            contrast_query: with_descriptor(contrast_keyword, entry.descriptor),
            keyword_chips,
        }
    }

    fn resolve_unmatched(raw_text: &str) -> ResolvedQuery {
        let trimmed = raw_text.trim();
        let primary_keyword = match trimmed.split_whitespace().next() {
            Some(token) => token,
            None if !trimmed.is_empty() => trimmed,
            None => EMPTY_TEXT_PLACEHOLDER,
        }
        .to_string();

        let keyword_chips = trimmed
            .split_whitespace()
            .filter(|token| token.chars().count() > 1)
            .take(MAX_KEYWORD_CHIPS)
            .map(str::to_string)
            .collect();

        ResolvedQuery {
            contrast_keyword: String::new(),
            close_query: primary_keyword.clone(),
            contrast_query: primary_keyword.clone(),
            primary_keyword,
            keyword_chips,
        }
    }
}

/// Resolves against the builtin lexicon.
pub fn resolve(raw_text: &str) -> ResolvedQuery {
    QueryResolver::default().resolve(raw_text)
}

fn with_descriptor(keyword: &str, descriptor: &str) -> String {
    if descriptor.is_empty() {
        keyword.to_string()
    } else {
        format!("{keyword} {descriptor}")
    }
}

#[test]
fn test_with_descriptor() {
    assert_eq!(with_descriptor("하늘", "sky"), "하늘 sky");
    assert_eq!(with_descriptor("하늘", ""), "하늘");
}
