//! Fuzzy matching for the tool picker.
//!
//! Every field is scored on a 0..=1 scale (substring, word prefix, word
//! substring, then edit-distance similarity as a fallback) and the field
//! scores are combined with [`FieldWeights`]. Exact equality on the name,
//! shortcut or a keyword adds a bonus on top; the total is clamped to 1.0.
//!
//! ```
//! use toolbox_core::registry::all_tools;
//! use toolbox_core::search::{search, SearchOptions};
//!
//! let hits = search("bmi calculator", all_tools(), &SearchOptions::default());
//! assert_eq!(hits[0].tool.id, "bmi-calculator");
//! ```
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::registry::Tool;

const SCORE_SUBSTRING: f64 = 1.0;
const SCORE_WORD_PREFIX: f64 = 0.8;
const SCORE_WORD_SUBSTRING: f64 = 0.6;

const BONUS_EXACT_NAME: f64 = 1.0;
const BONUS_EXACT_SHORTCUT: f64 = 0.5;
const BONUS_EXACT_KEYWORD: f64 = 0.3;

pub const DEFAULT_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub name: f64,
    pub description: f64,
    pub keywords: f64,
    pub features: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: 0.4,
            description: 0.3,
            keywords: 0.2,
            features: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// Results scoring below this are dropped.
    pub threshold: f64,
    /// Maximum number of results; `None` keeps everything above the threshold.
    pub limit: Option<usize>,
    pub weights: FieldWeights,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: None,
            weights: FieldWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Name,
    Description,
    Keywords,
    Features,
    Shortcut,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<'a> {
    pub tool: &'a Tool,
    pub score: f64,
    /// Fields that matched textually (substring or word match), not just by
    /// edit distance.
    pub matched_fields: Vec<MatchedField>,
    #[serde(skip)]
    exact_name: bool,
}

/// Scores every tool against `query` and returns those above the threshold,
/// best first. An empty or whitespace-only query yields no results.
pub fn search<'a>(
    query: &str,
    tools: &'a [Tool],
    options: &SearchOptions,
) -> Vec<SearchResult<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult<'a>> = tools
        .iter()
        .map(|tool| score_tool(&query, tool, &options.weights))
        .filter(|result| result.score >= options.threshold)
        .collect();

    results.sort_by(compare_results);
    if let Some(limit) = options.limit {
        results.truncate(limit);
    }
    results
}

/// Top `limit` tool names for the search-box dropdown.
pub fn suggest(query: &str, tools: &[Tool], limit: usize) -> Vec<String> {
    let options = SearchOptions {
        limit: Some(limit),
        ..SearchOptions::default()
    };
    search(query, tools, &options)
        .into_iter()
        .map(|result| result.tool.name.to_string())
        .collect()
}

fn compare_results(a: &SearchResult<'_>, b: &SearchResult<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.exact_name.cmp(&a.exact_name))
        .then_with(|| a.tool.name.cmp(b.tool.name))
        .then_with(|| a.tool.id.cmp(b.tool.id))
}

fn score_tool<'a>(query: &str, tool: &'a Tool, weights: &FieldWeights) -> SearchResult<'a> {
    let mut matched_fields = Vec::new();

    let name = field_score(query, tool.name);
    let description = field_score(query, tool.description);
    let keywords = list_score(query, tool.keywords);
    let features = list_score(query, tool.features);

    for (field, score) in [
        (MatchedField::Name, name),
        (MatchedField::Description, description),
        (MatchedField::Keywords, keywords),
        (MatchedField::Features, features),
    ] {
        if score >= SCORE_WORD_SUBSTRING {
            matched_fields.push(field);
        }
    }

    let mut total = name * weights.name
        + description * weights.description
        + keywords * weights.keywords
        + features * weights.features;

    let exact_name = tool.name.to_lowercase() == query;
    if exact_name {
        total += BONUS_EXACT_NAME;
    }
    if tool
        .shortcut
        .is_some_and(|shortcut| shortcut.to_lowercase() == query)
    {
        total += BONUS_EXACT_SHORTCUT;
        matched_fields.push(MatchedField::Shortcut);
    }
    if tool.keywords.iter().any(|kw| kw.to_lowercase() == query) {
        total += BONUS_EXACT_KEYWORD;
    }

    SearchResult {
        tool,
        score: total.clamp(0.0, 1.0),
        matched_fields,
        exact_name,
    }
}

fn list_score(query: &str, items: &[&str]) -> f64 {
    items
        .iter()
        .map(|item| field_score(query, item))
        .fold(0.0, f64::max)
}

/// Scores a single field against an already lower-cased query.
///
/// Multi-word queries reach the word tiers when every query word matches some
/// word of the field, e.g. `"formatter json"` against `"JSON Formatter"`.
pub fn field_score(query: &str, field: &str) -> f64 {
    let field = field.to_lowercase();
    if query.is_empty() || field.is_empty() {
        return 0.0;
    }
    if field.contains(query) {
        return SCORE_SUBSTRING;
    }
    let words = split_words(&field);
    let query_words = split_words(query);
    if query_words.is_empty() {
        return similarity(query, &field);
    }
    if every_word_matches(&query_words, &words, |word, q| word.starts_with(q)) {
        return SCORE_WORD_PREFIX;
    }
    if every_word_matches(&query_words, &words, |word, q| word.contains(q)) {
        return SCORE_WORD_SUBSTRING;
    }
    similarity(query, &field)
}

fn every_word_matches(
    query_words: &[&str],
    words: &[&str],
    pred: fn(&str, &str) -> bool,
) -> bool {
    query_words
        .iter()
        .all(|q| words.iter().any(|word| pred(word, q)))
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Edit-distance similarity in 0..=1, `1 - distance / longest length`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Levenshtein distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::all_tools;

    fn opts() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn empty_query_returns_nothing() {
        assert!(search("", all_tools(), &opts()).is_empty());
        assert!(search("   ", all_tools(), &opts()).is_empty());
    }

    #[test]
    fn exact_name_scores_one_and_ranks_first() {
        let hits = search("JSON Formatter", all_tools(), &opts());
        assert_eq!(hits[0].tool.id, "json-formatter");
        assert_eq!(hits[0].score, 1.0);
        assert!(hits[0].matched_fields.contains(&MatchedField::Name));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let lower = search("stopwatch", all_tools(), &opts());
        let upper = search("STOPWATCH", all_tools(), &opts());
        assert_eq!(lower.len(), upper.len());
        for (a, b) in lower.iter().zip(upper.iter()) {
            assert_eq!(a.tool.id, b.tool.id);
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn results_are_sorted_and_above_threshold() {
        let hits = search("timer", all_tools(), &opts());
        assert!(!hits.is_empty());
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(hits.iter().all(|hit| hit.score >= DEFAULT_THRESHOLD));
    }

    #[test]
    fn shortcut_equality_matches() {
        let hits = search("pct", all_tools(), &opts());
        assert_eq!(hits[0].tool.id, "percentage-calculator");
        assert!(hits[0].matched_fields.contains(&MatchedField::Shortcut));
    }

    #[test]
    fn typo_still_finds_tool_through_edit_distance() {
        let hits = search("stopwach", all_tools(), &opts());
        assert_eq!(hits.first().map(|hit| hit.tool.id), Some("stopwatch"));
    }

    #[test]
    fn unrelated_query_is_filtered_out() {
        assert!(search("zzzzqqqq", all_tools(), &opts()).is_empty());
    }

    #[test]
    fn limit_truncates_results() {
        let options = SearchOptions {
            limit: Some(1),
            ..SearchOptions::default()
        };
        assert_eq!(search("timer", all_tools(), &options).len(), 1);
        assert_eq!(suggest("timer", all_tools(), 2).len(), 2);
    }

    #[test]
    fn custom_weights_change_ranking() {
        let tools = [
            Tool {
                id: "clock-face",
                name: "Clock Face",
                description: "",
                category: "timers",
                keywords: &[],
                features: &[],
                shortcut: None,
                path: "/tools/clock-face",
            },
            Tool {
                id: "zeta",
                name: "Zeta",
                description: "",
                category: "timers",
                keywords: &["clockwork"],
                features: &[],
                shortcut: None,
                path: "/tools/zeta",
            },
        ];
        let everything = SearchOptions {
            threshold: 0.0,
            ..SearchOptions::default()
        };
        let hits = search("clo", &tools, &everything);
        assert_eq!(hits[0].tool.id, "clock-face");
        assert!((hits[0].score - 0.4).abs() < 1e-9);
        assert!((hits[1].score - 0.2).abs() < 1e-9);

        let keyword_only: SearchOptions =
            serde_json::from_str(r#"{"threshold":0,"weights":{"name":0,"keywords":1}}"#).unwrap();
        assert_eq!(keyword_only.weights.description, 0.3);
        let hits = search("clo", &tools, &keyword_only);
        assert_eq!(hits[0].tool.id, "zeta");
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn field_score_tiers() {
        assert_eq!(field_score("json", "JSON Formatter"), 1.0);
        assert_eq!(field_score("formatter json", "JSON Formatter"), SCORE_WORD_PREFIX);
        assert_eq!(field_score("mat son", "JSON Formatter"), SCORE_WORD_SUBSTRING);
        assert!(field_score("xyz", "json formatter") < SCORE_WORD_SUBSTRING);
    }

    #[test]
    fn levenshtein_known_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
        assert_eq!(levenshtein("café", "cafe"), 1);
        assert_eq!(similarity("", ""), 1.0);
        assert!((similarity("abcd", "abce") - 0.75).abs() < 1e-9);
    }
}
