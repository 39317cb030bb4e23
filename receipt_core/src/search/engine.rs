use crate::aggregate::{AggregateFunction, AggregateOutput, AggregateParams, AggregationEngine};
use crate::error::EngineError;
use crate::models::FieldAccess;
use crate::search::similarity::similarity;
use crate::search::{SearchMatch, SearchParams, SearchStrategy};
use crate::sort::{SortAlgorithm, SortEngine};
use regex::RegexBuilder;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct SearchEngine {
    fuzzy_threshold: f64,
    sort_engine: SortEngine,
    aggregation_engine: AggregationEngine,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl SearchEngine {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self {
            fuzzy_threshold,
            sort_engine: SortEngine::default(),
            aggregation_engine: AggregationEngine::default(),
        }
    }

    pub fn with_sort_engine(mut self, sort_engine: SortEngine) -> Self {
        self.sort_engine = sort_engine;
        self
    }

    pub fn with_aggregation_engine(mut self, aggregation_engine: AggregationEngine) -> Self {
        self.aggregation_engine = aggregation_engine;
        self
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Returns the records matching `params` under the selected strategy.
    ///
    /// Input records are cloned into the result, never modified. Only fuzzy
    /// search attaches a similarity score.
    pub fn search<R>(&self, records: &[R], params: &SearchParams) -> Vec<SearchMatch<R>>
    where
        R: FieldAccess + Clone,
    {
        debug!("Executing {} search on '{}' over {} records", params.strategy, params.field, records.len());

        let field = params.field.as_str();
        let matches = match params.strategy {
            SearchStrategy::Linear => linear_search(records, &params.query, field),
            SearchStrategy::Binary => binary_search(records, &params.query, field),
            SearchStrategy::Hash => hash_search(records, &params.query, field),
            SearchStrategy::Fuzzy => {
                let threshold = params.threshold.unwrap_or(self.fuzzy_threshold);
                fuzzy_search(records, &params.query, field, threshold)
            }
            SearchStrategy::Range => range_search(records, params.min_value, params.max_value, field),
            SearchStrategy::Pattern => {
                let expression = params.pattern.as_deref().unwrap_or(&params.query);
                pattern_search(records, expression, field)
            }
        };

        debug!("{} search matched {} records", params.strategy, matches.len());
        matches
    }

    pub fn sort<R>(
        &self,
        records: &[R],
        field: &str,
        algorithm: SortAlgorithm,
        descending: bool,
    ) -> Result<Vec<R>, EngineError>
    where
        R: FieldAccess + Clone,
    {
        self.sort_engine.sort(records, field, algorithm, descending)
    }

    pub fn aggregate<R: FieldAccess>(
        &self,
        records: &[R],
        field: &str,
        function: AggregateFunction,
        params: &AggregateParams,
    ) -> Result<AggregateOutput, EngineError> {
        self.aggregation_engine.aggregate(records, field, function, params)
    }
}

fn linear_search<R: FieldAccess + Clone>(records: &[R], query: &str, field: &str) -> Vec<SearchMatch<R>> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.field_text(field).to_lowercase().contains(&query))
        .map(|r| SearchMatch::new(r.clone()))
        .collect()
}

/// Bisects a copy sorted by the lower-cased field and expands around the first
/// hit while neighbours still contain the query. Matches that are not
/// contiguous with that hit in sorted order are not found.
fn binary_search<R: FieldAccess + Clone>(records: &[R], query: &str, field: &str) -> Vec<SearchMatch<R>> {
    let mut sorted: Vec<(String, &R)> = records
        .iter()
        .map(|r| (r.field_text(field).to_lowercase(), r))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let query = query.to_lowercase();
    let mut hits = Vec::new();
    bisect(&sorted, &query, 0, sorted.len() as isize - 1, &mut hits);

    hits.into_iter().map(|i| SearchMatch::new(sorted[i].1.clone())).collect()
}

fn bisect<R>(sorted: &[(String, &R)], query: &str, left: isize, right: isize, hits: &mut Vec<usize>) {
    if left > right {
        return;
    }

    let mid = ((left + right) / 2) as usize;
    let value = sorted[mid].0.as_str();

    if value.contains(query) {
        hits.push(mid);

        let mut i = mid;
        while i > 0 && sorted[i - 1].0.contains(query) {
            i -= 1;
            hits.push(i);
        }

        let mut i = mid + 1;
        while i < sorted.len() && sorted[i].0.contains(query) {
            hits.push(i);
            i += 1;
        }
    } else if query < value {
        bisect(sorted, query, left, mid as isize - 1, hits);
    } else {
        bisect(sorted, query, mid as isize + 1, right, hits);
    }
}

fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[derive(PartialEq, Eq, Hash)]
enum DedupKey {
    Id(String),
    Position(usize),
}

/// Indexes the whole lower-cased value and each of its words. A query hits
/// only when it equals one of those exactly.
fn hash_search<R: FieldAccess + Clone>(records: &[R], query: &str, field: &str) -> Vec<SearchMatch<R>> {
    let mut index: HashMap<u64, Vec<usize>> = HashMap::new();

    for (pos, record) in records.iter().enumerate() {
        let value = record.field_text(field).to_lowercase();
        index.entry(content_hash(&value)).or_default().push(pos);
        for word in value.split_whitespace() {
            index.entry(content_hash(word)).or_default().push(pos);
        }
    }

    let Some(positions) = index.get(&content_hash(&query.to_lowercase())) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    positions
        .iter()
        .filter(|&&pos| {
            let key = records[pos]
                .record_key()
                .map(DedupKey::Id)
                .unwrap_or(DedupKey::Position(pos));
            seen.insert(key)
        })
        .map(|&pos| SearchMatch::new(records[pos].clone()))
        .collect()
}

fn fuzzy_search<R: FieldAccess + Clone>(
    records: &[R],
    query: &str,
    field: &str,
    threshold: f64,
) -> Vec<SearchMatch<R>> {
    let query = query.to_lowercase();

    let mut matches: Vec<SearchMatch<R>> = records
        .iter()
        .filter_map(|r| {
            let score = similarity(&query, &r.field_text(field).to_lowercase());
            (score >= threshold).then(|| SearchMatch::new(r.clone()).with_similarity(score))
        })
        .collect();

    // Stable sort: equal scores keep input order.
    matches.sort_by(|a, b| {
        let a = a.similarity_score.unwrap_or(0.0);
        let b = b.similarity_score.unwrap_or(0.0);
        b.total_cmp(&a)
    });

    matches
}

fn range_search<R: FieldAccess + Clone>(
    records: &[R],
    min_value: Option<f64>,
    max_value: Option<f64>,
    field: &str,
) -> Vec<SearchMatch<R>> {
    records
        .iter()
        .filter(|r| match r.field(field).and_then(|v| v.as_number()) {
            Some(value) => {
                min_value.map_or(true, |min| value >= min) && max_value.map_or(true, |max| value <= max)
            }
            None => false,
        })
        .map(|r| SearchMatch::new(r.clone()))
        .collect()
}

fn pattern_search<R: FieldAccess + Clone>(records: &[R], expression: &str, field: &str) -> Vec<SearchMatch<R>> {
    let regex = match RegexBuilder::new(expression).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(e) => {
            warn!("Invalid search pattern '{}': {}", expression, e);
            return Vec::new();
        }
    };

    records
        .iter()
        .filter(|r| regex.is_match(&r.field_text(field)))
        .map(|r| SearchMatch::new(r.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Receipt;
    use serde_json::{json, Map, Value};

    fn receipts() -> Vec<Receipt> {
        vec![
            Receipt::new(1, "Whole Foods Market", "2024-01-05", 54.2).with_category("Groceries"),
            Receipt::new(2, "Starbucks", "2024-01-06", 6.75).with_category("Dining"),
            Receipt::new(3, "Shell", "2024-01-09", 40.0).with_category("Fuel"),
            Receipt::new(4, "Starbuck", "2024-02-01", 5.0).with_category("Dining"),
            Receipt::new(5, "Target", "2024-02-14", 10.0).with_category("Shopping"),
            Receipt::new(6, "Trader Joe's", "2024-02-20", 15.0).with_category("Groceries"),
        ]
    }

    fn ids(matches: &[SearchMatch<Receipt>]) -> Vec<u64> {
        matches.iter().map(|m| m.record.id).collect()
    }

    fn run(params: SearchParams) -> Vec<SearchMatch<Receipt>> {
        SearchEngine::default().search(&receipts(), &params)
    }

    #[test]
    fn test_linear_is_case_insensitive_substring() {
        let matches = run(SearchParams::new("STAR"));
        assert_eq!(ids(&matches), vec![2, 4]);
        assert!(matches.iter().all(|m| m.similarity_score.is_none()));
    }

    #[test]
    fn test_linear_empty_query_returns_everything() {
        assert_eq!(run(SearchParams::new("")).len(), 6);
    }

    #[test]
    fn test_binary_finds_contiguous_cluster() {
        let params = SearchParams::new("starbuck").with_strategy(SearchStrategy::Binary);
        let mut found = ids(&run(params));
        found.sort_unstable();
        assert_eq!(found, vec![2, 4]);
    }

    #[test]
    fn test_binary_empty_query_returns_everything() {
        let params = SearchParams::new("").with_strategy(SearchStrategy::Binary);
        assert_eq!(run(params).len(), 6);
    }

    #[test]
    fn test_binary_misses_non_prefix_matches_off_the_bisection_path() {
        // "market" only occurs inside "whole foods market", which sorts last;
        // bisection steers away from it because "market" sorts before "starbucks".
        let params = SearchParams::new("market").with_strategy(SearchStrategy::Binary);
        let linear = run(SearchParams::new("market"));
        assert_eq!(ids(&linear), vec![1]);
        assert!(run(params).is_empty());
    }

    #[test]
    fn test_hash_matches_whole_value_or_word() {
        let word = run(SearchParams::new("foods").with_strategy(SearchStrategy::Hash));
        assert_eq!(ids(&word), vec![1]);

        let whole = run(SearchParams::new("whole foods market").with_strategy(SearchStrategy::Hash));
        assert_eq!(ids(&whole), vec![1]);

        let partial = run(SearchParams::new("foo").with_strategy(SearchStrategy::Hash));
        assert!(partial.is_empty());
    }

    #[test]
    fn test_hash_deduplicates_by_identifier() {
        let records = vec![Receipt::new(9, "shell shell", "2024-01-01", 1.0)];
        let params = SearchParams::new("shell").with_strategy(SearchStrategy::Hash);
        let matches = SearchEngine::default().search(&records, &params);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_hash_keeps_records_without_identifier_apart() {
        let rows: Vec<Map<String, Value>> = vec![json!({"vendor": "Aldi"}), json!({"vendor": "aldi"})]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        let params = SearchParams::new("ALDI").with_strategy(SearchStrategy::Hash);
        assert_eq!(SearchEngine::default().search(&rows, &params).len(), 2);
    }

    #[test]
    fn test_fuzzy_orders_by_similarity() {
        let params = SearchParams::new("starbucks").with_strategy(SearchStrategy::Fuzzy);
        let matches = run(params);
        assert_eq!(ids(&matches), vec![2, 4]);
        assert_eq!(matches[0].similarity_score, Some(1.0));
        assert!((matches[1].similarity_score.unwrap() - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_threshold_extremes() {
        let all = run(SearchParams::new("shell").with_strategy(SearchStrategy::Fuzzy).with_threshold(0.0));
        assert_eq!(all.len(), 6);
        let scores: Vec<f64> = all.iter().map(|m| m.similarity_score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(scores.iter().all(|s| *s >= 0.0));

        let exact = run(SearchParams::new("SHELL").with_strategy(SearchStrategy::Fuzzy).with_threshold(1.0));
        assert_eq!(ids(&exact), vec![3]);
    }

    #[test]
    fn test_fuzzy_does_not_touch_input() {
        let records = receipts();
        let before = records.clone();
        let params = SearchParams::new("target").with_strategy(SearchStrategy::Fuzzy);
        let _ = SearchEngine::default().search(&records, &params);
        assert_eq!(records, before);
    }

    #[test]
    fn test_fuzzy_uses_configured_threshold() {
        let engine = SearchEngine::new(0.1);
        let params = SearchParams::new("shel").with_strategy(SearchStrategy::Fuzzy);
        assert!(engine.search(&receipts(), &params).len() > 1);
    }

    #[test]
    fn test_range_with_open_upper_bound() {
        let records = vec![
            Receipt::new(1, "A", "2024-01-01", 5.0),
            Receipt::new(2, "B", "2024-01-01", 10.0),
            Receipt::new(3, "C", "2024-01-01", 15.0),
        ];
        let params = SearchParams::new("")
            .with_strategy(SearchStrategy::Range)
            .with_field("amount")
            .with_range(Some(10.0), None);
        let matches = SearchEngine::default().search(&records, &params);
        assert_eq!(matches.iter().map(|m| m.record.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_range_is_inclusive_and_skips_non_numeric() {
        let params = SearchParams::new("")
            .with_strategy(SearchStrategy::Range)
            .with_field("amount")
            .with_range(Some(6.75), Some(40.0));
        assert_eq!(ids(&run(params)), vec![2, 3, 5, 6]);

        let text_field = SearchParams::new("")
            .with_strategy(SearchStrategy::Range)
            .with_field("vendor")
            .with_range(Some(0.0), None);
        assert!(run(text_field).is_empty());
    }

    #[test]
    fn test_range_without_bounds_keeps_numeric_records() {
        let params = SearchParams::new("").with_strategy(SearchStrategy::Range).with_field("amount");
        assert_eq!(run(params).len(), 6);
    }

    #[test]
    fn test_pattern_search() {
        let params = SearchParams::new("^s(tar|hell)").with_strategy(SearchStrategy::Pattern);
        assert_eq!(ids(&run(params)), vec![2, 3, 4]);

        let explicit = SearchParams::new("ignored")
            .with_strategy(SearchStrategy::Pattern)
            .with_pattern("joe's$");
        assert_eq!(ids(&run(explicit)), vec![6]);
    }

    #[test]
    fn test_invalid_pattern_yields_no_results() {
        let params = SearchParams::new("(unclosed").with_strategy(SearchStrategy::Pattern);
        assert!(run(params).is_empty());
    }

    #[test]
    fn test_pattern_empty_query_returns_everything() {
        let params = SearchParams::new("").with_strategy(SearchStrategy::Pattern);
        assert_eq!(run(params).len(), 6);
    }

    #[test]
    fn test_hash_empty_query_matches_only_empty_values() {
        assert!(run(SearchParams::new("").with_strategy(SearchStrategy::Hash)).is_empty());

        let mut records = receipts();
        records.push(Receipt::new(7, "", "2024-03-01", 2.0));
        let params = SearchParams::new("").with_strategy(SearchStrategy::Hash);
        let matches = SearchEngine::default().search(&records, &params);
        assert_eq!(ids(&matches), vec![7]);
    }

    #[test]
    fn test_fuzzy_empty_query() {
        let default_threshold = SearchParams::new("").with_strategy(SearchStrategy::Fuzzy);
        assert!(run(default_threshold).is_empty());

        let zero = SearchParams::new("").with_strategy(SearchStrategy::Fuzzy).with_threshold(0.0);
        let matches = run(zero);
        assert_eq!(ids(&matches), vec![1, 2, 3, 4, 5, 6]);
        assert!(matches.iter().all(|m| m.similarity_score == Some(0.0)));
    }

    #[test]
    fn test_range_ignores_query() {
        let bounded = |query: &str| {
            SearchParams::new(query)
                .with_strategy(SearchStrategy::Range)
                .with_field("amount")
                .with_range(Some(10.0), Some(50.0))
        };
        assert_eq!(ids(&run(bounded(""))), vec![3, 5, 6]);
        assert_eq!(ids(&run(bounded("starbucks"))), vec![3, 5, 6]);
    }

    #[test]
    fn test_whole_amounts_match_their_decimal_text() {
        let exact = SearchParams::new("10.0").with_field("amount");
        assert_eq!(ids(&run(exact)), vec![5]);

        let hashed = SearchParams::new("40.0")
            .with_strategy(SearchStrategy::Hash)
            .with_field("amount");
        assert_eq!(ids(&run(hashed)), vec![3]);

        let pattern = SearchParams::new(r"^\d+\.0$")
            .with_strategy(SearchStrategy::Pattern)
            .with_field("amount");
        assert_eq!(ids(&run(pattern)), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_pass_throughs() {
        let engine = SearchEngine::default();
        let sorted = engine.sort(&receipts(), "amount", SortAlgorithm::Heapsort, false).unwrap();
        assert_eq!(sorted.first().unwrap().id, 4);

        let total = engine
            .aggregate(&receipts(), "amount", AggregateFunction::Sum, &AggregateParams::new())
            .unwrap();
        assert!((total.as_scalar().unwrap() - 130.95).abs() < 1e-9);
    }
}
