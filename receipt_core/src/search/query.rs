use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    #[default]
    Linear,
    Binary,
    Hash,
    Fuzzy,
    Range,
    Pattern,
}

impl SearchStrategy {
    pub const ALL: [SearchStrategy; 6] = [
        SearchStrategy::Linear,
        SearchStrategy::Binary,
        SearchStrategy::Hash,
        SearchStrategy::Fuzzy,
        SearchStrategy::Range,
        SearchStrategy::Pattern,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::Linear => "linear",
            SearchStrategy::Binary => "binary",
            SearchStrategy::Hash => "hash",
            SearchStrategy::Fuzzy => "fuzzy",
            SearchStrategy::Range => "range",
            SearchStrategy::Pattern => "pattern",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SearchStrategy::Linear => "O(n) - Simple sequential search",
            SearchStrategy::Binary => "O(log n) - Binary search on sorted data",
            SearchStrategy::Hash => "O(1) average - Hash-based fast lookup",
            SearchStrategy::Fuzzy => "O(n*m) - Approximate string matching",
            SearchStrategy::Range => "O(n) - Numeric range queries",
            SearchStrategy::Pattern => "O(n) - Regex pattern matching",
        }
    }

    /// Name and description of every strategy, in declaration order.
    pub fn catalog() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|s| (s.name(), s.description())).collect()
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchStrategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| EngineError::UnsupportedStrategy(s.to_string()))
    }
}

/// Everything one search call needs besides the records themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub strategy: SearchStrategy,
    pub field: String,
    /// Minimum similarity for fuzzy search; the engine default applies when unset.
    pub threshold: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Expression for pattern search; falls back to `query` when unset.
    pub pattern: Option<String>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            strategy: SearchStrategy::Linear,
            field: "vendor".to_string(),
            threshold: None,
            min_value: None,
            max_value: None,
            pattern: None,
        }
    }
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_range(mut self, min_value: Option<f64>, max_value: Option<f64>) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// A record returned by a search, paired with its similarity score when the
/// strategy computes one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch<R> {
    #[serde(flatten)]
    pub record: R,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl<R> SearchMatch<R> {
    pub fn new(record: R) -> Self {
        Self {
            record,
            similarity_score: None,
        }
    }

    pub fn with_similarity(mut self, score: f64) -> Self {
        self.similarity_score = Some(score);
        self
    }

    pub fn into_record(self) -> R {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("fuzzy".parse::<SearchStrategy>().unwrap(), SearchStrategy::Fuzzy);
        assert_eq!("range".parse::<SearchStrategy>().unwrap(), SearchStrategy::Range);
        assert_eq!(
            "semantic".parse::<SearchStrategy>(),
            Err(EngineError::UnsupportedStrategy("semantic".to_string()))
        );
    }

    #[test]
    fn test_catalog_lists_every_strategy() {
        let catalog = SearchStrategy::catalog();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog[0], ("linear", "O(n) - Simple sequential search"));
        assert!(catalog.iter().any(|(name, _)| *name == "pattern"));
    }

    #[test]
    fn test_search_params_builder() {
        let params = SearchParams::new("coffee")
            .with_strategy(SearchStrategy::Fuzzy)
            .with_field("category")
            .with_threshold(0.5);

        assert_eq!(params.query, "coffee");
        assert_eq!(params.field, "category");
        assert_eq!(params.threshold, Some(0.5));
        assert!(params.pattern.is_none());
    }
}
