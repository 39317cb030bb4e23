use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sorting algorithm selectable per request.
///
/// Every variant yields the same ordering of field values; they differ in
/// mechanism and stability only. `Adaptive` delegates to the standard
/// library's stable sort and is what callers get when they name nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortAlgorithm {
    Quicksort,
    Mergesort,
    Heapsort,
    #[default]
    #[serde(alias = "timsort")]
    Adaptive,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 4] = [
        SortAlgorithm::Quicksort,
        SortAlgorithm::Mergesort,
        SortAlgorithm::Heapsort,
        SortAlgorithm::Adaptive,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SortAlgorithm::Quicksort => "quicksort",
            SortAlgorithm::Mergesort => "mergesort",
            SortAlgorithm::Heapsort => "heapsort",
            SortAlgorithm::Adaptive => "adaptive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SortAlgorithm::Quicksort => "O(n log n) average - Quick sort",
            SortAlgorithm::Mergesort => "O(n log n) - Merge sort",
            SortAlgorithm::Heapsort => "O(n log n) - Heap sort",
            SortAlgorithm::Adaptive => "O(n log n) - Adaptive stable sort (default)",
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, SortAlgorithm::Mergesort | SortAlgorithm::Adaptive)
    }

    pub fn catalog() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|a| (a.name(), a.description())).collect()
    }
}

impl std::fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortAlgorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quicksort" => Ok(SortAlgorithm::Quicksort),
            "mergesort" => Ok(SortAlgorithm::Mergesort),
            "heapsort" => Ok(SortAlgorithm::Heapsort),
            "adaptive" | "timsort" => Ok(SortAlgorithm::Adaptive),
            other => Err(EngineError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_legacy_alias() {
        assert_eq!("timsort".parse::<SortAlgorithm>().unwrap(), SortAlgorithm::Adaptive);
        assert_eq!("adaptive".parse::<SortAlgorithm>().unwrap(), SortAlgorithm::Adaptive);
        assert_eq!(
            "bogosort".parse::<SortAlgorithm>(),
            Err(EngineError::UnsupportedAlgorithm("bogosort".to_string()))
        );
    }

    #[test]
    fn test_default_is_adaptive() {
        assert_eq!(SortAlgorithm::default(), SortAlgorithm::Adaptive);
        assert!(SortAlgorithm::Adaptive.is_stable());
        assert!(!SortAlgorithm::Quicksort.is_stable());
    }

    #[test]
    fn test_serde_names() {
        let parsed: SortAlgorithm = serde_json::from_str("\"timsort\"").unwrap();
        assert_eq!(parsed, SortAlgorithm::Adaptive);
        assert_eq!(serde_json::to_string(&SortAlgorithm::Heapsort).unwrap(), "\"heapsort\"");
    }
}
