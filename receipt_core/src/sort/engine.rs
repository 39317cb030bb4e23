use crate::error::EngineError;
use crate::models::{FieldAccess, FieldValue};
use crate::sort::SortAlgorithm;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SortEngine {
    default_algorithm: SortAlgorithm,
}

impl SortEngine {
    pub fn new(default_algorithm: SortAlgorithm) -> Self {
        Self { default_algorithm }
    }

    pub fn default_algorithm(&self) -> SortAlgorithm {
        self.default_algorithm
    }

    /// Returns a new sequence ordered by `field`. The input is left untouched.
    ///
    /// Absent fields sort as the empty string. Mixing value kinds (numbers
    /// and text, say) in one field is a [`EngineError::ComparisonTypeMismatch`].
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
        let keys = sort_keys(records, field)?;
        let mut order: Vec<usize> = (0..records.len()).collect();

        match algorithm {
            SortAlgorithm::Quicksort => quicksort(&mut order, &keys, descending),
            SortAlgorithm::Mergesort => order = mergesort(&order, &keys, descending),
            SortAlgorithm::Heapsort => heapsort(&mut order, &keys, descending),
            SortAlgorithm::Adaptive => order.sort_by(|a, b| {
                let ordering = compare(&keys[*a], &keys[*b]);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }),
        }

        debug!(
            field = field,
            algorithm = %algorithm,
            descending = descending,
            records = records.len(),
            "sorted records"
        );

        Ok(order.into_iter().map(|i| records[i].clone()).collect())
    }
}

fn sort_keys<R: FieldAccess>(records: &[R], field: &str) -> Result<Vec<FieldValue>, EngineError> {
    let keys: Vec<FieldValue> = records
        .iter()
        .map(|r| r.field(field).unwrap_or_else(|| FieldValue::Text(String::new())))
        .collect();

    if let Some(first) = keys.first() {
        if let Some(other) = keys.iter().find(|k| k.kind() != first.kind()) {
            return Err(EngineError::ComparisonTypeMismatch {
                field: field.to_string(),
                left: first.kind(),
                right: other.kind(),
            });
        }
    }

    Ok(keys)
}

// Keys are homogeneous once `sort_keys` has accepted them.
fn compare(a: &FieldValue, b: &FieldValue) -> Ordering {
    a.compare(b).unwrap_or(Ordering::Equal)
}

fn quicksort(order: &mut [usize], keys: &[FieldValue], descending: bool) {
    let mut slice = order;
    // Recurse into the smaller side only so stack depth stays logarithmic.
    while slice.len() > 1 {
        let pivot = partition(slice, keys, descending);
        let (left, right) = std::mem::take(&mut slice).split_at_mut(pivot);
        let right = &mut right[1..];
        if left.len() < right.len() {
            quicksort(left, keys, descending);
            slice = right;
        } else {
            quicksort(right, keys, descending);
            slice = left;
        }
    }
}

/// Lomuto partition around the last element.
fn partition(order: &mut [usize], keys: &[FieldValue], descending: bool) -> usize {
    let high = order.len() - 1;
    let mut store = 0;

    for j in 0..high {
        let not_greater = compare(&keys[order[j]], &keys[order[high]]) != Ordering::Greater;
        if not_greater != descending {
            order.swap(store, j);
            store += 1;
        }
    }

    order.swap(store, high);
    store
}

fn mergesort(order: &[usize], keys: &[FieldValue], descending: bool) -> Vec<usize> {
    if order.len() <= 1 {
        return order.to_vec();
    }

    let mid = order.len() / 2;
    let left = mergesort(&order[..mid], keys, descending);
    let right = mergesort(&order[mid..], keys, descending);

    let mut merged = Vec::with_capacity(order.len());
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        let ordering = compare(&keys[left[i]], &keys[right[j]]);
        // Ties go to the left half in both directions.
        let take_left = if descending {
            ordering != Ordering::Less
        } else {
            ordering != Ordering::Greater
        };

        if take_left {
            merged.push(left[i]);
            i += 1;
        } else {
            merged.push(right[j]);
            j += 1;
        }
    }

    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    merged
}

fn heapsort(order: &mut [usize], keys: &[FieldValue], descending: bool) {
    let n = order.len();

    for start in (0..n / 2).rev() {
        sift_down(order, keys, start, n, descending);
    }

    for end in (1..n).rev() {
        order.swap(0, end);
        sift_down(order, keys, 0, end, descending);
    }
}

/// Max-heap when ascending, min-heap when descending.
fn sift_down(order: &mut [usize], keys: &[FieldValue], mut root: usize, end: usize, descending: bool) {
    let outranks = |a: usize, b: usize| {
        let ordering = compare(&keys[a], &keys[b]);
        if descending {
            ordering == Ordering::Less
        } else {
            ordering == Ordering::Greater
        }
    };

    loop {
        let left = 2 * root + 1;
        if left >= end {
            break;
        }

        let mut top = root;
        if outranks(order[left], order[top]) {
            top = left;
        }

        let right = left + 1;
        if right < end && outranks(order[right], order[top]) {
            top = right;
        }

        if top == root {
            break;
        }

        order.swap(root, top);
        root = top;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Receipt;
    use serde_json::{json, Map, Value};

    fn receipts() -> Vec<Receipt> {
        vec![
            Receipt::new(1, "Target", "2024-02-11", 42.0),
            Receipt::new(2, "Amazon", "2024-01-03", 17.5),
            Receipt::new(3, "Costco", "2024-03-20", 120.0),
            Receipt::new(4, "amazon", "2024-01-03", 17.5),
            Receipt::new(5, "Walmart", "2023-12-30", 0.0),
            Receipt::new(6, "Best Buy", "2024-02-11", 299.99),
            Receipt::new(7, "Costco", "2024-03-01", 42.0),
        ]
    }

    fn field_values(records: &[Receipt], field: &str) -> Vec<String> {
        records.iter().map(|r| r.field_text(field)).collect()
    }

    #[test]
    fn test_amount_ascending() {
        let engine = SortEngine::default();
        let sorted = engine.sort(&receipts(), "amount", SortAlgorithm::Quicksort, false).unwrap();
        let amounts: Vec<f64> = sorted.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![0.0, 17.5, 17.5, 42.0, 42.0, 120.0, 299.99]);
    }

    #[test]
    fn test_all_algorithms_agree() {
        let engine = SortEngine::default();
        let records = receipts();

        for field in ["vendor", "amount", "transaction_date"] {
            for descending in [false, true] {
                let reference = engine.sort(&records, field, SortAlgorithm::Adaptive, descending).unwrap();
                for algorithm in SortAlgorithm::ALL {
                    let sorted = engine.sort(&records, field, algorithm, descending).unwrap();
                    assert_eq!(
                        field_values(&sorted, field),
                        field_values(&reference, field),
                        "{} disagrees on {} (descending: {})",
                        algorithm,
                        field,
                        descending
                    );
                }
            }
        }
    }

    #[test]
    fn test_sort_is_idempotent() {
        let engine = SortEngine::default();
        for algorithm in SortAlgorithm::ALL {
            let once = engine.sort(&receipts(), "vendor", algorithm, true).unwrap();
            let twice = engine.sort(&once, "vendor", algorithm, true).unwrap();
            assert_eq!(field_values(&once, "vendor"), field_values(&twice, "vendor"));
        }
    }

    #[test]
    fn test_stable_algorithms_keep_input_order_for_ties() {
        let engine = SortEngine::default();
        for algorithm in [SortAlgorithm::Mergesort, SortAlgorithm::Adaptive] {
            for descending in [false, true] {
                let sorted = engine.sort(&receipts(), "amount", algorithm, descending).unwrap();
                let tied: Vec<u64> = sorted.iter().filter(|r| r.amount == 42.0).map(|r| r.id).collect();
                assert_eq!(tied, vec![1, 7]);
            }
        }
    }

    #[test]
    fn test_text_is_case_sensitive_lexicographic() {
        let engine = SortEngine::default();
        let sorted = engine.sort(&receipts(), "vendor", SortAlgorithm::Heapsort, false).unwrap();
        assert_eq!(sorted.first().unwrap().vendor, "Amazon");
        assert_eq!(sorted.last().unwrap().vendor, "amazon");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let engine = SortEngine::default();
        let records = receipts();
        let before = records.clone();
        let _ = engine.sort(&records, "amount", SortAlgorithm::Quicksort, true).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn test_empty_and_single() {
        let engine = SortEngine::default();
        let empty: Vec<Receipt> = Vec::new();
        for algorithm in SortAlgorithm::ALL {
            assert!(engine.sort(&empty, "amount", algorithm, false).unwrap().is_empty());
            let single = vec![Receipt::new(1, "Solo", "2024-01-01", 1.0)];
            assert_eq!(engine.sort(&single, "amount", algorithm, true).unwrap(), single);
        }
    }

    #[test]
    fn test_mixed_kinds_are_rejected() {
        let rows: Vec<Map<String, Value>> = vec![
            json!({"id": 1, "amount": 10.0}),
            json!({"id": 2, "amount": "twelve"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

        let engine = SortEngine::default();
        for algorithm in SortAlgorithm::ALL {
            let err = engine.sort(&rows, "amount", algorithm, false).unwrap_err();
            assert!(matches!(err, EngineError::ComparisonTypeMismatch { .. }));
        }
    }

    #[test]
    fn test_absent_text_field_sorts_as_empty_string() {
        let rows: Vec<Map<String, Value>> = vec![
            json!({"id": 1, "vendor": "Kroger"}),
            json!({"id": 2}),
            json!({"id": 3, "vendor": "Aldi"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

        let sorted = SortEngine::default().sort(&rows, "vendor", SortAlgorithm::Mergesort, false).unwrap();
        let ids: Vec<u64> = sorted.iter().filter_map(|r| r["id"].as_u64()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_quicksort_handles_presorted_input() {
        let records: Vec<Receipt> = (0..2000)
            .map(|i| Receipt::new(i, "Vendor", "2024-01-01", i as f64))
            .collect();
        let sorted = SortEngine::default().sort(&records, "amount", SortAlgorithm::Quicksort, true).unwrap();
        assert_eq!(sorted.first().unwrap().id, 1999);
        assert_eq!(sorted.last().unwrap().id, 0);
    }
}
