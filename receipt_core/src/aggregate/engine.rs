use crate::aggregate::{
    AggregateFunction, AggregateOutput, AggregateParams, CategoricalHistogram, FrequencyEntry, Histogram,
    NumericHistogram, TimeBucket, TimeWindow,
};
use crate::error::EngineError;
use crate::models::{FieldAccess, FieldValue};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub const DEFAULT_BINS: usize = 10;
pub const DEFAULT_TIME_FIELD: &str = "transaction_date";

#[derive(Debug, Clone)]
pub struct AggregationEngine {
    default_bins: usize,
    default_time_field: String,
    default_window: TimeWindow,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BINS, DEFAULT_TIME_FIELD, TimeWindow::default())
    }
}

impl AggregationEngine {
    pub fn new(default_bins: usize, default_time_field: impl Into<String>, default_window: TimeWindow) -> Self {
        Self {
            default_bins,
            default_time_field: default_time_field.into(),
            default_window,
        }
    }

    pub fn aggregate<R: FieldAccess>(
        &self,
        records: &[R],
        field: &str,
        function: AggregateFunction,
        params: &AggregateParams,
    ) -> Result<AggregateOutput, EngineError> {
        let output = match function {
            AggregateFunction::Sum => AggregateOutput::Scalar(numeric_values(records, field).iter().sum()),
            AggregateFunction::Mean => AggregateOutput::Scalar(mean(&numeric_values(records, field))),
            AggregateFunction::Median => AggregateOutput::Scalar(median(numeric_values(records, field))),
            AggregateFunction::Mode => AggregateOutput::Values(mode(records, field)),
            AggregateFunction::Variance => AggregateOutput::Scalar(sample_variance(&numeric_values(records, field))),
            AggregateFunction::StdDev => {
                AggregateOutput::Scalar(sample_variance(&numeric_values(records, field)).sqrt())
            }
            AggregateFunction::Histogram => {
                let bins = params.bins.unwrap_or(self.default_bins);
                if bins == 0 {
                    return Err(EngineError::InvalidParameter("bins must be at least 1".to_string()));
                }
                AggregateOutput::Histogram(histogram(records, field, bins))
            }
            AggregateFunction::TimeSeries => {
                let time_field = params.time_field.as_deref().unwrap_or(&self.default_time_field);
                let window = params.window.unwrap_or(self.default_window);
                AggregateOutput::TimeSeries(time_series(records, field, time_field, window))
            }
        };

        debug!(field = field, function = %function, records = records.len(), "aggregated records");
        Ok(output)
    }
}

/// Coerces `field` on every record, silently skipping absent or non-numeric values.
fn numeric_values<R: FieldAccess>(records: &[R], field: &str) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.field(field).and_then(|v| v.as_number()))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Sample variance (n - 1 denominator); 0.0 below two values.
fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let squared: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    squared / (values.len() - 1) as f64
}

/// Counts in order of first appearance.
fn frequency_table<I: IntoIterator<Item = String>>(values: I) -> Vec<FrequencyEntry> {
    let mut table: Vec<FrequencyEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for value in values {
        match positions.get(&value) {
            Some(&pos) => table[pos].count += 1,
            None => {
                positions.insert(value.clone(), table.len());
                table.push(FrequencyEntry { value, count: 1 });
            }
        }
    }

    table
}

fn mode<R: FieldAccess>(records: &[R], field: &str) -> Vec<String> {
    let table = frequency_table(records.iter().filter_map(|r| r.field(field)).map(|v| v.to_string()));
    let Some(top) = table.iter().map(|e| e.count).max() else {
        return Vec::new();
    };
    table.into_iter().filter(|e| e.count == top).map(|e| e.value).collect()
}

fn histogram<R: FieldAccess>(records: &[R], field: &str, bins: usize) -> Histogram {
    let present: Vec<FieldValue> = records.iter().filter_map(|r| r.field(field)).collect();
    if present.is_empty() {
        return Histogram::Numeric(NumericHistogram::empty());
    }

    let numeric: Vec<f64> = present
        .iter()
        .filter_map(|v| v.as_number())
        .filter(|v| v.is_finite())
        .collect();

    if numeric.is_empty() {
        return Histogram::Categorical(categorical_histogram(present, bins));
    }

    let min = numeric.iter().copied().fold(f64::INFINITY, f64::min);
    let max = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Histogram::Numeric(NumericHistogram {
            edges: vec![min, max],
            counts: vec![numeric.len()],
            min_value: min,
            max_value: max,
            bin_size: 0.0,
        });
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in &numeric {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    let edges = (0..=bins).map(|i| min + i as f64 * width).collect();

    Histogram::Numeric(NumericHistogram {
        edges,
        counts,
        min_value: min,
        max_value: max,
        bin_size: width,
    })
}

fn categorical_histogram(values: Vec<FieldValue>, bins: usize) -> CategoricalHistogram {
    let mut table = frequency_table(values.into_iter().map(|v| v.to_string()));
    // Stable, so ties keep first-appearance order.
    table.sort_by(|a, b| b.count.cmp(&a.count));

    let top = &table[..bins.min(table.len())];

    CategoricalHistogram {
        labels: top.iter().map(|e| e.value.clone()).collect(),
        counts: top.iter().map(|e| e.count).collect(),
        min_value: 0.0,
        max_value: table.len() as f64,
        frequency_distribution: table,
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 text.
fn parse_date(value: &FieldValue) -> Option<NaiveDate> {
    let FieldValue::Text(text) = value else {
        return None;
    };
    let text = text.trim();

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

fn bucket_key(date: NaiveDate, window: TimeWindow) -> String {
    match window {
        TimeWindow::Daily => date.format("%Y-%m-%d").to_string(),
        TimeWindow::Weekly => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            monday.format("%Y-%m-%d").to_string()
        }
        TimeWindow::Monthly => date.format("%Y-%m").to_string(),
    }
}

fn time_series<R: FieldAccess>(records: &[R], field: &str, time_field: &str, window: TimeWindow) -> Vec<TimeBucket> {
    let counting = field == time_field;
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(date) = record.field(time_field).as_ref().and_then(parse_date) else {
            dropped += 1;
            continue;
        };

        let contribution = if counting {
            Some(1.0)
        } else {
            record.field(field).and_then(|v| v.as_number())
        };

        match contribution {
            Some(value) => grouped.entry(bucket_key(date, window)).or_default().push(value),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped = dropped, time_field = time_field, "records left out of time series");
    }

    grouped
        .into_iter()
        .map(|(time_period, values)| TimeBucket {
            time_period,
            count: values.len(),
            sum: values.iter().sum(),
            mean: mean(&values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
        .collect()
}
