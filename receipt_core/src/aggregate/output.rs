use serde::{Deserialize, Serialize};

/// Result of one aggregation call; its shape depends on the function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateOutput {
    Scalar(f64),
    Values(Vec<String>),
    Histogram(Histogram),
    TimeSeries(Vec<TimeBucket>),
}

impl AggregateOutput {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            AggregateOutput::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_values(&self) -> Option<&[String]> {
        match self {
            AggregateOutput::Values(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&Histogram> {
        match self {
            AggregateOutput::Histogram(histogram) => Some(histogram),
            _ => None,
        }
    }

    pub fn as_time_series(&self) -> Option<&[TimeBucket]> {
        match self {
            AggregateOutput::TimeSeries(buckets) => Some(buckets),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Histogram {
    Numeric(NumericHistogram),
    Categorical(CategoricalHistogram),
}

/// Equal-width buckets over `[min_value, max_value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericHistogram {
    /// Bucket edges, one more than there are buckets.
    #[serde(rename = "bins")]
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub min_value: f64,
    pub max_value: f64,
    pub bin_size: f64,
}

impl NumericHistogram {
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            counts: Vec::new(),
            min_value: 0.0,
            max_value: 0.0,
            bin_size: 0.0,
        }
    }
}

/// Most frequent distinct values of a non-numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalHistogram {
    #[serde(rename = "bins")]
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
    pub min_value: f64,
    /// Number of distinct values.
    pub max_value: f64,
    pub frequency_distribution: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub time_period: String,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}
