pub mod engine;
pub mod function;
pub mod output;

pub use engine::AggregationEngine;
pub use function::{AggregateFunction, AggregateParams, TimeWindow};
pub use output::{
    AggregateOutput, CategoricalHistogram, FrequencyEntry, Histogram, NumericHistogram, TimeBucket,
};
