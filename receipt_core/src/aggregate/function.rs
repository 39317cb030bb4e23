use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunction {
    Sum,
    Mean,
    Median,
    Mode,
    Variance,
    StdDev,
    Histogram,
    TimeSeries,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 8] = [
        AggregateFunction::Sum,
        AggregateFunction::Mean,
        AggregateFunction::Median,
        AggregateFunction::Mode,
        AggregateFunction::Variance,
        AggregateFunction::StdDev,
        AggregateFunction::Histogram,
        AggregateFunction::TimeSeries,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Mean => "mean",
            AggregateFunction::Median => "median",
            AggregateFunction::Mode => "mode",
            AggregateFunction::Variance => "variance",
            AggregateFunction::StdDev => "std_dev",
            AggregateFunction::Histogram => "histogram",
            AggregateFunction::TimeSeries => "time_series",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "Sum of values",
            AggregateFunction::Mean => "Average of values",
            AggregateFunction::Median => "Median of values",
            AggregateFunction::Mode => "Most common value",
            AggregateFunction::Variance => "Variance of values",
            AggregateFunction::StdDev => "Standard deviation",
            AggregateFunction::Histogram => "Distribution histogram",
            AggregateFunction::TimeSeries => "Time-based aggregations",
        }
    }

    pub fn catalog() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|f| (f.name(), f.description())).collect()
    }
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateFunction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|function| function.name() == s)
            .ok_or_else(|| EngineError::UnsupportedFunction(s.to_string()))
    }
}

/// Calendar period a time series groups records into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Daily,
    /// Keyed by the Monday that starts the ISO week.
    Weekly,
    #[default]
    Monthly,
}

impl TimeWindow {
    pub fn name(&self) -> &'static str {
        match self {
            TimeWindow::Daily => "daily",
            TimeWindow::Weekly => "weekly",
            TimeWindow::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeWindow {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(TimeWindow::Daily),
            "weekly" => Ok(TimeWindow::Weekly),
            "monthly" => Ok(TimeWindow::Monthly),
            other => Err(EngineError::InvalidParameter(format!(
                "unknown time window '{}', expected daily, weekly or monthly",
                other
            ))),
        }
    }
}

/// Optional knobs; unset values fall back to the engine's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateParams {
    pub bins: Option<usize>,
    pub time_field: Option<String>,
    pub window: Option<TimeWindow>,
}

impl AggregateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    pub fn with_time_field(mut self, time_field: impl Into<String>) -> Self {
        self.time_field = Some(time_field.into());
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names_round_trip_through_from_str() {
        for function in AggregateFunction::ALL {
            assert_eq!(function.name().parse::<AggregateFunction>().unwrap(), function);
        }
        assert_eq!(
            "percentile".parse::<AggregateFunction>(),
            Err(EngineError::UnsupportedFunction("percentile".to_string()))
        );
    }

    #[test]
    fn test_window_parsing() {
        assert_eq!("weekly".parse::<TimeWindow>().unwrap(), TimeWindow::Weekly);
        assert!(matches!(
            "hourly".parse::<TimeWindow>(),
            Err(EngineError::InvalidParameter(_))
        ));
        assert_eq!(TimeWindow::default(), TimeWindow::Monthly);
    }
}
