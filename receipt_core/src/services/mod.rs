pub mod analytics_service;

pub use analytics_service::{
    AlgorithmCatalog, AggregateOutcome, AnalyticsService, SearchOutcome, SortOutcome, Statistics,
};
