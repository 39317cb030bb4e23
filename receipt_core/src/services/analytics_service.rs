use crate::{
    aggregate::{AggregateFunction, AggregateOutput, AggregateParams, AggregationEngine, TimeBucket, TimeWindow},
    config::AnalyticsConfig,
    error::Result,
    models::{AggregateRequest, Receipt, SearchRequest, SortRequest},
    search::{SearchEngine, SearchMatch, SearchParams, SearchStrategy},
    sort::{SortAlgorithm, SortEngine},
    store::ReceiptRepository,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchMatch<Receipt>>,
    pub total_count: usize,
    pub algorithm_used: SearchStrategy,
    pub execution_time_ms: f64,
    pub query_info: QueryInfo,
}

#[derive(Debug, Serialize)]
pub struct QueryInfo {
    pub query: String,
    pub field: String,
    pub threshold: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SortOutcome {
    pub results: Vec<Receipt>,
    pub algorithm_used: SortAlgorithm,
    pub execution_time_ms: f64,
    pub sort_info: SortInfo,
}

#[derive(Debug, Serialize)]
pub struct SortInfo {
    pub field: String,
    pub order: String,
}

#[derive(Debug, Serialize)]
pub struct AggregateOutcome {
    pub result: AggregateOutput,
    pub function_used: AggregateFunction,
    pub execution_time_ms: f64,
    pub aggregation_info: AggregationInfo,
}

#[derive(Debug, Serialize)]
pub struct AggregationInfo {
    pub field: String,
    pub time_field: Option<String>,
    pub window: Option<TimeWindow>,
    pub bins: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct VendorSummary {
    pub vendor: String,
    pub count: usize,
    pub total_amount: f64,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub total_amount: f64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub count: usize,
    pub total_amount: f64,
}

impl From<&TimeBucket> for MonthlyTrend {
    fn from(bucket: &TimeBucket) -> Self {
        Self {
            month: bucket.time_period.clone(),
            count: bucket.count,
            total_amount: bucket.sum,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdvancedStats {
    pub avg_receipt_amount: f64,
    pub median_receipt_amount: f64,
    pub std_dev_amount: f64,
    pub most_expensive_receipt: f64,
    pub confidence_avg: f64,
}

#[derive(Debug, Serialize)]
pub struct Statistics {
    pub total_receipts: usize,
    pub total_spend: f64,
    pub top_vendors: Vec<VendorSummary>,
    pub category_breakdown: Vec<CategorySummary>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub advanced_stats: AdvancedStats,
}

#[derive(Debug, Serialize)]
pub struct AlgorithmCatalog {
    pub search_algorithms: BTreeMap<&'static str, &'static str>,
    pub sort_algorithms: BTreeMap<&'static str, &'static str>,
    pub aggregation_functions: BTreeMap<&'static str, &'static str>,
}

const TOP_VENDOR_LIMIT: usize = 10;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Runs the engines over the repository contents. Sorting and aggregation go
/// through the search engine, which carries the configured sort and
/// aggregation engines.
#[derive(Clone)]
pub struct AnalyticsService {
    repository: Arc<dyn ReceiptRepository>,
    search_engine: SearchEngine,
    default_strategy: SearchStrategy,
    default_algorithm: SortAlgorithm,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn ReceiptRepository>) -> Self {
        Self::from_config(repository, &AnalyticsConfig::default())
    }

    pub fn from_config(repository: Arc<dyn ReceiptRepository>, config: &AnalyticsConfig) -> Self {
        let sort_engine = SortEngine::new(config.default_sort_algorithm);
        let aggregation_engine =
            AggregationEngine::new(config.histogram_bins, config.time_field.clone(), config.time_window);
        let search_engine = SearchEngine::new(config.fuzzy_threshold)
            .with_sort_engine(sort_engine.clone())
            .with_aggregation_engine(aggregation_engine);

        Self {
            repository,
            search_engine,
            default_strategy: config.default_search_strategy,
            default_algorithm: sort_engine.default_algorithm(),
        }
    }

    #[instrument(skip(self, request), fields(field = %request.field))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let strategy = match &request.algorithm {
            Some(name) => name.parse::<SearchStrategy>()?,
            None => self.default_strategy,
        };

        let mut params = SearchParams::new(request.query.clone())
            .with_strategy(strategy)
            .with_field(request.field.clone())
            .with_range(request.min_value, request.max_value);
        // Fuzzy search always runs with a threshold; report the one applied.
        let threshold = match strategy {
            SearchStrategy::Fuzzy => Some(request.threshold.unwrap_or(self.search_engine.fuzzy_threshold())),
            _ => request.threshold,
        };
        if let Some(threshold) = threshold {
            params = params.with_threshold(threshold);
        }
        if let Some(pattern) = &request.pattern {
            params = params.with_pattern(pattern.clone());
        }

        let start = Instant::now();
        let receipts = self.repository.list_all().await?;
        let results = self.search_engine.search(&receipts, &params);
        let execution_time_ms = elapsed_ms(start);

        info!(
            strategy = %strategy,
            results = results.len(),
            latency_ms = execution_time_ms,
            "search completed"
        );

        Ok(SearchOutcome {
            total_count: results.len(),
            results,
            algorithm_used: strategy,
            execution_time_ms,
            query_info: QueryInfo {
                query: request.query.clone(),
                field: request.field.clone(),
                threshold,
                min_value: request.min_value,
                max_value: request.max_value,
                pattern: request.pattern.clone(),
            },
        })
    }

    #[instrument(skip(self, request), fields(field = %request.field))]
    pub async fn sort(&self, request: &SortRequest) -> Result<SortOutcome> {
        let algorithm = match &request.algorithm {
            Some(name) => name.parse::<SortAlgorithm>()?,
            None => self.default_algorithm,
        };

        let start = Instant::now();
        let receipts = self.repository.list_all().await?;
        let results = self
            .search_engine
            .sort(&receipts, &request.field, algorithm, request.is_descending())?;
        let execution_time_ms = elapsed_ms(start);

        info!(
            algorithm = %algorithm,
            results = results.len(),
            latency_ms = execution_time_ms,
            "sort completed"
        );

        Ok(SortOutcome {
            results,
            algorithm_used: algorithm,
            execution_time_ms,
            sort_info: SortInfo {
                field: request.field.clone(),
                order: request.order.clone(),
            },
        })
    }

    #[instrument(skip(self, request), fields(field = %request.field))]
    pub async fn aggregate(&self, request: &AggregateRequest) -> Result<AggregateOutcome> {
        let function = request.function.parse::<AggregateFunction>()?;
        let window = request
            .window
            .as_deref()
            .map(str::parse::<TimeWindow>)
            .transpose()?;

        let mut params = AggregateParams::new();
        if let Some(bins) = request.bins {
            params = params.with_bins(bins);
        }
        if let Some(time_field) = &request.time_field {
            params = params.with_time_field(time_field.clone());
        }
        if let Some(window) = window {
            params = params.with_window(window);
        }

        let start = Instant::now();
        let receipts = self.repository.list_all().await?;
        let result = self
            .search_engine
            .aggregate(&receipts, &request.field, function, &params)?;
        let execution_time_ms = elapsed_ms(start);

        info!(function = %function, latency_ms = execution_time_ms, "aggregation completed");

        Ok(AggregateOutcome {
            result,
            function_used: function,
            execution_time_ms,
            aggregation_info: AggregationInfo {
                field: request.field.clone(),
                time_field: request.time_field.clone(),
                window,
                bins: request.bins,
            },
        })
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        let receipts = self.repository.list_all().await?;
        let engine = &self.search_engine;
        let scalar = |function: AggregateFunction, field: &str| -> Result<f64> {
            let output = engine.aggregate(&receipts, field, function, &AggregateParams::new())?;
            Ok(output.as_scalar().unwrap_or(0.0))
        };

        let total_spend = scalar(AggregateFunction::Sum, "amount")?;

        let mut vendors = group_by(&receipts, |r| r.vendor.as_str());
        // Stable sort keeps vendors with equal counts in name order.
        vendors.sort_by(|a, b| b.1.cmp(&a.1));
        vendors.truncate(TOP_VENDOR_LIMIT);
        let top_vendors: Vec<VendorSummary> = vendors
            .into_iter()
            .map(|(vendor, count, total_amount)| VendorSummary { vendor, count, total_amount })
            .collect();

        let category_breakdown: Vec<CategorySummary> = group_by(&receipts, |r| r.category.as_str())
            .into_iter()
            .map(|(category, count, total_amount)| CategorySummary { category, count, total_amount })
            .collect();

        let monthly_params = AggregateParams::new()
            .with_time_field("transaction_date")
            .with_window(TimeWindow::Monthly);
        let monthly_trends: Vec<MonthlyTrend> = engine
            .aggregate(&receipts, "amount", AggregateFunction::TimeSeries, &monthly_params)?
            .as_time_series()
            .map(|buckets| buckets.iter().map(MonthlyTrend::from).collect())
            .unwrap_or_default();

        let advanced_stats = AdvancedStats {
            avg_receipt_amount: scalar(AggregateFunction::Mean, "amount")?,
            median_receipt_amount: scalar(AggregateFunction::Median, "amount")?,
            std_dev_amount: scalar(AggregateFunction::StdDev, "amount")?,
            most_expensive_receipt: receipts.iter().map(|r| r.amount).fold(0.0, f64::max),
            confidence_avg: scalar(AggregateFunction::Mean, "confidence_score")?,
        };

        Ok(Statistics {
            total_receipts: receipts.len(),
            total_spend,
            top_vendors,
            category_breakdown,
            monthly_trends,
            advanced_stats,
        })
    }

    pub fn algorithm_info(&self) -> AlgorithmCatalog {
        AlgorithmCatalog {
            search_algorithms: SearchStrategy::catalog().into_iter().collect(),
            sort_algorithms: SortAlgorithm::catalog().into_iter().collect(),
            aggregation_functions: AggregateFunction::catalog().into_iter().collect(),
        }
    }
}

/// `(key, count, amount total)` per key, ordered by key.
fn group_by<'a>(receipts: &'a [Receipt], key: impl Fn(&'a Receipt) -> &'a str) -> Vec<(String, usize, f64)> {
    let mut groups: HashMap<&str, (usize, f64)> = HashMap::new();
    for receipt in receipts {
        let entry = groups.entry(key(receipt)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += receipt.amount;
    }

    let mut summaries: Vec<(String, usize, f64)> = groups
        .into_iter()
        .map(|(name, (count, total_amount))| (name.to_string(), count, total_amount))
        .collect();
    summaries.sort_by(|a, b| a.0.cmp(&b.0));
    summaries
}
