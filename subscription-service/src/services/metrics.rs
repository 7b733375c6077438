//! Metrics module for subscription-service.
//! Provides Prometheus metrics for store operations and cost queries.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram, register_histogram_vec, register_int_counter_vec,
    Encoder, Histogram, HistogramVec, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "subscriptions_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Subscription CRUD operations counter
pub static SUBSCRIPTION_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Total-cost queries by outcome
pub static TOTAL_COST_QUERIES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Months scanned per total-cost query
pub static TOTAL_COST_WINDOW_MONTHS: OnceLock<Histogram> = OnceLock::new();

/// Error counter for alerting
pub static ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    SUBSCRIPTION_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "subscriptions_operations_total",
                "Total subscription operations by operation type"
            ),
            &["operation"]
        )
        .expect("Failed to register SUBSCRIPTION_OPERATIONS_TOTAL")
    });

    TOTAL_COST_QUERIES_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "subscriptions_total_cost_queries_total",
                "Total cost aggregation queries by outcome"
            ),
            &["outcome"]
        )
        .expect("Failed to register TOTAL_COST_QUERIES_TOTAL")
    });

    TOTAL_COST_WINDOW_MONTHS.get_or_init(|| {
        register_histogram!(histogram_opts!(
            "subscriptions_total_cost_window_months",
            "Number of calendar months in aggregated windows",
            vec![1.0, 3.0, 6.0, 12.0, 24.0, 60.0, 120.0, 240.0, 600.0]
        ))
        .expect("Failed to register TOTAL_COST_WINDOW_MONTHS")
    });

    ERRORS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "subscriptions_errors_total",
                "Total errors by type for alerting"
            ),
            &["error_type", "operation"]
        )
        .expect("Failed to register ERRORS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*DB_QUERY_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record a subscription CRUD operation.
pub fn record_subscription_operation(operation: &str) {
    if let Some(counter) = SUBSCRIPTION_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}

/// Record the outcome of a total-cost query.
pub fn record_total_cost_query(outcome: &str, window_months: Option<u32>) {
    if let Some(counter) = TOTAL_COST_QUERIES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
    if let (Some(histogram), Some(months)) = (TOTAL_COST_WINDOW_MONTHS.get(), window_months) {
        histogram.observe(f64::from(months));
    }
}

/// Record an error for alerting.
pub fn record_error(error_type: &str, operation: &str) {
    if let Some(counter) = ERRORS_TOTAL.get() {
        counter.with_label_values(&[error_type, operation]).inc();
    }
}
