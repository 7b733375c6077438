//! Period cost aggregation.
//!
//! A subscription is billed its full monthly cost for every calendar month of
//! the query window in which it is active; there is no proration by day.

use crate::models::{CalendarMonth, CostCandidate, Period, SubscriptionFilter};
use crate::services::metrics::record_total_cost_query;
use crate::services::store::SubscriptionStore;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("subscription store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
}

impl From<AggregationError> for AppError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::InvalidPeriod(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            AggregationError::StoreUnavailable(e) => AppError::DatabaseError(e),
        }
    }
}

/// Window bounds as received from the caller, plus the owner/service filter.
#[derive(Debug, Clone)]
pub struct TotalCostQuery {
    pub filter: SubscriptionFilter,
    pub start_month: i32,
    pub start_year: i32,
    pub end_month: i32,
    pub end_year: i32,
}

impl TotalCostQuery {
    /// Validates the bounds and builds the closed month window.
    pub fn period(&self) -> Result<Period, AggregationError> {
        let invalid = |e: crate::models::MonthError| AggregationError::InvalidPeriod(e.to_string());
        let start = CalendarMonth::new(self.start_year, self.start_month).map_err(invalid)?;
        let end = CalendarMonth::new(self.end_year, self.end_month).map_err(invalid)?;

        Period::new(start, end).ok_or_else(|| {
            AggregationError::InvalidPeriod(format!("period end {end} is before start {start}"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalCost {
    pub total_cost_rub: i64,
    pub period: Period,
}

/// Sums `cost_rub` once per month of `period` each candidate is active in.
pub fn sum_costs(candidates: &[CostCandidate], period: &Period) -> i64 {
    candidates
        .iter()
        .map(|c| {
            let months = period.overlap_months(c.start_month, c.end_month);
            i64::from(c.cost_rub) * i64::from(months)
        })
        .sum()
}

/// Answers total-cost queries from a point-in-time read of the store.
#[derive(Clone)]
pub struct CostAggregator {
    store: Arc<dyn SubscriptionStore>,
}

impl CostAggregator {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, query), fields(
        user_id = ?query.filter.user_id,
        service_name = ?query.filter.service_name,
    ))]
    pub async fn total_cost(&self, query: &TotalCostQuery) -> Result<TotalCost, AggregationError> {
        let period = match query.period() {
            Ok(period) => period,
            Err(e) => {
                record_total_cost_query("invalid_period", None);
                return Err(e);
            }
        };

        let candidates = self
            .store
            .list_cost_candidates(&query.filter, &period)
            .await
            .map_err(|e| {
                warn!(error = %e, "Store read failed during cost aggregation");
                record_total_cost_query("store_unavailable", Some(period.month_count()));
                AggregationError::StoreUnavailable(anyhow::Error::new(e))
            })?;

        let total_cost_rub = sum_costs(&candidates, &period);

        debug!(
            start = %period.start(),
            end = %period.end(),
            months = period.month_count(),
            candidates = candidates.len(),
            total_cost_rub,
            "Total cost computed"
        );
        record_total_cost_query("ok", Some(period.month_count()));

        Ok(TotalCost {
            total_cost_rub,
            period,
        })
    }
}
