use crate::models::{CalendarMonth, Subscription, SubscriptionFilter, SubscriptionInput};
use crate::services::{TotalCost, TotalCostQuery};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Body of create and full-replace requests.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscriptionRequest {
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[validate(range(min = 1, message = "Cost must be a positive number of rubles"))]
    #[schema(example = 400)]
    pub cost_rub: i32,
    pub user_id: Uuid,
    /// `MM-YYYY`, `YYYY-MM` or `YYYY-MM-DD`; the day is discarded.
    #[schema(example = "07-2025")]
    pub start_date: String,
    /// Last billed month; omitted or blank means open-ended.
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    pub fn into_input(mut self) -> Result<SubscriptionInput, AppError> {
        self.service_name = self.service_name.trim().to_string();
        self.validate()?;

        let start_month = parse_month("start_date", &self.start_date)?;
        let end_month = self
            .end_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|raw| parse_month("end_date", raw))
            .transpose()?;

        if let Some(end) = end_month {
            if end < start_month {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "end_date {} is before start_date {}",
                    end,
                    start_month
                )));
            }
        }

        Ok(SubscriptionInput {
            service_name: self.service_name,
            cost_rub: self.cost_rub,
            user_id: self.user_id,
            start_month,
            end_month,
        })
    }
}

fn parse_month(field: &str, raw: &str) -> Result<CalendarMonth, AppError> {
    raw.parse()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("invalid {}: {}", field, e)))
}

fn parse_uuid(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, AppError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| AppError::BadRequest(anyhow::anyhow!("invalid {}", field)))
        })
        .transpose()
}

fn required_int(field: &str, raw: Option<&str>) -> Result<i32, AppError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("{} is required", field)))?;
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("{} must be an integer", field)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub cost_rub: i32,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "07-2025")]
    pub start_date: CalendarMonth,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "12-2025")]
    pub end_date: Option<CalendarMonth>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name,
            cost_rub: sub.cost_rub,
            user_id: sub.user_id,
            start_date: sub.start_month,
            end_date: sub.end_month,
            created_utc: sub.created_utc,
            updated_utc: sub.updated_utc,
        }
    }
}

/// Query string of `GET /subscriptions`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSubscriptionsParams {
    /// Owner to filter by.
    #[param(value_type = Option<Uuid>)]
    pub user_id: Option<String>,
    /// Exact service name; empty matches every service.
    pub service_name: Option<String>,
}

impl ListSubscriptionsParams {
    pub fn filter(&self) -> Result<SubscriptionFilter, AppError> {
        Ok(SubscriptionFilter::new(
            parse_uuid("user_id", self.user_id.as_deref())?,
            self.service_name.clone(),
        ))
    }
}

/// Query string of `GET /subscriptions/total-cost`.
///
/// Kept as raw strings so malformed values produce the service's JSON error
/// body instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalCostParams {
    /// Owner to filter by.
    #[param(value_type = Option<Uuid>)]
    pub user_id: Option<String>,
    /// Exact service name; empty matches every service.
    pub service_name: Option<String>,
    /// First month of the window (1-12). Required.
    #[param(value_type = Option<i32>, example = 1)]
    pub start_month: Option<String>,
    /// Year of the first month. Required.
    #[param(value_type = Option<i32>, example = 2024)]
    pub start_year: Option<String>,
    /// Last month of the window (1-12), inclusive. Required.
    #[param(value_type = Option<i32>, example = 3)]
    pub end_month: Option<String>,
    /// Year of the last month. Required.
    #[param(value_type = Option<i32>, example = 2024)]
    pub end_year: Option<String>,
}

impl TotalCostParams {
    pub fn into_query(self) -> Result<TotalCostQuery, AppError> {
        Ok(TotalCostQuery {
            filter: SubscriptionFilter::new(
                parse_uuid("user_id", self.user_id.as_deref())?,
                self.service_name,
            ),
            start_month: required_int("start_month", self.start_month.as_deref())?,
            start_year: required_int("start_year", self.start_year.as_deref())?,
            end_month: required_int("end_month", self.end_month.as_deref())?,
            end_year: required_int("end_year", self.end_year.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalCostResponse {
    #[schema(example = 250)]
    pub total_cost_rub: i64,
    #[schema(value_type = String, example = "01-2024")]
    pub start: CalendarMonth,
    #[schema(value_type = String, example = "02-2024")]
    pub end: CalendarMonth,
    /// Calendar months in the window.
    #[schema(example = 2)]
    pub months: u32,
}

/// Error body returned by every failing request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "start_month is required")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<TotalCost> for TotalCostResponse {
    fn from(total: TotalCost) -> Self {
        Self {
            total_cost_rub: total.total_cost_rub,
            start: total.period.start(),
            end: total.period.end(),
            months: total.period.month_count(),
        }
    }
}
