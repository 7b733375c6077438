//! Subscription model.

use super::month::CalendarMonth;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's recurring subscription, billed once per active calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub cost_rub: i32,
    pub user_id: Uuid,
    pub start_month: CalendarMonth,
    pub end_month: Option<CalendarMonth>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Subscription {
    /// Whether `month` is billed: on or after the start and, if the
    /// subscription ends, on or before the end.
    #[cfg(test)]
    pub(crate) fn is_active_in(&self, month: CalendarMonth) -> bool {
        self.start_month <= month && self.end_month.map_or(true, |end| month <= end)
    }

    pub fn matches(&self, filter: &SubscriptionFilter) -> bool {
        filter.user_id.map_or(true, |id| id == self.user_id)
            && filter
                .service_name
                .as_deref()
                .map_or(true, |name| name == self.service_name)
    }

    pub fn cost_candidate(&self) -> CostCandidate {
        CostCandidate {
            start_month: self.start_month,
            end_month: self.end_month,
            cost_rub: self.cost_rub,
        }
    }
}

/// Row shape of the `subscriptions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub service_name: String,
    pub cost_rub: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.id,
            service_name: row.service_name,
            cost_rub: row.cost_rub,
            user_id: row.user_id,
            start_month: CalendarMonth::from_date(row.start_date),
            end_month: row.end_date.map(CalendarMonth::from_date),
            created_utc: row.created_utc,
            updated_utc: row.updated_utc,
        }
    }
}

/// Input for creating a subscription or replacing all of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInput {
    pub service_name: String,
    pub cost_rub: i32,
    pub user_id: Uuid,
    pub start_month: CalendarMonth,
    pub end_month: Option<CalendarMonth>,
}

/// Owner / service filters shared by listing and cost aggregation.
///
/// `None` matches everything. An empty service name is normalized to `None`
/// so that a blank query parameter never matches a literal empty name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl SubscriptionFilter {
    pub fn new(user_id: Option<Uuid>, service_name: Option<String>) -> Self {
        Self {
            user_id,
            service_name: service_name.filter(|name| !name.is_empty()),
        }
    }
}

/// The part of a subscription the cost aggregator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostCandidate {
    pub start_month: CalendarMonth,
    pub end_month: Option<CalendarMonth>,
    pub cost_rub: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(start: (i32, i32), end: Option<(i32, i32)>) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            service_name: "Yandex Plus".to_string(),
            cost_rub: 400,
            user_id: Uuid::new_v4(),
            start_month: CalendarMonth::new(start.0, start.1).unwrap(),
            end_month: end.map(|(y, m)| CalendarMonth::new(y, m).unwrap()),
            created_utc: now,
            updated_utc: now,
        }
    }

    #[test]
    fn bounded_subscription_is_active_inclusive_of_both_ends() {
        let sub = subscription((2024, 1), Some((2024, 3)));
        assert!(!sub.is_active_in(CalendarMonth::new(2023, 12).unwrap()));
        assert!(sub.is_active_in(CalendarMonth::new(2024, 1).unwrap()));
        assert!(sub.is_active_in(CalendarMonth::new(2024, 3).unwrap()));
        assert!(!sub.is_active_in(CalendarMonth::new(2024, 4).unwrap()));
    }

    #[test]
    fn open_ended_subscription_stays_active() {
        let sub = subscription((2024, 2), None);
        assert!(sub.is_active_in(CalendarMonth::new(2099, 12).unwrap()));
    }

    #[test]
    fn empty_service_filter_matches_everything() {
        let sub = subscription((2024, 1), None);
        let filter = SubscriptionFilter::new(None, Some(String::new()));
        assert_eq!(filter.service_name, None);
        assert!(sub.matches(&filter));
    }

    #[test]
    fn filters_require_exact_match() {
        let sub = subscription((2024, 1), None);
        assert!(sub.matches(&SubscriptionFilter::new(
            Some(sub.user_id),
            Some("Yandex Plus".to_string())
        )));
        assert!(!sub.matches(&SubscriptionFilter::new(Some(Uuid::new_v4()), None)));
        assert!(!sub.matches(&SubscriptionFilter::new(None, Some("yandex plus".to_string()))));
    }

    #[test]
    fn row_dates_are_truncated_to_month() {
        let now = Utc::now();
        let row = SubscriptionRow {
            id: Uuid::new_v4(),
            service_name: "Kinopoisk".to_string(),
            cost_rub: 299,
            user_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 8, 31).unwrap()),
            created_utc: now,
            updated_utc: now,
        };
        let sub = Subscription::from(row);
        assert_eq!(sub.start_month, CalendarMonth::new(2024, 5).unwrap());
        assert_eq!(sub.end_month, Some(CalendarMonth::new(2024, 8).unwrap()));
    }
}
