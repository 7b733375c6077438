//! Domain models for subscription-service.

mod month;
mod subscription;

pub use month::{CalendarMonth, MonthError, Period};
pub use subscription::{
    CostCandidate, Subscription, SubscriptionFilter, SubscriptionInput, SubscriptionRow,
};
