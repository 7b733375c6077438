//! HTTP handlers for subscription-service.

pub mod health;
pub mod subscriptions;

pub use health::{health_check, metrics_handler, readiness_check};
