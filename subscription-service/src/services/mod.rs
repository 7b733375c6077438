//! Services module for subscription-service.

pub mod aggregator;
pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use aggregator::{AggregationError, CostAggregator, TotalCost, TotalCostQuery};
pub use database::Database;
pub use memory::InMemoryStore;
pub use metrics::{
    get_metrics, init_metrics, record_error, record_subscription_operation,
    record_total_cost_query,
};
pub use store::SubscriptionStore;
