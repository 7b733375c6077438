//! Persistence boundary for subscriptions.

use crate::models::{CostCandidate, Period, Subscription, SubscriptionFilter, SubscriptionInput};
use async_trait::async_trait;
use service_core::error::AppError;
use uuid::Uuid;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create(&self, input: &SubscriptionInput) -> Result<Subscription, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, AppError>;

    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, AppError>;

    /// Replaces every mutable field. Returns `None` when `id` is unknown.
    async fn update(
        &self,
        id: Uuid,
        input: &SubscriptionInput,
    ) -> Result<Option<Subscription>, AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Billing intervals of every subscription matching `filter`.
    ///
    /// `window` is a pruning hint: implementations may leave out
    /// subscriptions that cannot overlap it, but must never leave out one
    /// that does.
    async fn list_cost_candidates(
        &self,
        filter: &SubscriptionFilter,
        window: &Period,
    ) -> Result<Vec<CostCandidate>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
