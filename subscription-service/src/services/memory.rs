//! In-process subscription store.
//!
//! Backs tests and database-less runs. Listing order is creation order, the
//! same order the PostgreSQL store returns.

use crate::models::{CostCandidate, Period, Subscription, SubscriptionFilter, SubscriptionInput};
use crate::services::store::SubscriptionStore;
use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    subscriptions: RwLock<HashMap<Uuid, Subscription>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn create(&self, input: &SubscriptionInput) -> Result<Subscription, AppError> {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: input.service_name.clone(),
            cost_rub: input.cost_rub,
            user_id: input.user_id,
            start_month: input.start_month,
            end_month: input.end_month,
            created_utc: now,
            updated_utc: now,
        };

        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());

        Ok(subscription)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, AppError> {
        Ok(self.subscriptions.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, AppError> {
        let mut subscriptions: Vec<Subscription> = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.matches(filter))
            .cloned()
            .collect();
        subscriptions.sort_by_key(|s| (s.created_utc, s.id));
        Ok(subscriptions)
    }

    async fn update(
        &self,
        id: Uuid,
        input: &SubscriptionInput,
    ) -> Result<Option<Subscription>, AppError> {
        let mut subscriptions = self.subscriptions.write().await;
        let Some(existing) = subscriptions.get_mut(&id) else {
            return Ok(None);
        };

        existing.service_name = input.service_name.clone();
        existing.cost_rub = input.cost_rub;
        existing.user_id = input.user_id;
        existing.start_month = input.start_month;
        existing.end_month = input.end_month;
        existing.updated_utc = Utc::now();

        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.subscriptions.write().await.remove(&id).is_some())
    }

    async fn list_cost_candidates(
        &self,
        filter: &SubscriptionFilter,
        window: &Period,
    ) -> Result<Vec<CostCandidate>, AppError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.matches(filter))
            .filter(|s| window.overlap_months(s.start_month, s.end_month) > 0)
            .map(Subscription::cost_candidate)
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
