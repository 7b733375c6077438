//! Database service for subscription-service.

use crate::models::{
    CalendarMonth, CostCandidate, Period, Subscription, SubscriptionFilter, SubscriptionInput,
    SubscriptionRow,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::SubscriptionStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const SUBSCRIPTION_COLUMNS: &str =
    "id, service_name, cost_rub, user_id, start_date, end_date, created_utc, updated_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(connect_options), fields(service = "subscription-service"))]
    pub async fn new(
        connect_options: PgConnectOptions,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for Database {
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create(&self, input: &SubscriptionInput) -> Result<Subscription, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_subscription"])
            .start_timer();

        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            INSERT INTO subscriptions (id, service_name, cost_rub, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.service_name)
        .bind(input.cost_rub)
        .bind(input.user_id)
        .bind(input.start_month.first_day())
        .bind(input.end_month.map(CalendarMonth::first_day))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create subscription: {}", e))
        })?;

        timer.observe_duration();
        info!(subscription_id = %row.id, service_name = %row.service_name, "Subscription created");

        Ok(row.into())
    }

    #[instrument(skip(self), fields(subscription_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_subscription"])
            .start_timer();

        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get subscription: {}", e))
        })?;

        timer.observe_duration();

        Ok(row.map(Subscription::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_subscriptions"])
            .start_timer();

        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR service_name = $2)
            ORDER BY created_utc, id
            "#
        ))
        .bind(filter.user_id)
        .bind(filter.service_name.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list subscriptions: {}", e))
        })?;

        timer.observe_duration();

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    #[instrument(skip(self, input), fields(subscription_id = %id))]
    async fn update(
        &self,
        id: Uuid,
        input: &SubscriptionInput,
    ) -> Result<Option<Subscription>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_subscription"])
            .start_timer();

        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            UPDATE subscriptions
            SET service_name = $2, cost_rub = $3, user_id = $4, start_date = $5, end_date = $6,
                updated_utc = NOW()
            WHERE id = $1
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.service_name)
        .bind(input.cost_rub)
        .bind(input.user_id)
        .bind(input.start_month.first_day())
        .bind(input.end_month.map(CalendarMonth::first_day))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update subscription: {}", e))
        })?;

        timer.observe_duration();

        if row.is_some() {
            info!("Subscription updated");
        }

        Ok(row.map(Subscription::from))
    }

    #[instrument(skip(self), fields(subscription_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_subscription"])
            .start_timer();

        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete subscription: {}", e))
            })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    /// Single read: filters are applied in SQL and rows that end before the
    /// window or start after it are pruned.
    #[instrument(skip(self), fields(start = %window.start(), end = %window.end()))]
    async fn list_cost_candidates(
        &self,
        filter: &SubscriptionFilter,
        window: &Period,
    ) -> Result<Vec<CostCandidate>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_cost_candidates"])
            .start_timer();

        let rows: Vec<(NaiveDate, Option<NaiveDate>, i32)> = sqlx::query_as(
            r#"
            SELECT start_date, end_date, cost_rub
            FROM subscriptions
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR service_name = $2)
              AND date_trunc('month', start_date) <= $4
              AND (end_date IS NULL OR date_trunc('month', end_date) >= $3)
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.service_name.as_deref())
        .bind(window.start().first_day())
        .bind(window.end().first_day())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list cost candidates: {}", e))
        })?;

        timer.observe_duration();

        Ok(rows
            .into_iter()
            .map(|(start_date, end_date, cost_rub)| CostCandidate {
                start_month: CalendarMonth::from_date(start_date),
                end_month: end_date.map(CalendarMonth::from_date),
                cost_rub,
            })
            .collect())
    }

    /// Check database health.
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }
}
