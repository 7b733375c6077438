//! Subscription CRUD and cost aggregation handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::dtos::{
    ErrorResponse, ListSubscriptionsParams, SubscriptionRequest, SubscriptionResponse,
    TotalCostParams, TotalCostResponse,
};
use crate::services::{record_error, record_subscription_operation};
use crate::startup::AppState;
use crate::utils::JsonBody;

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(anyhow::anyhow!("invalid UUID")))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Subscription {} not found", id))
}

/// Counts the operation on success, or its error kind on failure.
fn track<T>(operation: &str, result: Result<T, AppError>) -> Result<T, AppError> {
    match &result {
        Ok(_) => record_subscription_operation(operation),
        Err(e) => record_error(e.kind(), operation),
    }
    result
}

/// Create a subscription
#[utoipa::path(
    post,
    path = "/subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state, request))]
pub async fn create_subscription(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), AppError> {
    track("create", create(&state, request).await)
        .map(|created| (StatusCode::CREATED, Json(created)))
}

async fn create(
    state: &AppState,
    request: SubscriptionRequest,
) -> Result<SubscriptionResponse, AppError> {
    let input = request.into_input()?;
    let subscription = state.store.create(&input).await?;

    tracing::info!(
        subscription_id = %subscription.id,
        user_id = %subscription.user_id,
        service_name = %subscription.service_name,
        cost_rub = subscription.cost_rub,
        "Subscription created"
    );

    Ok(subscription.into())
}

/// Get a subscription by id
#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscription id")
    ),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse)
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state))]
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionResponse>, AppError> {
    track("get", get(&state, &id).await).map(Json)
}

async fn get(state: &AppState, raw_id: &str) -> Result<SubscriptionResponse, AppError> {
    let id = parse_id(raw_id)?;
    let subscription = state.store.get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(subscription.into())
}

/// List subscriptions
#[utoipa::path(
    get,
    path = "/subscriptions",
    params(ListSubscriptionsParams),
    responses(
        (status = 200, description = "Matching subscriptions", body = [SubscriptionResponse]),
        (status = 400, description = "Malformed filter", body = ErrorResponse)
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<ListSubscriptionsParams>,
) -> Result<Json<Vec<SubscriptionResponse>>, AppError> {
    track("list", list(&state, &params).await).map(Json)
}

async fn list(
    state: &AppState,
    params: &ListSubscriptionsParams,
) -> Result<Vec<SubscriptionResponse>, AppError> {
    let filter = params.filter()?;
    let subscriptions = state.store.list(&filter).await?;
    Ok(subscriptions
        .into_iter()
        .map(SubscriptionResponse::from)
        .collect())
}

/// Replace a subscription
#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscription id")
    ),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription replaced", body = SubscriptionResponse),
        (status = 400, description = "Malformed id or invalid body", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse)
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<SubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, AppError> {
    track("update", update(&state, &id, request).await).map(Json)
}

async fn update(
    state: &AppState,
    raw_id: &str,
    request: SubscriptionRequest,
) -> Result<SubscriptionResponse, AppError> {
    // The id always comes from the path, never from the body.
    let id = parse_id(raw_id)?;
    let input = request.into_input()?;
    let subscription = state
        .store
        .update(id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(subscription_id = %id, "Subscription replaced");

    Ok(subscription.into())
}

/// Delete a subscription
#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscription id")
    ),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse)
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state))]
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    track("delete", delete(&state, &id).await).map(|_| StatusCode::NO_CONTENT)
}

async fn delete(state: &AppState, raw_id: &str) -> Result<(), AppError> {
    let id = parse_id(raw_id)?;
    if !state.store.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(subscription_id = %id, "Subscription deleted");
    Ok(())
}

/// Total cost of matching subscriptions over a closed month window
#[utoipa::path(
    get,
    path = "/subscriptions/total-cost",
    params(TotalCostParams),
    responses(
        (status = 200, description = "Total cost over the window", body = TotalCostResponse),
        (status = 400, description = "Missing or invalid window bounds", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "Subscriptions"
)]
#[tracing::instrument(skip(state))]
pub async fn total_cost(
    State(state): State<AppState>,
    Query(params): Query<TotalCostParams>,
) -> Result<Json<TotalCostResponse>, AppError> {
    aggregate(&state, params).await.map_err(|err| {
        record_error(err.kind(), "total_cost");
        err
    })
}

async fn aggregate(
    state: &AppState,
    params: TotalCostParams,
) -> Result<Json<TotalCostResponse>, AppError> {
    let query = params.into_query()?;
    let total = state.aggregator.total_cost(&query).await?;
    Ok(Json(TotalCostResponse::from(total)))
}
