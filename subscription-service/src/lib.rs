//! Subscription Service - subscription tracking and period cost aggregation.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::subscriptions::create_subscription,
        handlers::subscriptions::list_subscriptions,
        handlers::subscriptions::get_subscription,
        handlers::subscriptions::update_subscription,
        handlers::subscriptions::delete_subscription,
        handlers::subscriptions::total_cost,
    ),
    components(
        schemas(
            dtos::SubscriptionRequest,
            dtos::SubscriptionResponse,
            dtos::TotalCostResponse,
            dtos::ErrorResponse,
        )
    ),
    tags(
        (name = "Subscriptions", description = "Subscription records and period cost aggregation"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;
