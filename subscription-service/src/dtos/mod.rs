mod subscriptions;

pub use subscriptions::{
    ErrorResponse, ListSubscriptionsParams, SubscriptionRequest, SubscriptionResponse,
    TotalCostParams, TotalCostResponse,
};
