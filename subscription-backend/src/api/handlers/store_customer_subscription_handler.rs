// src/api/handlers/store_customer_subscription_handler.rs
use crate::api::dto::customer_subscription_dto::*;
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::extractors::{ValidatedJson, ValidatedUuid};
use crate::middleware::auth::{require_customer, AuthenticatedCustomer};
use axum::{
    body::Bytes,
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// ログイン中の顧客のサブスクリプション一覧
pub async fn list_my_subscriptions_handler(
    State(app_state): State<AppState>,
    customer: AuthenticatedCustomer,
) -> AppResult<Json<CustomerSubscriptionListResponse>> {
    let subscriptions = app_state
        .subscription_service
        .get_subscriptions_by_customer_id(customer.customer_id())
        .await?;

    Ok(Json(subscriptions.into()))
}

/// サブスクリプション作成（customer_id は呼び出し元に固定）
pub async fn create_my_subscription_handler(
    State(app_state): State<AppState>,
    customer: AuthenticatedCustomer,
    ValidatedJson(payload): ValidatedJson<CreateCustomerSubscriptionRequest>,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    info!(
        customer_id = %customer.customer_id(),
        plan_id = ?payload.subscription_plan_id,
        billing_period = ?payload.billing_period,
        "Store subscription creation requested"
    );

    let create = payload.into_store_create(customer.customer_id(), Utc::now())?;
    let subscription = app_state
        .subscription_service
        .create_subscription(create)
        .await?;

    Ok(Json(subscription.into()))
}

pub async fn get_my_subscription_handler(
    State(app_state): State<AppState>,
    customer: AuthenticatedCustomer,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let subscription = find_owned_subscription(&app_state, &customer, id).await?;
    Ok(Json(subscription.into()))
}

pub async fn cancel_my_subscription_handler(
    State(app_state): State<AppState>,
    customer: AuthenticatedCustomer,
    ValidatedUuid(id): ValidatedUuid,
    body: Bytes,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let request = CancelSubscriptionRequest::from_body(&body)?;
    find_owned_subscription(&app_state, &customer, id).await?;

    let subscription = app_state
        .subscription_service
        .cancel_subscription(id, request.cancel_at_period_end)
        .await?;

    info!(
        subscription_id = %id,
        customer_id = %customer.customer_id(),
        cancel_at_period_end = request.cancel_at_period_end,
        "Subscription cancelled by customer"
    );
    Ok(Json(subscription.into()))
}

/// 存在しなければ404、他人のものなら403
async fn find_owned_subscription(
    app_state: &AppState,
    customer: &AuthenticatedCustomer,
    id: Uuid,
) -> AppResult<crate::domain::customer_subscription_model::Model> {
    let subscription = app_state
        .subscription_service
        .get_subscription(id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Customer subscription with id {} not found", id))
        })?;

    customer.ensure_owns(&subscription)?;
    Ok(subscription)
}

pub fn store_customer_subscription_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/store/customer-subscriptions",
            get(list_my_subscriptions_handler).post(create_my_subscription_handler),
        )
        .route(
            "/store/customer-subscriptions/{id}",
            get(get_my_subscription_handler),
        )
        .route(
            "/store/customer-subscriptions/{id}/cancel",
            post(cancel_my_subscription_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.auth_middleware_config(),
            require_customer,
        ))
        .with_state(app_state)
}
