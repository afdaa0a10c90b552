// src/api/handlers/admin_customer_subscription_handler.rs
use crate::api::dto::common::DeleteResponse;
use crate::api::dto::customer_subscription_dto::*;
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::extractors::{ValidatedJson, ValidatedUuid};
use crate::middleware::auth::{require_admin, AdminUser};
use axum::{
    body::Bytes,
    extract::{Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::info;

const SUBSCRIPTION_OBJECT: &str = "customer_subscription";

pub async fn list_subscriptions_handler(
    State(app_state): State<AppState>,
    Query(query): Query<SubscriptionListQuery>,
) -> AppResult<Json<CustomerSubscriptionListResponse>> {
    let filter = query.into_filter()?;
    let subscriptions = app_state
        .subscription_service
        .list_subscriptions(&filter)
        .await?;

    Ok(Json(subscriptions.into()))
}

pub async fn create_subscription_handler(
    State(app_state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(payload): ValidatedJson<CreateCustomerSubscriptionRequest>,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let create = payload.into_admin_create(Utc::now())?;
    let subscription = app_state
        .subscription_service
        .create_subscription(create)
        .await?;

    info!(
        subscription_id = %subscription.id,
        admin_id = %admin.user_id(),
        "Subscription created via admin"
    );
    Ok(Json(subscription.into()))
}

pub async fn get_subscription_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let subscription = app_state
        .subscription_service
        .get_subscription(id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Customer subscription with id {} not found", id))
        })?;

    Ok(Json(subscription.into()))
}

pub async fn update_subscription_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<UpdateCustomerSubscriptionRequest>,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let update = payload.into_update()?;
    let subscription = app_state
        .subscription_service
        .update_subscription(id, update)
        .await?;

    Ok(Json(subscription.into()))
}

pub async fn delete_subscription_handler(
    State(app_state): State<AppState>,
    admin: AdminUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<DeleteResponse>> {
    app_state.subscription_service.delete_subscription(id).await?;

    info!(subscription_id = %id, admin_id = %admin.user_id(), "Subscription deleted via admin");
    Ok(Json(DeleteResponse::new(id, SUBSCRIPTION_OBJECT)))
}

pub async fn pause_subscription_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let subscription = app_state.subscription_service.pause_subscription(id).await?;
    Ok(Json(subscription.into()))
}

pub async fn resume_subscription_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let subscription = app_state
        .subscription_service
        .resume_subscription(id)
        .await?;
    Ok(Json(subscription.into()))
}

/// キャンセル（ボディ省略時は期間終了時キャンセル）
pub async fn cancel_subscription_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
    body: Bytes,
) -> AppResult<Json<CustomerSubscriptionResponse>> {
    let request = CancelSubscriptionRequest::from_body(&body)?;
    let subscription = app_state
        .subscription_service
        .cancel_subscription(id, request.cancel_at_period_end)
        .await?;

    Ok(Json(subscription.into()))
}

pub fn admin_customer_subscription_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/admin/customer-subscriptions",
            get(list_subscriptions_handler).post(create_subscription_handler),
        )
        .route(
            "/admin/customer-subscriptions/{id}",
            get(get_subscription_handler)
                .post(update_subscription_handler)
                .delete(delete_subscription_handler),
        )
        .route(
            "/admin/customer-subscriptions/{id}/pause",
            post(pause_subscription_handler),
        )
        .route(
            "/admin/customer-subscriptions/{id}/resume",
            post(resume_subscription_handler),
        )
        .route(
            "/admin/customer-subscriptions/{id}/cancel",
            post(cancel_subscription_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.auth_middleware_config(),
            require_admin,
        ))
        .with_state(app_state)
}
