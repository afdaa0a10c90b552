// src/api/handlers/store_subscription_plan_handler.rs
use crate::api::dto::subscription_plan_dto::{
    StorePlanListQuery, SubscriptionPlanListResponse, SubscriptionPlanResponse,
};
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedUuid;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

/// 公開中のプラン一覧（is_active は常に true）
pub async fn list_store_plans_handler(
    State(app_state): State<AppState>,
    Query(query): Query<StorePlanListQuery>,
) -> AppResult<Json<SubscriptionPlanListResponse>> {
    let plans = app_state
        .subscription_service
        .list_plans(&query.into_filter())
        .await?;

    Ok(Json(plans.into()))
}

/// 非公開のプランは存在しないものとして404
pub async fn get_store_plan_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<SubscriptionPlanResponse>> {
    let plan = app_state
        .subscription_service
        .get_plan(id)
        .await?
        .filter(|plan| plan.is_visible_in_store())
        .ok_or_else(|| {
            AppError::NotFound(format!("Subscription plan with id {} not found", id))
        })?;

    Ok(Json(plan.into()))
}

pub fn store_subscription_plan_router(app_state: AppState) -> Router {
    Router::new()
        .route("/store/subscription-plans", get(list_store_plans_handler))
        .route("/store/subscription-plans/{id}", get(get_store_plan_handler))
        .with_state(app_state)
}
