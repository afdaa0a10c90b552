// src/api/handlers/admin_subscription_plan_handler.rs
use crate::api::dto::common::DeleteResponse;
use crate::api::dto::subscription_plan_dto::*;
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::extractors::{ValidatedJson, ValidatedUuid};
use crate::middleware::auth::{require_admin, AdminUser};
use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use tracing::info;

const PLAN_OBJECT: &str = "subscription_plan";

/// プラン一覧
pub async fn list_plans_handler(
    State(app_state): State<AppState>,
    Query(query): Query<AdminPlanListQuery>,
) -> AppResult<Json<SubscriptionPlanListResponse>> {
    let filter = query.into_filter();
    let plans = app_state.subscription_service.list_plans(&filter).await?;

    Ok(Json(plans.into()))
}

/// プラン作成
pub async fn create_plan_handler(
    State(app_state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(payload): ValidatedJson<CreateSubscriptionPlanRequest>,
) -> AppResult<Json<SubscriptionPlanResponse>> {
    let create_plan = payload.into_create_plan()?;
    let plan = app_state.subscription_service.create_plan(create_plan).await?;

    info!(plan_id = %plan.id, admin_id = %admin.user_id(), "Plan created via admin");
    Ok(Json(plan.into()))
}

pub async fn get_plan_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<SubscriptionPlanResponse>> {
    let plan = app_state
        .subscription_service
        .get_plan(id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Subscription plan with id {} not found", id))
        })?;

    Ok(Json(plan.into()))
}

/// プラン更新（部分更新）
pub async fn update_plan_handler(
    State(app_state): State<AppState>,
    admin: AdminUser,
    ValidatedUuid(id): ValidatedUuid,
    ValidatedJson(payload): ValidatedJson<UpdateSubscriptionPlanRequest>,
) -> AppResult<Json<SubscriptionPlanResponse>> {
    let update_plan = payload.into_update_plan()?;
    let plan = app_state
        .subscription_service
        .update_plan(id, update_plan)
        .await?;

    info!(plan_id = %id, admin_id = %admin.user_id(), "Plan updated via admin");
    Ok(Json(plan.into()))
}

pub async fn delete_plan_handler(
    State(app_state): State<AppState>,
    admin: AdminUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<Json<DeleteResponse>> {
    app_state.subscription_service.delete_plan(id).await?;

    info!(plan_id = %id, admin_id = %admin.user_id(), "Plan deleted via admin");
    Ok(Json(DeleteResponse::new(id, PLAN_OBJECT)))
}

pub fn admin_subscription_plan_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/admin/subscription-plans",
            get(list_plans_handler).post(create_plan_handler),
        )
        .route(
            "/admin/subscription-plans/{id}",
            get(get_plan_handler)
                .post(update_plan_handler)
                .delete(delete_plan_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.auth_middleware_config(),
            require_admin,
        ))
        .with_state(app_state)
}
