// tests/integration/admin_subscription_tests.rs

use crate::common::{app_helper, auth_helper, request};
use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn create_subscription(app: &Router, token: &str, body: &Value) -> Value {
    let res = app
        .clone()
        .oneshot(request::post(
            "/admin/customer-subscriptions",
            Some(token),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    request::body_json(res).await["customer_subscription"].clone()
}

fn subscription_body(customer_id: Uuid, plan_id: Uuid) -> Value {
    json!({
        "customer_id": customer_id,
        "subscription_plan_id": plan_id,
        "billing_period": "monthly",
        "current_period_start": "2026-01-01T00:00:00Z",
        "current_period_end": "2026-02-01T00:00:00Z",
    })
}

#[tokio::test]
async fn test_admin_create_requires_customer_id() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let res = app
        .clone()
        .oneshot(request::post(
            "/admin/customer-subscriptions",
            Some(&token),
            &json!({ "subscription_plan_id": Uuid::new_v4(), "billing_period": "monthly" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = request::body_json(res).await;
    assert_eq!(body["message"], "customer_id is required");
}

#[tokio::test]
async fn test_admin_create_defaults_status_and_flags() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let customer_id = Uuid::new_v4();

    let subscription =
        create_subscription(&app, &token, &subscription_body(customer_id, Uuid::new_v4())).await;

    assert_eq!(subscription["customer_id"], customer_id.to_string());
    assert_eq!(subscription["status"], "active");
    assert_eq!(subscription["billing_period"], "monthly");
    assert_eq!(subscription["cancel_at_period_end"], false);
    assert!(subscription["cancelled_at"].is_null());
}

#[tokio::test]
async fn test_overlong_stripe_subscription_id_is_bad_request() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let mut body = subscription_body(Uuid::new_v4(), Uuid::new_v4());
    body["stripe_subscription_id"] = json!("s".repeat(256));

    let res = app
        .clone()
        .oneshot(request::post(
            "/admin/customer-subscriptions",
            Some(&token),
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let subscription = create_subscription(
        &app,
        &token,
        &subscription_body(Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;
    let res = app
        .clone()
        .oneshot(request::post(
            &format!(
                "/admin/customer-subscriptions/{}",
                subscription["id"].as_str().unwrap()
            ),
            Some(&token),
            &json!({ "stripe_subscription_id": "s".repeat(256) }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_list_filters_by_customer_and_status() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let plan_id = Uuid::new_v4();

    create_subscription(&app, &token, &subscription_body(alice, plan_id)).await;
    let mut paused = subscription_body(alice, plan_id);
    paused["status"] = json!("paused");
    create_subscription(&app, &token, &paused).await;
    create_subscription(&app, &token, &subscription_body(bob, plan_id)).await;

    let res = app
        .clone()
        .oneshot(request::get(
            &format!("/admin/customer-subscriptions?customer_id={}", alice),
            Some(&token),
        ))
        .await
        .unwrap();
    let body = request::body_json(res).await;
    assert_eq!(body["customer_subscriptions"].as_array().unwrap().len(), 2);

    let res = app
        .clone()
        .oneshot(request::get(
            &format!(
                "/admin/customer-subscriptions?customer_id={}&status=paused",
                alice
            ),
            Some(&token),
        ))
        .await
        .unwrap();
    let body = request::body_json(res).await;
    let list = body["customer_subscriptions"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["status"], "paused");

    let res = app
        .clone()
        .oneshot(request::get(
            &format!("/admin/customer-subscriptions?subscription_plan_id={}", plan_id),
            Some(&token),
        ))
        .await
        .unwrap();
    let body = request::body_json(res).await;
    assert_eq!(body["customer_subscriptions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_admin_list_rejects_unknown_status() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let res = app
        .clone()
        .oneshot(request::get(
            "/admin/customer-subscriptions?status=trialing",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pause_then_resume() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let subscription = create_subscription(
        &app,
        &token,
        &subscription_body(Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;
    let id = subscription["id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(request::post_empty(
            &format!("/admin/customer-subscriptions/{}/pause", id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = request::body_json(res).await;
    assert_eq!(body["customer_subscription"]["status"], "paused");

    let res = app
        .clone()
        .oneshot(request::post_empty(
            &format!("/admin/customer-subscriptions/{}/resume", id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = request::body_json(res).await;
    assert_eq!(body["customer_subscription"]["status"], "active");
}

#[tokio::test]
async fn test_cancel_defaults_to_period_end() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let subscription = create_subscription(
        &app,
        &token,
        &subscription_body(Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;
    let id = subscription["id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(request::post_empty(
            &format!("/admin/customer-subscriptions/{}/cancel", id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cancelled = request::body_json(res).await["customer_subscription"].clone();
    assert_eq!(cancelled["status"], "active");
    assert_eq!(cancelled["cancel_at_period_end"], true);
    assert!(cancelled["cancelled_at"].is_null());
}

#[tokio::test]
async fn test_cancel_immediately() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let subscription = create_subscription(
        &app,
        &token,
        &subscription_body(Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;
    let id = subscription["id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(request::post(
            &format!("/admin/customer-subscriptions/{}/cancel", id),
            Some(&token),
            &json!({ "cancel_at_period_end": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cancelled = request::body_json(res).await["customer_subscription"].clone();
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancel_at_period_end"], false);
    assert!(cancelled["cancelled_at"].is_string());
}

#[tokio::test]
async fn test_update_can_clear_nullable_fields() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let mut body = subscription_body(Uuid::new_v4(), Uuid::new_v4());
    body["stripe_subscription_id"] = json!("sub_123");
    let subscription = create_subscription(&app, &token, &body).await;
    assert_eq!(subscription["stripe_subscription_id"], "sub_123");
    let uri = format!(
        "/admin/customer-subscriptions/{}",
        subscription["id"].as_str().unwrap()
    );

    // 未指定のフィールドは変わらない
    let res = app
        .clone()
        .oneshot(request::post(&uri, Some(&token), &json!({ "status": "paused" })))
        .await
        .unwrap();
    let updated = request::body_json(res).await["customer_subscription"].clone();
    assert_eq!(updated["status"], "paused");
    assert_eq!(updated["stripe_subscription_id"], "sub_123");

    let res = app
        .clone()
        .oneshot(request::post(
            &uri,
            Some(&token),
            &json!({ "stripe_subscription_id": null }),
        ))
        .await
        .unwrap();
    let updated = request::body_json(res).await["customer_subscription"].clone();
    assert!(updated["stripe_subscription_id"].is_null());
}

#[tokio::test]
async fn test_delete_subscription_and_missing_ids() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let subscription = create_subscription(
        &app,
        &token,
        &subscription_body(Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;
    let id = subscription["id"].as_str().unwrap();
    let uri = format!("/admin/customer-subscriptions/{}", id);

    let res = app
        .clone()
        .oneshot(request::delete(&uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = request::body_json(res).await;
    assert_eq!(body["object"], "customer_subscription");
    assert_eq!(body["deleted"], true);

    // 削除済みは存在しないものとして扱う
    let res = app
        .clone()
        .oneshot(request::delete(&uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(request::post_empty(&format!("{}/pause", uri), Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
