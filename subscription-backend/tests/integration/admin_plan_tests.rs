// tests/integration/admin_plan_tests.rs

use crate::common::{app_helper, auth_helper, request};
use axum::http::StatusCode;
use serde_json::{json, Value};
use subscription_backend::utils::jwt::ActorType;
use tower::ServiceExt;
use uuid::Uuid;

fn basic_plan(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Everything you need to get started",
        "class_level": "basic",
        "monthly_price": 9.99,
        "yearly_price": "99.90",
        "features": ["1 seat", "Email support"],
    })
}

async fn create_plan(app: &axum::Router, token: &str, body: &Value) -> Value {
    let res = app
        .clone()
        .oneshot(request::post("/admin/subscription-plans", Some(token), body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    request::body_json(res).await["subscription_plan"].clone()
}

#[tokio::test]
async fn test_create_plan_applies_defaults() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let plan = create_plan(&app, &token, &basic_plan("Basic")).await;

    assert_eq!(plan["name"], "Basic");
    assert_eq!(plan["monthly_price"], 9.99);
    assert_eq!(plan["yearly_price"], 99.9);
    assert_eq!(plan["currency_code"], "USD");
    assert_eq!(plan["is_active"], true);
    assert_eq!(plan["features"], json!(["1 seat", "Email support"]));
}

#[tokio::test]
async fn test_create_plan_rejects_missing_name_and_price() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let res = app
        .clone()
        .oneshot(request::post(
            "/admin/subscription-plans",
            Some(&token),
            &json!({ "description": "nameless" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = request::body_json(res).await;
    let messages: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert!(messages.contains(&"Plan name is required"));
    assert!(messages.contains(&"Valid monthly price is required"));
}

#[tokio::test]
async fn test_create_plan_rejects_fractional_cents() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let mut body = basic_plan("Too precise");
    body["monthly_price"] = json!("9.999");

    let res = app
        .clone()
        .oneshot(request::post("/admin/subscription-plans", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_plan_rejects_malformed_json() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/admin/subscription-plans")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_require_admin_token() {
    let (app, app_state, _db) = app_helper::setup_app().await;

    let res = app
        .clone()
        .oneshot(request::get("/admin/subscription-plans", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let customer_token =
        auth_helper::mint_token(&app_state, Uuid::new_v4(), ActorType::Customer);
    let res = app
        .clone()
        .oneshot(request::get("/admin/subscription-plans", Some(&customer_token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .clone()
        .oneshot(request::get("/admin/subscription-plans", Some("garbage")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_plans_filters_by_is_active_and_class_level() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    create_plan(&app, &token, &basic_plan("Basic")).await;
    let mut pro = basic_plan("Pro");
    pro["class_level"] = json!("pro");
    create_plan(&app, &token, &pro).await;
    let mut legacy = basic_plan("Legacy");
    legacy["is_active"] = json!(false);
    create_plan(&app, &token, &legacy).await;

    let res = app
        .clone()
        .oneshot(request::get("/admin/subscription-plans", Some(&token)))
        .await
        .unwrap();
    let all = request::body_json(res).await;
    assert_eq!(all["subscription_plans"].as_array().unwrap().len(), 3);

    let res = app
        .clone()
        .oneshot(request::get(
            "/admin/subscription-plans?is_active=false",
            Some(&token),
        ))
        .await
        .unwrap();
    let inactive = request::body_json(res).await;
    let inactive = inactive["subscription_plans"].as_array().unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0]["name"], "Legacy");

    let res = app
        .clone()
        .oneshot(request::get(
            "/admin/subscription-plans?class_level=pro",
            Some(&token),
        ))
        .await
        .unwrap();
    let pro_only = request::body_json(res).await;
    let pro_only = pro_only["subscription_plans"].as_array().unwrap();
    assert_eq!(pro_only.len(), 1);
    assert_eq!(pro_only[0]["name"], "Pro");
}

#[tokio::test]
async fn test_update_plan_changes_only_given_fields() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let plan = create_plan(&app, &token, &basic_plan("Basic")).await;
    let id = plan["id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(request::post(
            &format!("/admin/subscription-plans/{}", id),
            Some(&token),
            &json!({ "monthly_price": 12.5, "is_active": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let updated = request::body_json(res).await["subscription_plan"].clone();
    assert_eq!(updated["monthly_price"], 12.5);
    assert_eq!(updated["is_active"], false);
    assert_eq!(updated["name"], "Basic");
    assert_eq!(updated["yearly_price"], 99.9);
}

#[tokio::test]
async fn test_update_plan_rejects_null_price() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let plan = create_plan(&app, &token, &basic_plan("Basic")).await;
    let uri = format!("/admin/subscription-plans/{}", plan["id"].as_str().unwrap());

    let res = app
        .clone()
        .oneshot(request::post(&uri, Some(&token), &json!({ "monthly_price": null })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // 価格は変わっていない
    let res = app
        .clone()
        .oneshot(request::get(&uri, Some(&token)))
        .await
        .unwrap();
    let body = request::body_json(res).await;
    assert_eq!(body["subscription_plan"]["monthly_price"], 9.99);
}

#[tokio::test]
async fn test_overlong_class_level_is_bad_request() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let mut body = basic_plan("Long class");
    body["class_level"] = json!("c".repeat(101));

    let res = app
        .clone()
        .oneshot(request::post("/admin/subscription-plans", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let plan = create_plan(&app, &token, &basic_plan("Basic")).await;
    let res = app
        .clone()
        .oneshot(request::post(
            &format!("/admin/subscription-plans/{}", plan["id"].as_str().unwrap()),
            Some(&token),
            &json!({ "class_level": "c".repeat(101) }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_plan_rejects_zero_monthly_price() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let mut body = basic_plan("Free");
    body["monthly_price"] = json!(0);

    let res = app
        .clone()
        .oneshot(request::post("/admin/subscription-plans", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_plan_returns_not_found() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let uri = format!("/admin/subscription-plans/{}", Uuid::new_v4());

    let res = app
        .clone()
        .oneshot(request::get(&uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(request::post(&uri, Some(&token), &json!({ "name": "x" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(request::delete(&uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_plan_id_returns_bad_request() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let res = app
        .clone()
        .oneshot(request::get(
            "/admin/subscription-plans/not-a-uuid",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_plan_returns_envelope_and_hides_plan() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;
    let plan = create_plan(&app, &token, &basic_plan("Basic")).await;
    let id = plan["id"].as_str().unwrap();
    let uri = format!("/admin/subscription-plans/{}", id);

    let res = app
        .clone()
        .oneshot(request::delete(&uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = request::body_json(res).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["object"], "subscription_plan");
    assert_eq!(body["deleted"], true);

    let res = app
        .clone()
        .oneshot(request::get(&uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(request::get("/admin/subscription-plans", Some(&token)))
        .await
        .unwrap();
    let list = request::body_json(res).await;
    assert!(list["subscription_plans"].as_array().unwrap().is_empty());
}
