// tests/integration/store_plan_tests.rs

use crate::common::{app_helper, auth_helper, request};
use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_store_lists_only_active_plans_without_auth() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    for (name, active) in [("Basic", true), ("Hidden", false)] {
        let res = app
            .clone()
            .oneshot(request::post(
                "/admin/subscription-plans",
                Some(&token),
                &json!({ "name": name, "monthly_price": 5, "is_active": active }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = app
        .clone()
        .oneshot(request::get("/store/subscription-plans", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = request::body_json(res).await;
    let plans = body["subscription_plans"].as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["name"], "Basic");
    assert_eq!(plans[0]["monthly_price"], 5.0);
}

#[tokio::test]
async fn test_store_hides_inactive_plan_by_id() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let res = app
        .clone()
        .oneshot(request::post(
            "/admin/subscription-plans",
            Some(&token),
            &json!({ "name": "Hidden", "monthly_price": "19.00", "is_active": false }),
        ))
        .await
        .unwrap();
    let plan = request::body_json(res).await["subscription_plan"].clone();
    let uri = format!("/store/subscription-plans/{}", plan["id"].as_str().unwrap());

    let res = app.clone().oneshot(request::get(&uri, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // 有効化するとストアから見える
    let res = app
        .clone()
        .oneshot(request::post(
            &format!("/admin/subscription-plans/{}", plan["id"].as_str().unwrap()),
            Some(&token),
            &json!({ "is_active": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(request::get(&uri, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = request::body_json(res).await;
    assert_eq!(body["subscription_plan"]["monthly_price"], 19.0);
}

#[tokio::test]
async fn test_store_ignores_is_active_query() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    app.clone()
        .oneshot(request::post(
            "/admin/subscription-plans",
            Some(&token),
            &json!({ "name": "Hidden", "monthly_price": 1, "is_active": false }),
        ))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(request::get("/store/subscription-plans?is_active=false", None))
        .await
        .unwrap();
    let body = request::body_json(res).await;
    assert!(body["subscription_plans"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_deactivated_plan_leaves_store_but_stays_in_admin_listing() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    let token = auth_helper::create_admin_with_jwt(&app, &app_state).await;

    let res = app
        .clone()
        .oneshot(request::post(
            "/admin/subscription-plans",
            Some(&token),
            &json!({
                "name": "Basic",
                "monthly_price": 9.99,
                "currency_code": "USD",
                "is_active": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let id = request::body_json(res).await["subscription_plan"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let listed_ids = |body: Value, key: &str| -> Vec<String> {
        body[key]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect()
    };

    let res = app
        .clone()
        .oneshot(request::get("/store/subscription-plans", None))
        .await
        .unwrap();
    let store_ids = listed_ids(request::body_json(res).await, "subscription_plans");
    assert!(store_ids.contains(&id));

    let res = app
        .clone()
        .oneshot(request::post(
            &format!("/admin/subscription-plans/{}", id),
            Some(&token),
            &json!({ "is_active": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(request::get("/store/subscription-plans", None))
        .await
        .unwrap();
    let store_ids = listed_ids(request::body_json(res).await, "subscription_plans");
    assert!(!store_ids.contains(&id));

    let res = app
        .clone()
        .oneshot(request::get("/admin/subscription-plans", Some(&token)))
        .await
        .unwrap();
    let admin_ids = listed_ids(request::body_json(res).await, "subscription_plans");
    assert!(admin_ids.contains(&id));
}
