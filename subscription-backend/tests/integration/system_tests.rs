// tests/integration/system_tests.rs

use crate::common::{app_helper, request};
use axum::http::StatusCode;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _app_state, _db) = app_helper::setup_app().await;

    let res = app.clone().oneshot(request::get("/health", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(request::body_json(res).await["status"], "ok");

    let res = app
        .clone()
        .oneshot(request::get("/health/db", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
