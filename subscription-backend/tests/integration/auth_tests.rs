// tests/integration/auth_tests.rs

use crate::common::{app_helper, auth_helper, request};
use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_user_login_sets_http_only_cookie() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    app_state
        .auth_service
        .provision_admin(auth_helper::ADMIN_EMAIL, auth_helper::ADMIN_PASSWORD, false)
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(request::post(
            "/auth/user/emailpass",
            None,
            &json!({
                "email": "  ADMIN@example.com ",
                "password": auth_helper::ADMIN_PASSWORD,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = request::body_json(res).await;
    let token = body["token"].as_str().unwrap();
    assert!(cookie.contains(token));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let (app, app_state, _db) = app_helper::setup_app().await;
    app_state
        .auth_service
        .provision_admin(auth_helper::ADMIN_EMAIL, auth_helper::ADMIN_PASSWORD, false)
        .await
        .unwrap();

    for (email, password) in [
        (auth_helper::ADMIN_EMAIL, "WrongPassword123"),
        ("nobody@example.com", auth_helper::ADMIN_PASSWORD),
    ] {
        let res = app
            .clone()
            .oneshot(request::post(
                "/auth/user/emailpass",
                None,
                &json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body = request::body_json(res).await;
        assert_eq!(body["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn test_customer_cannot_log_in_as_user() {
    let (app, _app_state, _db) = app_helper::setup_app().await;
    let customer = auth_helper::register_customer(&app).await;

    let res = app
        .clone()
        .oneshot(request::post(
            "/auth/user/emailpass",
            None,
            &json!({ "email": customer.email, "password": auth_helper::CUSTOMER_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .clone()
        .oneshot(request::post(
            "/auth/customer/emailpass",
            None,
            &json!({ "email": customer.email, "password": auth_helper::CUSTOMER_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (app, _app_state, _db) = app_helper::setup_app().await;
    let customer = auth_helper::register_customer(&app).await;

    let res = app
        .clone()
        .oneshot(request::post(
            "/store/customers",
            None,
            &json!({
                "email": customer.email.to_uppercase(),
                "password": auth_helper::CUSTOMER_PASSWORD,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validates_payload() {
    let (app, _app_state, _db) = app_helper::setup_app().await;

    let res = app
        .clone()
        .oneshot(request::post(
            "/store/customers",
            None,
            &json!({ "email": "not-an-email", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_returns_current_customer() {
    let (app, _app_state, _db) = app_helper::setup_app().await;
    let customer = auth_helper::register_customer(&app).await;

    let res = app
        .clone()
        .oneshot(request::get("/store/customers/me", Some(&customer.token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = request::body_json(res).await;
    assert_eq!(body["customer"]["id"], customer.id.to_string());
    assert_eq!(body["customer"]["email"], customer.email);
    assert!(body["customer"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_cookie_authenticates_store_requests() {
    let (app, _app_state, _db) = app_helper::setup_app().await;
    let customer = auth_helper::register_customer(&app).await;

    let req = axum::http::Request::builder()
        .method("GET")
        .uri("/store/customers/me")
        .header(header::COOKIE, format!("auth_token={}", customer.token))
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let (app, _app_state, _db) = app_helper::setup_app().await;

    let res = app
        .clone()
        .oneshot(request::delete("/auth/session", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.contains("Max-Age=0"));

    let body = request::body_json(res).await;
    assert_eq!(body["success"], true);
}
