// tests/common/auth_helper.rs

use axum::{http::StatusCode, Router};
use serde_json::json;
use subscription_backend::{api::AppState, utils::jwt::ActorType};
use tower::ServiceExt;
use uuid::Uuid;

use super::request;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "AdminPassword123";
pub const CUSTOMER_PASSWORD: &str = "CustomerPass123";

/// 登録済み顧客
pub struct TestCustomer {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// 管理者を用意してログインし、トークンを返す
pub async fn create_admin_with_jwt(app: &Router, app_state: &AppState) -> String {
    app_state
        .auth_service
        .provision_admin(ADMIN_EMAIL, ADMIN_PASSWORD, false)
        .await
        .expect("provision admin");

    let req = request::post(
        "/auth/user/emailpass",
        None,
        &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    );
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = request::body_json(res).await;
    body["token"].as_str().unwrap().to_string()
}

/// 顧客を登録し、ID とトークンを返す
pub async fn register_customer(app: &Router) -> TestCustomer {
    let email = format!("customer_{}@example.com", Uuid::new_v4().simple());
    let req = request::post(
        "/store/customers",
        None,
        &json!({
            "email": email,
            "password": CUSTOMER_PASSWORD,
            "first_name": "Test",
            "last_name": "Customer",
        }),
    );
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = request::body_json(res).await;
    TestCustomer {
        id: body["customer"]["id"].as_str().unwrap().parse().unwrap(),
        email,
        token: body["token"].as_str().unwrap().to_string(),
    }
}

/// ログインを経由せずにトークンを発行する
pub fn mint_token(app_state: &AppState, actor_id: Uuid, actor_type: ActorType) -> String {
    app_state
        .auth_service
        .issue_token(actor_id, actor_type, "someone@example.com")
        .unwrap()
}
