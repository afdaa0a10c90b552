// src/api/handlers/auth_handler.rs
use crate::api::dto::auth_dto::*;
use crate::api::dto::common::validation_messages;
use crate::api::AppState;
use crate::config::CookieSettings;
use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::middleware::auth::{require_customer, AuthenticatedCustomer};
use axum::{
    extract::State,
    http::header,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tracing::{info, warn};
use validator::Validate;

// --- 認証ハンドラー ---

/// 管理画面オペレーターのログイン
pub async fn user_login_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailPassLoginRequest>,
) -> AppResult<Response> {
    validate_payload(&payload, "User login")?;

    let (user, token) = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    info!(user_id = %user.id, "Issued user token");
    Ok(token_response(token, &app_state.cookie_config))
}

/// ストア顧客のログイン
pub async fn customer_login_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailPassLoginRequest>,
) -> AppResult<Response> {
    validate_payload(&payload, "Customer login")?;

    let (customer, token) = app_state
        .auth_service
        .login_customer(&payload.email, &payload.password)
        .await?;

    info!(customer_id = %customer.id, "Issued customer token");
    Ok(token_response(token, &app_state.cookie_config))
}

/// 顧客登録（登録と同時にログイン状態にする）
pub async fn register_customer_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterCustomerRequest>,
) -> AppResult<Response> {
    validate_payload(&payload, "Customer registration")?;

    let (customer, token) = app_state
        .auth_service
        .register_customer(payload.into())
        .await?;

    let cookie = auth_cookie(token.clone(), &app_state.cookie_config);
    let body = RegisterCustomerResponse {
        customer: customer.into(),
        token,
    };

    Ok(with_cookie(Json(body).into_response(), cookie))
}

/// ログイン中の顧客情報
pub async fn me_handler(
    State(app_state): State<AppState>,
    customer: AuthenticatedCustomer,
) -> AppResult<Json<CustomerResponse>> {
    let customer = app_state
        .auth_service
        .get_customer(customer.customer_id())
        .await
        .map_err(|e| match e {
            // トークンは有効だがアカウントが消えている
            AppError::NotFound(_) => AppError::Unauthorized("Customer no longer exists".to_string()),
            other => other,
        })?;

    Ok(Json(CustomerResponse {
        customer: customer.into(),
    }))
}

/// セッション終了（Cookieを削除）
pub async fn logout_handler(State(app_state): State<AppState>) -> Response {
    let cookie = expired_auth_cookie(&app_state.cookie_config);
    with_cookie(Json(LogoutResponse { success: true }).into_response(), cookie)
}

// --- ヘルパー関数 ---

fn validate_payload<T: Validate>(payload: &T, context: &str) -> AppResult<()> {
    payload.validate().map_err(|validation_errors| {
        warn!("{} validation failed: {}", context, validation_errors);
        AppError::ValidationErrors(validation_messages(&validation_errors))
    })
}

fn token_response(token: String, config: &CookieSettings) -> Response {
    let cookie = auth_cookie(token.clone(), config);
    with_cookie(Json(TokenResponse { token }).into_response(), cookie)
}

/// 認証Cookieを作成
fn auth_cookie(token: String, config: &CookieSettings) -> Cookie<'static> {
    Cookie::build((config.name.clone(), token))
        .path("/")
        .secure(config.secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.max_age_secs))
        .build()
}

/// 期限切れ認証Cookieを作成（削除用）
fn expired_auth_cookie(config: &CookieSettings) -> Cookie<'static> {
    Cookie::build((config.name.clone(), ""))
        .path("/")
        .secure(config.secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(0))
        .build()
}

fn with_cookie(mut response: Response, cookie: Cookie<'static>) -> Response {
    if let Ok(header_value) = cookie.to_string().parse() {
        response
            .headers_mut()
            .append(header::SET_COOKIE, header_value);
    }
    response
}

// --- ルーター ---

pub fn auth_router(app_state: AppState) -> Router {
    let customer_only = Router::new()
        .route("/store/customers/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.auth_middleware_config(),
            require_customer,
        ));

    Router::new()
        .route("/auth/user/emailpass", post(user_login_handler))
        .route("/auth/customer/emailpass", post(customer_login_handler))
        .route("/auth/session", delete(logout_handler))
        .route("/store/customers", post(register_customer_handler))
        .merge(customer_only)
        .with_state(app_state)
}
