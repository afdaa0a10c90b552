// src/api/mod.rs
use crate::config::{AppConfig, CookieSettings};
use crate::db::DbPool;
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{cors_layer, AuthMiddlewareConfig};
use crate::service::{auth_service::AuthService, subscription_service::SubscriptionService};
use crate::utils::jwt::JwtManager;
use crate::utils::password::PasswordManager;
use axum::{middleware, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod handlers;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub subscription_service: Arc<SubscriptionService>,
    pub auth_service: Arc<AuthService>,
    pub db: Arc<DatabaseConnection>,
    pub cookie_config: CookieSettings,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DbPool, app_config: &AppConfig) -> Result<Self, String> {
        let jwt_manager = JwtManager::new(app_config.jwt.clone())
            .map_err(|e| format!("Invalid JWT configuration: {}", e))?;
        let password_manager = PasswordManager::new_default()
            .map_err(|e| format!("Invalid password hashing configuration: {}", e))?;

        Ok(Self {
            subscription_service: Arc::new(SubscriptionService::new(db.clone())),
            auth_service: Arc::new(AuthService::new(
                db.clone(),
                Arc::new(password_manager),
                Arc::new(jwt_manager),
            )),
            db: Arc::new(db),
            cookie_config: app_config.cookie.clone(),
            config: Arc::new(app_config.clone()),
        })
    }

    pub fn auth_middleware_config(&self) -> AuthMiddlewareConfig {
        AuthMiddlewareConfig {
            auth_service: self.auth_service.clone(),
            access_token_cookie_name: self.cookie_config.name.clone(),
        }
    }
}

/// 全ルーターを統合し、共通レイヤーを適用
pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.cors_allowed_origins);

    Router::new()
        .merge(handlers::system_handler::system_router(app_state.clone()))
        .merge(handlers::auth_handler::auth_router(app_state.clone()))
        .merge(handlers::admin_subscription_plan_handler::admin_subscription_plan_router(
            app_state.clone(),
        ))
        .merge(
            handlers::admin_customer_subscription_handler::admin_customer_subscription_router(
                app_state.clone(),
            ),
        )
        .merge(handlers::store_subscription_plan_handler::store_subscription_plan_router(
            app_state.clone(),
        ))
        .merge(
            handlers::store_customer_subscription_handler::store_customer_subscription_router(
                app_state,
            ),
        )
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(inject_request_context))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
