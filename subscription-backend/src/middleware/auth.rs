// src/middleware/auth.rs

use crate::domain::customer_subscription_model::Model as CustomerSubscription;
use crate::error::AppError;
use crate::logging::RequestContext;
use crate::service::auth_service::AuthService;
use crate::utils::jwt::{AccessTokenClaims, ActorType};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// JWT認証ミドルウェアの設定
#[derive(Clone)]
pub struct AuthMiddlewareConfig {
    pub auth_service: Arc<AuthService>,
    pub access_token_cookie_name: String,
}

/// 認証済みアクター（オペレーターまたは顧客）
#[derive(Debug, Clone)]
pub struct AuthenticatedActor {
    pub actor_id: Uuid,
    pub actor_type: ActorType,
    pub email: String,
}

impl AuthenticatedActor {
    fn from_claims(claims: AccessTokenClaims) -> Result<Self, AppError> {
        let actor_id = claims
            .actor_id()
            .map_err(|_| AppError::Unauthorized("Invalid subject in token".to_string()))?;

        Ok(Self {
            actor_id,
            actor_type: claims.actor_type,
            email: claims.email,
        })
    }

    pub fn is_user(&self) -> bool {
        self.actor_type == ActorType::User
    }

    pub fn is_customer(&self) -> bool {
        self.actor_type == ActorType::Customer
    }
}

/// ストアの顧客
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer(pub AuthenticatedActor);

impl AuthenticatedCustomer {
    pub fn customer_id(&self) -> Uuid {
        self.0.actor_id
    }

    /// ストア経由のサブスクリプション操作はすべてこの所有者チェックを通す
    pub fn ensure_owns(&self, subscription: &CustomerSubscription) -> Result<(), AppError> {
        if subscription.is_owned_by(self.customer_id()) {
            return Ok(());
        }

        warn!(
            customer_id = %self.customer_id(),
            subscription_id = %subscription.id,
            "Access denied to another customer's subscription"
        );
        Err(AppError::Forbidden(
            "You do not have access to this subscription".to_string(),
        ))
    }
}

/// 管理画面オペレーター
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedActor);

impl AdminUser {
    pub fn user_id(&self) -> Uuid {
        self.0.actor_id
    }
}

/// `/admin/*` 用: オペレーターのトークンが必要（顧客トークンは403）
pub async fn require_admin(
    State(config): State<AuthMiddlewareConfig>,
    headers: HeaderMap,
    cookie_jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = authenticate(&config, &headers, &cookie_jar, request.uri().path())?;

    if !actor.is_user() {
        warn!(
            actor_id = %actor.actor_id,
            actor_type = %actor.actor_type,
            path = %request.uri().path(),
            "Access denied: admin user required"
        );
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(run_authenticated(actor, request, next).await)
}

/// ストアの顧客専用ルート用（それ以外は401）
pub async fn require_customer(
    State(config): State<AuthMiddlewareConfig>,
    headers: HeaderMap,
    cookie_jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = authenticate(&config, &headers, &cookie_jar, request.uri().path())?;

    if !actor.is_customer() {
        warn!(
            actor_id = %actor.actor_id,
            path = %request.uri().path(),
            "Customer token required"
        );
        return Err(AppError::Unauthorized(
            "Customer authentication required".to_string(),
        ));
    }

    Ok(run_authenticated(actor, request, next).await)
}

fn authenticate(
    config: &AuthMiddlewareConfig,
    headers: &HeaderMap,
    cookie_jar: &CookieJar,
    path: &str,
) -> Result<AuthenticatedActor, AppError> {
    let token = extract_token(headers, cookie_jar, &config.access_token_cookie_name)
        .ok_or_else(|| {
            warn!(path = %path, "Missing authentication token");
            AppError::Unauthorized("Authentication required".to_string())
        })?;

    let claims = config.auth_service.verify_token(&token).inspect_err(|e| {
        warn!(path = %path, error = %e, "Invalid access token");
    })?;

    AuthenticatedActor::from_claims(claims)
}

async fn run_authenticated(actor: AuthenticatedActor, mut request: Request, next: Next) -> Response {
    info!(
        actor_id = %actor.actor_id,
        actor_type = %actor.actor_type,
        path = %request.uri().path(),
        "Authenticated request"
    );

    let context = request
        .extensions_mut()
        .get_mut::<RequestContext>()
        .map(|context| {
            context.actor_id = Some(actor.actor_id);
            context.clone()
        });
    request.extensions_mut().insert(actor);

    let mut response = next.run(request).await;
    if let Some(context) = context {
        response.extensions_mut().insert(context);
    }
    response
}

/// CORS設定（Cookieを送るため許可オリジンは明示リスト）
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

// --- ヘルパー関数 ---

/// リクエストからトークンを抽出（Authorizationヘッダー優先、Cookieはフォールバック）
pub fn extract_token(
    headers: &HeaderMap,
    cookie_jar: &CookieJar,
    cookie_name: &str,
) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let cookie_token = cookie_jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|s| !s.is_empty());

    auth_header.or(cookie_token)
}

// --- Axum Extractors ---

impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedActor>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = AuthenticatedActor::from_request_parts(parts, state).await?;
        if !actor.is_user() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(actor))
    }
}

impl<S> FromRequestParts<S> for AuthenticatedCustomer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = AuthenticatedActor::from_request_parts(parts, state).await?;
        if !actor.is_customer() {
            return Err(AppError::Unauthorized(
                "Customer authentication required".to_string(),
            ));
        }
        Ok(AuthenticatedCustomer(actor))
    }
}
