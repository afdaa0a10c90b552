use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// URLパスからUUIDパラメータ名を推測するヘルパー関数
fn extract_uuid_param_name(path: &str) -> &'static str {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    // 最初のリソース名の直後がIDになる
    for window in segments.windows(2) {
        match window[0] {
            "subscription-plans" => return "plan_id",
            "customer-subscriptions" => return "subscription_id",
            _ => {}
        }
    }

    "id"
}

/// パスパラメータからUUIDを抽出し、検証を行う
#[derive(Debug, Clone, Copy)]
pub struct ValidatedUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidatedUuid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let param_name = extract_uuid_param_name(parts.uri.path());

        let Path(uuid_str) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                AppError::BadRequest(format!("Missing path parameter '{}': {}", param_name, e))
            })?;

        let uuid = Uuid::parse_str(&uuid_str).map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid UUID format for '{}': '{}'",
                param_name, uuid_str
            ))
        })?;

        Ok(ValidatedUuid(uuid))
    }
}
