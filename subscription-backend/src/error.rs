// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Failed to parse UUID: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn simple(status: StatusCode, message: String, error_type: &str) -> (StatusCode, ErrorResponse) {
        (
            status,
            ErrorResponse {
                success: false,
                error: message.clone(),
                message,
                details: None,
                validation_errors: None,
                errors: None,
                error_type: error_type.to_string(),
            },
        )
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::DbErr(db_err) => {
                // サーバーログには詳細を出す
                tracing::error!(error = ?db_err, "Database error");

                match &db_err {
                    DbErr::RecordNotFound(entity) => {
                        let mut response = AppError::simple(
                            StatusCode::NOT_FOUND,
                            "The requested resource was not found".to_string(),
                            "not_found",
                        );
                        response.1.details = Some(json!({ "entity": entity }));
                        response
                    }
                    _ => AppError::simple(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A database error occurred".to_string(),
                        "database_error",
                    ),
                }
            }
            AppError::NotFound(message) => {
                AppError::simple(StatusCode::NOT_FOUND, message, "not_found")
            }
            AppError::ValidationError(message) => {
                AppError::simple(StatusCode::BAD_REQUEST, message, "validation_error")
            }
            AppError::ValidationErrors(errors) => {
                let mut field_errors = HashMap::new();
                for error in &errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_insert_with(Vec::new)
                            .push(message.to_string());
                    }
                }
                let errors_array: Vec<serde_json::Value> =
                    errors.iter().map(|e| json!({"message": e})).collect();
                // 単一エラーの場合はそのままメッセージとして返す
                let message = if errors.len() == 1 {
                    errors[0].clone()
                } else {
                    "Validation failed".to_string()
                };
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        success: false,
                        error: message.clone(),
                        message,
                        details: None,
                        validation_errors: Some(field_errors),
                        errors: Some(errors_array),
                        error_type: "validation_errors".to_string(),
                    },
                )
            }
            AppError::UuidError(err) => AppError::simple(
                StatusCode::BAD_REQUEST,
                format!("Invalid UUID: {}", err),
                "invalid_uuid",
            ),
            AppError::ValidationFailure(errors) => {
                let field_errors: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Invalid value".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                let errors_array: Vec<serde_json::Value> = field_errors
                    .iter()
                    .flat_map(|(field, messages)| {
                        messages
                            .iter()
                            .map(move |msg| json!({"message": format!("{}: {}", field, msg)}))
                    })
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        success: false,
                        error: "Validation failed".to_string(),
                        message: "Validation failed".to_string(),
                        details: None,
                        validation_errors: Some(field_errors),
                        errors: Some(errors_array),
                        error_type: "validation_errors".to_string(),
                    },
                )
            }
            AppError::BadRequest(message) => {
                AppError::simple(StatusCode::BAD_REQUEST, message, "bad_request")
            }
            AppError::Unauthorized(message) => {
                AppError::simple(StatusCode::UNAUTHORIZED, message, "unauthorized")
            }
            AppError::Forbidden(message) => {
                AppError::simple(StatusCode::FORBIDDEN, message, "forbidden")
            }
            AppError::Conflict(message) => {
                AppError::simple(StatusCode::CONFLICT, message, "conflict")
            }
            AppError::InternalServerError(message) => {
                tracing::error!(error = %message, "Internal server error");
                AppError::simple(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    "internal_server_error",
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    pub error_type: String,
}
