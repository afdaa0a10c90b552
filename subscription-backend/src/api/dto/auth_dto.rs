// src/api/dto/auth_dto.rs

use crate::domain::customer_model::Model as Customer;
use crate::service::auth_service::RegisterCustomer;
use crate::utils::password::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- リクエストDTO ---

/// emailpass ログインリクエスト（user / customer 共通）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailPassLoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// 顧客登録リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterCustomerRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub password: String,

    #[validate(length(max = 100, message = "First name is too long"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name is too long"))]
    pub last_name: Option<String>,
}

impl From<RegisterCustomerRequest> for RegisterCustomer {
    fn from(request: RegisterCustomerRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
        }
    }
}

// --- レスポンスDTO ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// 顧客情報（パスワードハッシュは含めない）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub has_account: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerDto {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            email: customer.email,
            first_name: customer.first_name,
            last_name: customer.last_name,
            has_account: customer.has_account,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub customer: CustomerDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCustomerResponse {
    pub customer: CustomerDto,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}
