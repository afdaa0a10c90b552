// src/api/dto/customer_subscription_dto.rs

use super::common::{double_option, non_empty};
use crate::domain::billing_period::BillingPeriod;
use crate::domain::customer_subscription_model::Model as CustomerSubscription;
use crate::domain::subscription_status::SubscriptionStatus;
use crate::error::{AppError, AppResult};
use crate::repository::customer_subscription_repository::{
    CreateSubscription, SubscriptionFilter, UpdateSubscription,
};
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// customer_subscriptions.stripe_subscription_id の列長
pub const MAX_STRIPE_SUBSCRIPTION_ID_LENGTH: usize = 255;

// --- レスポンスDTO ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSubscriptionDto {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub subscription_plan_id: Uuid,
    pub status: String,
    pub billing_period: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerSubscription> for CustomerSubscriptionDto {
    fn from(subscription: CustomerSubscription) -> Self {
        Self {
            id: subscription.id,
            customer_id: subscription.customer_id,
            subscription_plan_id: subscription.subscription_plan_id,
            status: subscription.status,
            billing_period: subscription.billing_period,
            current_period_start: subscription.current_period_start,
            current_period_end: subscription.current_period_end,
            cancel_at_period_end: subscription.cancel_at_period_end,
            cancelled_at: subscription.cancelled_at,
            stripe_subscription_id: subscription.stripe_subscription_id,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSubscriptionListResponse {
    pub customer_subscriptions: Vec<CustomerSubscriptionDto>,
}

impl From<Vec<CustomerSubscription>> for CustomerSubscriptionListResponse {
    fn from(subscriptions: Vec<CustomerSubscription>) -> Self {
        Self {
            customer_subscriptions: subscriptions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSubscriptionResponse {
    pub customer_subscription: CustomerSubscriptionDto,
}

impl From<CustomerSubscription> for CustomerSubscriptionResponse {
    fn from(subscription: CustomerSubscription) -> Self {
        Self {
            customer_subscription: subscription.into(),
        }
    }
}

// --- クエリ ---

/// 管理画面のサブスクリプション一覧クエリ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionListQuery {
    pub customer_id: Option<String>,
    pub status: Option<String>,
    pub subscription_plan_id: Option<String>,
}

impl SubscriptionListQuery {
    pub fn into_filter(self) -> AppResult<SubscriptionFilter> {
        let mut errors = Vec::new();

        let customer_id = non_empty(self.customer_id)
            .and_then(|raw| uuid_or_error("customer_id", &raw, &mut errors));
        let subscription_plan_id = non_empty(self.subscription_plan_id)
            .and_then(|raw| uuid_or_error("subscription_plan_id", &raw, &mut errors));
        let status = non_empty(self.status)
            .and_then(|raw| status_or_error(&raw, &mut errors));

        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        Ok(SubscriptionFilter {
            customer_id,
            status,
            subscription_plan_id,
        })
    }
}

// --- リクエストDTO ---

/// サブスクリプション作成リクエスト
///
/// ストア経由の場合 `customer_id` は無視され、ログイン中の顧客が使われる。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomerSubscriptionRequest {
    pub customer_id: Option<Uuid>,
    pub subscription_plan_id: Option<Uuid>,
    pub status: Option<String>,
    pub billing_period: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: Option<bool>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub stripe_subscription_id: Option<String>,
}

impl CreateCustomerSubscriptionRequest {
    /// 管理画面からの作成（customer_id 必須）
    pub fn into_admin_create(self, now: DateTime<Utc>) -> AppResult<CreateSubscription> {
        let customer_id = self.customer_id;
        self.build(customer_id, now)
    }

    /// ストアからの作成（customer_id は呼び出し元の顧客）
    pub fn into_store_create(
        self,
        customer_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<CreateSubscription> {
        self.build(Some(customer_id), now)
    }

    fn build(self, customer_id: Option<Uuid>, now: DateTime<Utc>) -> AppResult<CreateSubscription> {
        let mut errors = Vec::new();

        if customer_id.is_none() {
            errors.push("customer_id is required".to_string());
        }
        if self.subscription_plan_id.is_none() {
            errors.push("subscription_plan_id is required".to_string());
        }

        let billing_period = match non_empty(self.billing_period) {
            None => {
                errors.push("billing_period is required".to_string());
                None
            }
            Some(raw) => billing_period_or_error(&raw, &mut errors),
        };

        let status = match non_empty(self.status) {
            None => Some(SubscriptionStatus::default()),
            Some(raw) => status_or_error(&raw, &mut errors),
        };

        let stripe_subscription_id = non_empty(self.stripe_subscription_id);
        if let Some(id) = &stripe_subscription_id {
            check_stripe_id_length(id, &mut errors);
        }

        let (Some(customer_id), Some(subscription_plan_id), Some(billing_period), Some(status)) =
            (customer_id, self.subscription_plan_id, billing_period, status)
        else {
            return Err(AppError::ValidationErrors(errors));
        };
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        // 開始日の既定は現在時刻、終了日の既定は開始日 + 1請求期間
        let current_period_start = self.current_period_start.unwrap_or(now);
        let current_period_end = self
            .current_period_end
            .unwrap_or_else(|| billing_period.period_end_from(current_period_start));

        Ok(CreateSubscription {
            customer_id,
            subscription_plan_id,
            status,
            billing_period,
            current_period_start,
            current_period_end,
            cancel_at_period_end: self.cancel_at_period_end.unwrap_or(false),
            cancelled_at: self.cancelled_at,
            stripe_subscription_id,
        })
    }
}

/// サブスクリプション更新リクエスト
///
/// `cancelled_at` と `stripe_subscription_id` は null で解除できる
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomerSubscriptionRequest {
    pub status: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub cancelled_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub stripe_subscription_id: Option<Option<String>>,
}

impl UpdateCustomerSubscriptionRequest {
    pub fn into_update(self) -> AppResult<UpdateSubscription> {
        let mut errors = Vec::new();

        let status = self
            .status
            .as_deref()
            .and_then(|raw| status_or_error(raw, &mut errors));

        if let Some(Some(id)) = &self.stripe_subscription_id {
            check_stripe_id_length(id, &mut errors);
        }

        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        Ok(UpdateSubscription {
            status,
            current_period_start: self.current_period_start,
            current_period_end: self.current_period_end,
            cancel_at_period_end: self.cancel_at_period_end,
            cancelled_at: self.cancelled_at,
            stripe_subscription_id: self.stripe_subscription_id,
        })
    }
}

/// キャンセルリクエスト（ボディ省略可、既定は期間終了時キャンセル）
#[derive(Debug, Clone, Deserialize)]
pub struct CancelSubscriptionRequest {
    #[serde(default = "default_cancel_at_period_end")]
    pub cancel_at_period_end: bool,
}

impl Default for CancelSubscriptionRequest {
    fn default() -> Self {
        Self {
            cancel_at_period_end: default_cancel_at_period_end(),
        }
    }
}

fn default_cancel_at_period_end() -> bool {
    true
}

impl CancelSubscriptionRequest {
    /// 空ボディは既定値として扱う
    pub fn from_body(body: &Bytes) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid cancel request body: {}", e)))
    }
}

fn uuid_or_error(field: &str, raw: &str, errors: &mut Vec<String>) -> Option<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| errors.push(format!("{}: '{}' is not a valid UUID", field, raw)))
        .ok()
}

fn check_stripe_id_length(id: &str, errors: &mut Vec<String>) {
    if id.chars().count() > MAX_STRIPE_SUBSCRIPTION_ID_LENGTH {
        errors.push(format!(
            "stripe_subscription_id: must be at most {} characters",
            MAX_STRIPE_SUBSCRIPTION_ID_LENGTH
        ));
    }
}

fn status_or_error(raw: &str, errors: &mut Vec<String>) -> Option<SubscriptionStatus> {
    raw.parse::<SubscriptionStatus>()
        .map_err(|e| errors.push(format!("status: {}", e)))
        .ok()
}

fn billing_period_or_error(raw: &str, errors: &mut Vec<String>) -> Option<BillingPeriod> {
    raw.parse::<BillingPeriod>()
        .map_err(|e| errors.push(format!("billing_period: {}", e)))
        .ok()
}
