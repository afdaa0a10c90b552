// src/api/dto/subscription_plan_dto.rs

use super::common::{double_option, non_empty};
use crate::domain::money::{minor_to_major, normalize_currency_code, parse_price};
use crate::domain::subscription_plan_model::Model as SubscriptionPlan;
use crate::error::AppError;
use crate::repository::subscription_plan_repository::{CreatePlan, PlanFilter, UpdatePlan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const MAX_PLAN_NAME_LENGTH: usize = 200;
pub const MAX_CLASS_LEVEL_LENGTH: usize = 100;
pub const DEFAULT_CURRENCY_CODE: &str = "USD";

// --- レスポンスDTO ---

/// プラン（価格は主単位の小数）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlanDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub class_level: String,
    pub monthly_price: f64,
    pub yearly_price: f64,
    pub currency_code: String,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionPlan> for SubscriptionPlanDto {
    fn from(plan: SubscriptionPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            description: plan.description,
            class_level: plan.class_level,
            monthly_price: minor_to_major(plan.monthly_price),
            yearly_price: minor_to_major(plan.yearly_price),
            currency_code: plan.currency_code,
            features: plan.features.0,
            is_active: plan.is_active,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlanListResponse {
    pub subscription_plans: Vec<SubscriptionPlanDto>,
}

impl From<Vec<SubscriptionPlan>> for SubscriptionPlanListResponse {
    fn from(plans: Vec<SubscriptionPlan>) -> Self {
        Self {
            subscription_plans: plans.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlanResponse {
    pub subscription_plan: SubscriptionPlanDto,
}

impl From<SubscriptionPlan> for SubscriptionPlanResponse {
    fn from(plan: SubscriptionPlan) -> Self {
        Self {
            subscription_plan: plan.into(),
        }
    }
}

// --- クエリ ---

/// 管理画面のプラン一覧クエリ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminPlanListQuery {
    pub class_level: Option<String>,
    pub is_active: Option<String>,
}

impl AdminPlanListQuery {
    /// `is_active` は値が文字列 "true" のときだけ true
    pub fn into_filter(self) -> PlanFilter {
        PlanFilter {
            class_level: non_empty(self.class_level),
            is_active: self.is_active.map(|v| v == "true"),
        }
    }
}

/// ストアのプラン一覧クエリ（is_active は常に true 固定）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorePlanListQuery {
    pub class_level: Option<String>,
}

impl StorePlanListQuery {
    pub fn into_filter(self) -> PlanFilter {
        PlanFilter {
            class_level: non_empty(self.class_level),
            is_active: Some(true),
        }
    }
}

// --- リクエストDTO ---

/// プラン作成リクエスト
///
/// 価格は数値または数値文字列を受け付ける
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubscriptionPlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub class_level: Option<String>,
    pub monthly_price: Option<Value>,
    pub yearly_price: Option<Value>,
    pub currency_code: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl CreateSubscriptionPlanRequest {
    pub fn into_create_plan(self) -> Result<CreatePlan, AppError> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Plan name is required".to_string());
                String::new()
            }
            Some(name) => {
                check_name_length(name, &mut errors);
                name.to_string()
            }
        };

        // 0 は未指定と同じ扱い
        let monthly_price = match self.monthly_price.as_ref().filter(|v| !v.is_null()) {
            None => {
                errors.push("Valid monthly price is required".to_string());
                0
            }
            Some(value) => match parse_price(value) {
                Ok(0) => {
                    errors.push("Valid monthly price is required".to_string());
                    0
                }
                Ok(price) => price,
                Err(e) => {
                    errors.push(format!("monthly_price: {}", e));
                    0
                }
            },
        };

        let yearly_price = self
            .yearly_price
            .as_ref()
            .filter(|v| !v.is_null())
            .map_or(0, |value| price_or_error("yearly_price", value, &mut errors));

        let currency_code = match self.currency_code.as_deref() {
            None => DEFAULT_CURRENCY_CODE.to_string(),
            Some(code) => currency_or_error(code, &mut errors),
        };

        if let Some(class_level) = &self.class_level {
            check_class_level_length(class_level, &mut errors);
        }

        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        Ok(CreatePlan {
            name,
            description: self.description.unwrap_or_default(),
            class_level: self.class_level.unwrap_or_default(),
            monthly_price,
            yearly_price,
            currency_code,
            features: self.features.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// プラン更新リクエスト（指定されたフィールドのみ更新）
///
/// 価格に null を渡すと不正な価格として扱う
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionPlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub class_level: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub monthly_price: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub yearly_price: Option<Option<Value>>,
    pub currency_code: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl UpdateSubscriptionPlanRequest {
    pub fn into_update_plan(self) -> Result<UpdatePlan, AppError> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().map(str::trim).map(|name| {
            if name.is_empty() {
                errors.push("Plan name cannot be empty".to_string());
            }
            check_name_length(name, &mut errors);
            name.to_string()
        });

        let monthly_price = self
            .monthly_price
            .as_ref()
            .map(|value| supplied_price_or_error("monthly_price", value.as_ref(), &mut errors));

        let yearly_price = self
            .yearly_price
            .as_ref()
            .map(|value| supplied_price_or_error("yearly_price", value.as_ref(), &mut errors));

        if let Some(class_level) = &self.class_level {
            check_class_level_length(class_level, &mut errors);
        }

        let currency_code = self
            .currency_code
            .as_deref()
            .map(|code| currency_or_error(code, &mut errors));

        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        Ok(UpdatePlan {
            name,
            description: self.description,
            class_level: self.class_level,
            monthly_price,
            yearly_price,
            currency_code,
            features: self.features,
            is_active: self.is_active,
        })
    }
}

fn check_name_length(name: &str, errors: &mut Vec<String>) {
    if name.chars().count() > MAX_PLAN_NAME_LENGTH {
        errors.push(format!(
            "name: must be at most {} characters",
            MAX_PLAN_NAME_LENGTH
        ));
    }
}

fn check_class_level_length(class_level: &str, errors: &mut Vec<String>) {
    if class_level.chars().count() > MAX_CLASS_LEVEL_LENGTH {
        errors.push(format!(
            "class_level: must be at most {} characters",
            MAX_CLASS_LEVEL_LENGTH
        ));
    }
}

/// 更新時に指定された価格（null は拒否）
fn supplied_price_or_error(field: &str, value: Option<&Value>, errors: &mut Vec<String>) -> i64 {
    match value {
        Some(value) => price_or_error(field, value, errors),
        None => {
            errors.push(format!("{}: price must be a number", field));
            0
        }
    }
}

fn price_or_error(field: &str, value: &Value, errors: &mut Vec<String>) -> i64 {
    parse_price(value).unwrap_or_else(|e| {
        errors.push(format!("{}: {}", field, e));
        0
    })
}

fn currency_or_error(code: &str, errors: &mut Vec<String>) -> String {
    normalize_currency_code(code).unwrap_or_else(|e| {
        errors.push(format!("currency_code: {}", e));
        String::new()
    })
}
