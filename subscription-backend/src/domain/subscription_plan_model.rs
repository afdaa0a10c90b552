// src/domain/subscription_plan_model.rs
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};

/// プランの特典一覧（jsonb 配列として保存、順序を保持）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PlanFeatures(pub Vec<String>);

impl From<Vec<String>> for PlanFeatures {
    fn from(features: Vec<String>) -> Self {
        Self(features)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription_plan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub class_level: String,
    /// 最小単位（セント）
    pub monthly_price: i64,
    /// 最小単位（セント）
    pub yearly_price: i64,
    pub currency_code: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub features: PlanFeatures,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            deleted_at: Set(None),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            // 更新の場合のみ updated_at を更新
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// ストア（顧客向け）に公開してよいか
    pub fn is_visible_in_store(&self) -> bool {
        self.is_active && !self.is_deleted()
    }
}
