// src/repository/subscription_plan_repository.rs

use crate::domain::subscription_plan_model::{
    self, ActiveModel as PlanActiveModel, Entity as PlanEntity, PlanFeatures,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DbConn, DbErr, Set};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SubscriptionPlanRepository {
    db: DbConn,
}

impl SubscriptionPlanRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// 論理削除されていないプランのみを対象にするベースクエリ
    fn live() -> Select<PlanEntity> {
        PlanEntity::find().filter(subscription_plan_model::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<subscription_plan_model::Model>, DbErr> {
        Self::live()
            .filter(subscription_plan_model::Column::Id.eq(id))
            .one(&self.db)
            .await
    }

    /// フィルタ条件をSQLに組み込んで取得
    pub async fn find_with_filter(
        &self,
        filter: &PlanFilter,
    ) -> Result<Vec<subscription_plan_model::Model>, DbErr> {
        let mut conditions = Condition::all();

        if let Some(class_level) = &filter.class_level {
            conditions =
                conditions.add(subscription_plan_model::Column::ClassLevel.eq(class_level.as_str()));
        }

        if let Some(is_active) = filter.is_active {
            conditions = conditions.add(subscription_plan_model::Column::IsActive.eq(is_active));
        }

        Self::live()
            .filter(conditions)
            .order_by_asc(subscription_plan_model::Column::CreatedAt)
            .order_by_asc(subscription_plan_model::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn create(
        &self,
        create_plan: CreatePlan,
    ) -> Result<subscription_plan_model::Model, DbErr> {
        let new_plan = PlanActiveModel {
            name: Set(create_plan.name),
            description: Set(create_plan.description),
            class_level: Set(create_plan.class_level),
            monthly_price: Set(create_plan.monthly_price),
            yearly_price: Set(create_plan.yearly_price),
            currency_code: Set(create_plan.currency_code),
            features: Set(PlanFeatures(create_plan.features)),
            is_active: Set(create_plan.is_active),
            ..ActiveModelBehavior::new()
        };

        new_plan.insert(&self.db).await
    }

    /// 指定されたフィールドのみ更新（存在しない場合はNone）
    pub async fn update(
        &self,
        id: Uuid,
        update_plan: UpdatePlan,
    ) -> Result<Option<subscription_plan_model::Model>, DbErr> {
        let Some(plan) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active_model: PlanActiveModel = plan.into();

        if let Some(name) = update_plan.name {
            active_model.name = Set(name);
        }
        if let Some(description) = update_plan.description {
            active_model.description = Set(description);
        }
        if let Some(class_level) = update_plan.class_level {
            active_model.class_level = Set(class_level);
        }
        if let Some(monthly_price) = update_plan.monthly_price {
            active_model.monthly_price = Set(monthly_price);
        }
        if let Some(yearly_price) = update_plan.yearly_price {
            active_model.yearly_price = Set(yearly_price);
        }
        if let Some(currency_code) = update_plan.currency_code {
            active_model.currency_code = Set(currency_code);
        }
        if let Some(features) = update_plan.features {
            active_model.features = Set(PlanFeatures(features));
        }
        if let Some(is_active) = update_plan.is_active {
            active_model.is_active = Set(is_active);
        }

        // 変更フィールドがなくても UPDATE 対象の列を確保する
        active_model.updated_at = Set(Utc::now());
        active_model.update(&self.db).await.map(Some)
    }

    /// 論理削除（deleted_at を設定）。対象が存在しなければfalse
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = PlanEntity::update_many()
            .col_expr(subscription_plan_model::Column::DeletedAt, Expr::value(now))
            .col_expr(subscription_plan_model::Column::UpdatedAt, Expr::value(now))
            .filter(subscription_plan_model::Column::Id.eq(id))
            .filter(subscription_plan_model::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

/// プラン一覧の絞り込み条件（すべて等価比較、AND結合）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanFilter {
    pub class_level: Option<String>,
    pub is_active: Option<bool>,
}

/// プラン作成用構造体（価格は最小単位）
#[derive(Debug, Clone)]
pub struct CreatePlan {
    pub name: String,
    pub description: String,
    pub class_level: String,
    pub monthly_price: i64,
    pub yearly_price: i64,
    pub currency_code: String,
    pub features: Vec<String>,
    pub is_active: bool,
}

/// プラン更新用構造体
#[derive(Debug, Clone, Default)]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub class_level: Option<String>,
    pub monthly_price: Option<i64>,
    pub yearly_price: Option<i64>,
    pub currency_code: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
