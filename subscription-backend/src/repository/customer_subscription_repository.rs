// src/repository/customer_subscription_repository.rs

use crate::domain::customer_subscription_model::{
    self, ActiveModel as SubscriptionActiveModel, Entity as SubscriptionEntity,
};
use crate::domain::subscription_status::SubscriptionStatus;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DbConn, DbErr, Set};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CustomerSubscriptionRepository {
    db: DbConn,
}

impl CustomerSubscriptionRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn live() -> Select<SubscriptionEntity> {
        SubscriptionEntity::find()
            .filter(customer_subscription_model::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<customer_subscription_model::Model>, DbErr> {
        Self::live()
            .filter(customer_subscription_model::Column::Id.eq(id))
            .one(&self.db)
            .await
    }

    pub async fn find_with_filter(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<customer_subscription_model::Model>, DbErr> {
        let mut conditions = Condition::all();

        // 顧客フィルタ
        if let Some(customer_id) = filter.customer_id {
            conditions =
                conditions.add(customer_subscription_model::Column::CustomerId.eq(customer_id));
        }

        // ステータスフィルタ
        if let Some(status) = filter.status {
            conditions =
                conditions.add(customer_subscription_model::Column::Status.eq(status.as_str()));
        }

        // プランフィルタ
        if let Some(plan_id) = filter.subscription_plan_id {
            conditions = conditions
                .add(customer_subscription_model::Column::SubscriptionPlanId.eq(plan_id));
        }

        Self::live()
            .filter(conditions)
            .order_by_asc(customer_subscription_model::Column::CreatedAt)
            .order_by_asc(customer_subscription_model::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn create(
        &self,
        create_subscription: CreateSubscription,
    ) -> Result<customer_subscription_model::Model, DbErr> {
        let new_subscription = SubscriptionActiveModel {
            customer_id: Set(create_subscription.customer_id),
            subscription_plan_id: Set(create_subscription.subscription_plan_id),
            status: Set(create_subscription.status.into()),
            billing_period: Set(create_subscription.billing_period.into()),
            current_period_start: Set(create_subscription.current_period_start),
            current_period_end: Set(create_subscription.current_period_end),
            cancel_at_period_end: Set(create_subscription.cancel_at_period_end),
            cancelled_at: Set(create_subscription.cancelled_at),
            stripe_subscription_id: Set(create_subscription.stripe_subscription_id),
            ..ActiveModelBehavior::new()
        };

        new_subscription.insert(&self.db).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        update_subscription: UpdateSubscription,
    ) -> Result<Option<customer_subscription_model::Model>, DbErr> {
        let Some(subscription) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active_model: SubscriptionActiveModel = subscription.into();

        if let Some(status) = update_subscription.status {
            active_model.status = Set(status.into());
        }
        if let Some(current_period_start) = update_subscription.current_period_start {
            active_model.current_period_start = Set(current_period_start);
        }
        if let Some(current_period_end) = update_subscription.current_period_end {
            active_model.current_period_end = Set(current_period_end);
        }
        if let Some(cancel_at_period_end) = update_subscription.cancel_at_period_end {
            active_model.cancel_at_period_end = Set(cancel_at_period_end);
        }
        // Some(None) は明示的なクリア
        if let Some(cancelled_at) = update_subscription.cancelled_at {
            active_model.cancelled_at = Set(cancelled_at);
        }
        if let Some(stripe_subscription_id) = update_subscription.stripe_subscription_id {
            active_model.stripe_subscription_id = Set(stripe_subscription_id);
        }

        active_model.updated_at = Set(Utc::now());
        active_model.update(&self.db).await.map(Some)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = SubscriptionEntity::update_many()
            .col_expr(customer_subscription_model::Column::DeletedAt, Expr::value(now))
            .col_expr(customer_subscription_model::Column::UpdatedAt, Expr::value(now))
            .filter(customer_subscription_model::Column::Id.eq(id))
            .filter(customer_subscription_model::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// 期間終了時キャンセルが予約され、期間が過ぎたサブスクリプションを expired にする
    pub async fn expire_due(&self, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let live_statuses = SubscriptionStatus::all()
            .into_iter()
            .filter(SubscriptionStatus::is_live)
            .map(|s| s.as_str())
            .collect::<Vec<_>>();

        let result = SubscriptionEntity::update_many()
            .col_expr(
                customer_subscription_model::Column::Status,
                Expr::value(SubscriptionStatus::Expired.as_str()),
            )
            .col_expr(customer_subscription_model::Column::UpdatedAt, Expr::value(now))
            .filter(customer_subscription_model::Column::DeletedAt.is_null())
            .filter(customer_subscription_model::Column::CancelAtPeriodEnd.eq(true))
            .filter(customer_subscription_model::Column::Status.is_in(live_statuses))
            .filter(customer_subscription_model::Column::CurrentPeriodEnd.lte(now))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

/// サブスクリプション一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<SubscriptionStatus>,
    pub subscription_plan_id: Option<Uuid>,
}

impl SubscriptionFilter {
    pub fn for_customer(customer_id: Uuid) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }
}

/// サブスクリプション作成用構造体
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub customer_id: Uuid,
    pub subscription_plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub billing_period: crate::domain::billing_period::BillingPeriod,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub stripe_subscription_id: Option<String>,
}

/// サブスクリプション更新用構造体
///
/// `cancelled_at` と `stripe_subscription_id` は `Some(None)` で NULL に戻せる。
#[derive(Debug, Clone, Default)]
pub struct UpdateSubscription {
    pub status: Option<SubscriptionStatus>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: Option<bool>,
    pub cancelled_at: Option<Option<DateTime<Utc>>>,
    pub stripe_subscription_id: Option<Option<String>>,
}
