// src/service/subscription_service.rs

use crate::db::DbPool;
use crate::domain::customer_subscription_model::Model as CustomerSubscription;
use crate::domain::subscription_plan_model::Model as SubscriptionPlan;
use crate::domain::subscription_status::SubscriptionStatus;
use crate::error::{AppError, AppResult};
use crate::repository::customer_subscription_repository::{
    CreateSubscription, CustomerSubscriptionRepository, SubscriptionFilter, UpdateSubscription,
};
use crate::repository::subscription_plan_repository::{
    CreatePlan, PlanFilter, SubscriptionPlanRepository, UpdatePlan,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// プランと顧客サブスクリプションのCRUDおよび状態遷移
///
/// 入力の検証はルート境界で済んでいる前提で、ここでは永続化のみを行う。
#[derive(Clone)]
pub struct SubscriptionService {
    plan_repo: Arc<SubscriptionPlanRepository>,
    subscription_repo: Arc<CustomerSubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(db: DbPool) -> Self {
        let plan_repo = Arc::new(SubscriptionPlanRepository::new(db.clone()));
        let subscription_repo = Arc::new(CustomerSubscriptionRepository::new(db));

        Self {
            plan_repo,
            subscription_repo,
        }
    }

    // --- プラン ---

    pub async fn list_plans(&self, filter: &PlanFilter) -> AppResult<Vec<SubscriptionPlan>> {
        Ok(self.plan_repo.find_with_filter(filter).await?)
    }

    pub async fn get_plan(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>> {
        Ok(self.plan_repo.find_by_id(id).await?)
    }

    pub async fn create_plan(&self, data: CreatePlan) -> AppResult<SubscriptionPlan> {
        let plan = self.plan_repo.create(data).await?;
        info!(plan_id = %plan.id, name = %plan.name, "Subscription plan created");
        Ok(plan)
    }

    pub async fn update_plan(&self, id: Uuid, data: UpdatePlan) -> AppResult<SubscriptionPlan> {
        self.plan_repo
            .update(id, data)
            .await?
            .ok_or_else(|| plan_not_found(id))
    }

    pub async fn delete_plan(&self, id: Uuid) -> AppResult<()> {
        if !self.plan_repo.soft_delete(id).await? {
            return Err(plan_not_found(id));
        }
        info!(plan_id = %id, "Subscription plan soft-deleted");
        Ok(())
    }

    // --- 顧客サブスクリプション ---

    pub async fn list_subscriptions(
        &self,
        filter: &SubscriptionFilter,
    ) -> AppResult<Vec<CustomerSubscription>> {
        Ok(self.subscription_repo.find_with_filter(filter).await?)
    }

    pub async fn get_subscription(&self, id: Uuid) -> AppResult<Option<CustomerSubscription>> {
        Ok(self.subscription_repo.find_by_id(id).await?)
    }

    pub async fn get_subscriptions_by_customer_id(
        &self,
        customer_id: Uuid,
    ) -> AppResult<Vec<CustomerSubscription>> {
        self.list_subscriptions(&SubscriptionFilter::for_customer(customer_id))
            .await
    }

    /// プランの存在確認は行わない
    pub async fn create_subscription(
        &self,
        data: CreateSubscription,
    ) -> AppResult<CustomerSubscription> {
        let subscription = self.subscription_repo.create(data).await?;
        info!(
            subscription_id = %subscription.id,
            customer_id = %subscription.customer_id,
            plan_id = %subscription.subscription_plan_id,
            "Customer subscription created"
        );
        Ok(subscription)
    }

    pub async fn update_subscription(
        &self,
        id: Uuid,
        data: UpdateSubscription,
    ) -> AppResult<CustomerSubscription> {
        self.subscription_repo
            .update(id, data)
            .await?
            .ok_or_else(|| subscription_not_found(id))
    }

    /// キャンセル
    ///
    /// `cancel_at_period_end = true` なら予約のみ（ステータスは変えない）。
    /// `false` なら即時に `cancelled` へ遷移する。
    pub async fn cancel_subscription(
        &self,
        id: Uuid,
        cancel_at_period_end: bool,
    ) -> AppResult<CustomerSubscription> {
        let update = if cancel_at_period_end {
            UpdateSubscription {
                cancel_at_period_end: Some(true),
                ..Default::default()
            }
        } else {
            UpdateSubscription {
                status: Some(SubscriptionStatus::Cancelled),
                cancelled_at: Some(Some(Utc::now())),
                cancel_at_period_end: Some(false),
                ..Default::default()
            }
        };

        let subscription = self.update_subscription(id, update).await?;
        info!(
            subscription_id = %id,
            cancel_at_period_end,
            status = %subscription.status,
            "Customer subscription cancelled"
        );
        Ok(subscription)
    }

    pub async fn pause_subscription(&self, id: Uuid) -> AppResult<CustomerSubscription> {
        self.set_status(id, SubscriptionStatus::Paused).await
    }

    pub async fn resume_subscription(&self, id: Uuid) -> AppResult<CustomerSubscription> {
        self.set_status(id, SubscriptionStatus::Active).await
    }

    pub async fn delete_subscription(&self, id: Uuid) -> AppResult<()> {
        if !self.subscription_repo.soft_delete(id).await? {
            return Err(subscription_not_found(id));
        }
        info!(subscription_id = %id, "Customer subscription soft-deleted");
        Ok(())
    }

    /// 期間終了時キャンセルの期限が来たものを expired にする。変更件数を返す
    pub async fn expire_due_subscriptions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let expired = self.subscription_repo.expire_due(now).await?;
        if expired > 0 {
            info!(expired, "Expired subscriptions past their period end");
        }
        Ok(expired)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> AppResult<CustomerSubscription> {
        let subscription = self
            .update_subscription(
                id,
                UpdateSubscription {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;
        info!(subscription_id = %id, status = %status, "Customer subscription status changed");
        Ok(subscription)
    }
}

fn plan_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Subscription plan with id {} not found", id))
}

fn subscription_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Customer subscription with id {} not found", id))
}
