// src/service/expiry_sweeper.rs
//
// 期間終了時キャンセルが予約されたサブスクリプションを定期的に expired へ移す

use crate::config::SweepSettings;
use crate::service::subscription_service::SubscriptionService;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// スイープを1回実行（失敗はログに残して握りつぶす）
pub async fn sweep_once(service: &SubscriptionService) -> u64 {
    match service.expire_due_subscriptions(Utc::now()).await {
        Ok(expired) => expired,
        Err(e) => {
            error!(error = %e, "Subscription expiry sweep failed");
            0
        }
    }
}

/// バックグラウンドタスクとして起動。無効化されている場合はNone
pub fn spawn_expiry_sweeper(
    service: Arc<SubscriptionService>,
    settings: &SweepSettings,
) -> Option<JoinHandle<()>> {
    if !settings.is_enabled() {
        info!("Subscription expiry sweeper disabled");
        return None;
    }

    let period = Duration::from_secs(settings.interval_secs);
    info!(interval_secs = settings.interval_secs, "Starting subscription expiry sweeper");

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            sweep_once(&service).await;
        }
    }))
}
