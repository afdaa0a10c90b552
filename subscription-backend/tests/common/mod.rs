// tests/common/mod.rs

pub mod auth_helper;
pub mod db;

use std::sync::Once;

static INIT: Once = Once::new();

/// テスト環境の初期化（tracing は一度だけ設定する）
pub fn init_test_env() {
    INIT.call_once(|| {
        dotenvy::from_filename(".env.test").ok();

        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "subscription_backend=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
