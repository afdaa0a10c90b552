// src/lib.rs
pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod repository;
pub mod service;
pub mod utils;

/// tracing の初期化（RUST_LOG 未設定時の既定フィルタ付き）
pub fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // 二重初期化はエラーになるだけなので無視する
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subscription_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .try_init();
}
