// src/main.rs
use migration::{Migrator, MigratorTrait};
use subscription_backend::api::{create_router, AppState};
use subscription_backend::config::Config;
use subscription_backend::service::expiry_sweeper::spawn_expiry_sweeper;
use subscription_backend::{db, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    tracing::info!("Starting Subscription Backend server...");

    // 設定を読み込む
    let app_config = Config::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        addr = %app_config.server_addr(),
        "Configuration loaded"
    );

    // データベース接続を作成（DB_SCHEMA 指定時はスキーマも用意）
    let db_pool = db::connect(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    if app_config.run_migrations {
        Migrator::up(&db_pool, None).await?;
        tracing::info!("Migrations applied.");
    }

    let app_state = AppState::new(db_pool, &app_config)?;

    // 期限切れスイープ
    let sweeper = spawn_expiry_sweeper(
        app_state.subscription_service.clone(),
        &app_config.sweep,
    );

    let app_router = create_router(app_state);

    let listener = TcpListener::bind(app_config.server_addr()).await?;
    tracing::info!("Router configured. Server listening on {}", app_config.server_addr());

    axum::serve(listener, app_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("Server stopped.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
