// src/bin/provision_admin.rs
//
// 管理者アカウントを冪等に作成するデプロイ用コマンド
//
//   ADMIN_EMAIL=... ADMIN_PASSWORD=... provision-admin [--reset-password]
use migration::{Migrator, MigratorTrait};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use subscription_backend::config::Config;
use subscription_backend::service::auth_service::{AuthService, ProvisionOutcome};
use subscription_backend::utils::jwt::JwtManager;
use subscription_backend::utils::password::PasswordManager;
use subscription_backend::{db, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Admin provisioning failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let app_config = Config::from_env()?;

    let email = required_env("ADMIN_EMAIL")?;
    let password = required_env("ADMIN_PASSWORD")?;
    let reset_password = env::args().any(|arg| arg == "--reset-password");

    let db_pool = db::connect(&app_config).await?;
    if app_config.run_migrations {
        Migrator::up(&db_pool, None).await?;
    }

    let auth_service = AuthService::new(
        db_pool,
        Arc::new(PasswordManager::new_default()?),
        Arc::new(JwtManager::new(app_config.jwt.clone())?),
    );

    match auth_service
        .provision_admin(&email, &password, reset_password)
        .await?
    {
        ProvisionOutcome::Created(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "Admin user created");
        }
        ProvisionOutcome::AlreadyExists(user) => {
            tracing::info!(
                user_id = %user.id,
                email = %user.email,
                password_reset = reset_password,
                "Admin user already exists"
            );
        }
    }

    Ok(())
}

fn required_env(name: &str) -> Result<String, String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| format!("{} must be set", name))
}
