// src/db.rs
use crate::config::Config;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

fn connect_options(config: &Config) -> ConnectOptions {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    // 接続オプションを設定
    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(30 * 60))
        .sqlx_logging(false);

    opt
}

pub async fn create_db_pool(config: &Config) -> Result<DbPool, DbErr> {
    Database::connect(connect_options(config)).await
}

// スキーマを指定して接続するバージョン
pub async fn create_db_pool_with_schema(config: &Config, schema: &str) -> Result<DbPool, DbErr> {
    let mut opt = connect_options(config);
    opt.set_schema_search_path(schema.to_string());
    Database::connect(opt).await
}

// スキーマが存在するか確認するヘルパー関数
pub async fn schema_exists(conn: &DbPool, schema: &str) -> Result<bool, DbErr> {
    let result_opt = conn
        .query_one(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1) AS exists",
            [schema.into()],
        ))
        .await?;

    // 結果が存在すれば処理、なければfalseを返す
    if let Some(result) = result_opt {
        let exists: bool = result.try_get("", "exists")?;
        Ok(exists)
    } else {
        Ok(false)
    }
}

// スキーマを作成するヘルパー関数
pub async fn create_schema(conn: &DbPool, schema: &str) -> Result<(), DbErr> {
    let create_schema = format!(
        "CREATE SCHEMA IF NOT EXISTS \"{}\";",
        schema.replace('"', "")
    );
    conn.execute(Statement::from_string(
        sea_orm::DatabaseBackend::Postgres,
        create_schema,
    ))
    .await?;
    Ok(())
}

/// DB_SCHEMA の有無に応じて接続プールを作成する
pub async fn connect(config: &Config) -> Result<DbPool, DbErr> {
    match &config.db_schema {
        Some(schema) => {
            tracing::info!(schema = %schema, "Using schema");

            // まず基本接続を作成し、スキーマがなければ作成
            let base_pool = create_db_pool(config).await?;
            if !schema_exists(&base_pool, schema).await? {
                tracing::info!(schema = %schema, "Schema does not exist, creating it");
                create_schema(&base_pool, schema).await?;
            }
            base_pool.close().await?;

            create_db_pool_with_schema(config, schema).await
        }
        None => create_db_pool(config).await,
    }
}

/// ヘルスチェック用の疎通確認
pub async fn ping(conn: &DbPool) -> Result<(), DbErr> {
    conn.ping().await
}
