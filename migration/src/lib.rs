// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 認証関連マイグレーション
mod m20251106_000001_create_users_table;
mod m20251106_000002_create_customers_table;

// サブスクリプション関連マイグレーション
mod m20251106_000003_create_subscription_plan_table;
mod m20251106_000004_create_customer_subscription_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. アカウントテーブル（依存関係なし）
            Box::new(m20251106_000001_create_users_table::Migration),
            Box::new(m20251106_000002_create_customers_table::Migration),
            // 2. サブスクリプションモジュール
            Box::new(m20251106_000003_create_subscription_plan_table::Migration),
            Box::new(m20251106_000004_create_customer_subscription_table::Migration),
        ]
    }
}
