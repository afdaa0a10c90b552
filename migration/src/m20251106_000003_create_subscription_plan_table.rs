use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 価格は通貨の最小単位（USDならセント）で保持する
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlan::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::Name)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::ClassLevel)
                            .string_len(100)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::MonthlyPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::YearlyPrice)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::CurrencyCode)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::Features)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 論理削除されていない行だけを対象にした部分インデックス
        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE INDEX IF NOT EXISTS "idx_subscription_plan_deleted_at" ON "subscription_plan" (deleted_at) WHERE deleted_at IS NULL"#,
            )
            .await?;

        // ストア向け一覧（is_active + class_level）の絞り込み用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(SubscriptionPlan::Table)
                    .name("idx_subscription_plan_active_class_level")
                    .col(SubscriptionPlan::IsActive)
                    .col(SubscriptionPlan::ClassLevel)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .table(SubscriptionPlan::Table)
                    .name("idx_subscription_plan_active_class_level")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .table(SubscriptionPlan::Table)
                    .name("idx_subscription_plan_deleted_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SubscriptionPlan::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SubscriptionPlan {
    Table,
    Id,
    Name,
    Description,
    ClassLevel,
    MonthlyPrice,
    YearlyPrice,
    CurrencyCode,
    Features,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
