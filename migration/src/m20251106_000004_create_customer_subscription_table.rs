use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // customer_id / subscription_plan_id には外部キーを張らない
        manager
            .create_table(
                Table::create()
                    .table(CustomerSubscription::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerSubscription::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::CustomerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::SubscriptionPlanId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::BillingPeriod)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::CancelAtPeriodEnd)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::StripeSubscriptionId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CustomerSubscription::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE INDEX IF NOT EXISTS "idx_customer_subscription_deleted_at" ON "customer_subscription" (deleted_at) WHERE deleted_at IS NULL"#,
            )
            .await?;

        // 顧客ごとの一覧取得用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(CustomerSubscription::Table)
                    .name("idx_customer_subscription_customer_id")
                    .col(CustomerSubscription::CustomerId)
                    .to_owned(),
            )
            .await?;

        // 期限切れスイープ用: status + current_period_end
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(CustomerSubscription::Table)
                    .name("idx_customer_subscription_status_period_end")
                    .col(CustomerSubscription::Status)
                    .col(CustomerSubscription::CurrentPeriodEnd)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_customer_subscription_status_period_end",
            "idx_customer_subscription_customer_id",
            "idx_customer_subscription_deleted_at",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .if_exists()
                        .table(CustomerSubscription::Table)
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .drop_table(
                Table::drop()
                    .table(CustomerSubscription::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum CustomerSubscription {
    Table,
    Id,
    CustomerId,
    SubscriptionPlanId,
    Status,
    BillingPeriod,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CancelAtPeriodEnd,
    CancelledAt,
    StripeSubscriptionId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
