use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ストアフロントの顧客アカウント
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Customers::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Customers::FirstName).string_len(100).null())
                    .col(ColumnDef::new(Customers::LastName).string_len(100).null())
                    // 登録済み顧客は常に true（ゲスト購入者の区別用）
                    .col(ColumnDef::new(Customers::HasAccount).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Customers::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"ALTER TABLE "customers" ADD CONSTRAINT "chk_customers_email_lowercase" CHECK (email = lower(email))"#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    HasAccount,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
