// src/repository/user_repository.rs

use crate::domain::user_model::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{DbConn, DbErr, QueryFilter, Set};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    // --- 基本検索 ---

    /// ユーザーをIDで検索（論理削除済みは除外）
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id)
            .filter(user_model::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    /// ユーザーをメールアドレスで検索
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::Email.eq(email))
            .filter(user_model::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    // --- 作成・更新 ---

    /// 同じメールアドレスが存在しなければ挿入する。挿入した場合のみtrue
    ///
    /// 一意制約に対する `ON CONFLICT DO NOTHING` なので同時実行でも重複しない。
    pub async fn insert_if_absent(&self, new_user: NewUser) -> Result<bool, DbErr> {
        let active_model = UserActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            deleted_at: Set(None),
        };

        let inserted = UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(user_model::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn update_password_hash(
        &self,
        email: &str,
        password_hash: String,
    ) -> Result<bool, DbErr> {
        let result = UserEntity::update_many()
            .col_expr(user_model::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user_model::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user_model::Column::Email.eq(email))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// 最終ログイン日時を更新
    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), DbErr> {
        UserEntity::update_many()
            .col_expr(user_model::Column::LastLoginAt, Expr::value(Utc::now()))
            .filter(user_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
