// src/repository/customer_repository.rs

use crate::domain::customer_model::{
    self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity,
};
use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter, Set};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DbConn,
}

impl CustomerRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<customer_model::Model>, DbErr> {
        CustomerEntity::find_by_id(id)
            .filter(customer_model::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<customer_model::Model>, DbErr> {
        CustomerEntity::find()
            .filter(customer_model::Column::Email.eq(email))
            .filter(customer_model::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    /// 顧客を作成（メールアドレスの一意制約違反はDbErrとして返る）
    pub async fn create(&self, new_customer: NewCustomer) -> Result<customer_model::Model, DbErr> {
        let now = Utc::now();
        let active_model = CustomerActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_customer.email),
            password_hash: Set(new_customer.password_hash),
            first_name: Set(new_customer.first_name),
            last_name: Set(new_customer.last_name),
            has_account: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        active_model.insert(&self.db).await
    }
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
