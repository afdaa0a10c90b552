// src/service/auth_service.rs
use crate::db::DbPool;
use crate::domain::customer_model::Model as Customer;
use crate::domain::user_model::Model as User;
use crate::error::{AppError, AppResult};
use crate::repository::customer_repository::{CustomerRepository, NewCustomer};
use crate::repository::user_repository::{NewUser, UserRepository};
use crate::utils::jwt::{AccessTokenClaims, ActorType, JwtError, JwtManager};
use crate::utils::password::{PasswordError, PasswordManager};
use sea_orm::SqlErr;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 顧客登録の入力（検証済み）
#[derive(Debug, Clone)]
pub struct RegisterCustomer {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// 管理者プロビジョニングの結果
#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    Created(User),
    AlreadyExists(User),
}

impl ProvisionOutcome {
    pub fn user(&self) -> &User {
        match self {
            ProvisionOutcome::Created(user) | ProvisionOutcome::AlreadyExists(user) => user,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, ProvisionOutcome::Created(_))
    }
}

/// 認証サービス
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    customer_repo: Arc<CustomerRepository>,
    password_manager: Arc<PasswordManager>,
    jwt_manager: Arc<JwtManager>,
}

impl AuthService {
    pub fn new(
        db: DbPool,
        password_manager: Arc<PasswordManager>,
        jwt_manager: Arc<JwtManager>,
    ) -> Self {
        Self {
            user_repo: Arc::new(UserRepository::new(db.clone())),
            customer_repo: Arc::new(CustomerRepository::new(db)),
            password_manager,
            jwt_manager,
        }
    }

    // --- ログイン ---

    /// 管理画面オペレーターのログイン
    pub async fn login_user(&self, email: &str, password: &str) -> AppResult<(User, String)> {
        let email = normalize_email(email);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, actor_type = "user", "Login attempt with unknown email");
                invalid_credentials()
            })?;

        if !user.can_sign_in() {
            warn!(user_id = %user.id, "Login attempt for inactive user");
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        self.check_password(password, &user.password_hash, user.id)?;
        self.user_repo.touch_last_login(user.id).await?;

        let token = self.issue_token(user.id, ActorType::User, &user.email)?;
        info!(user_id = %user.id, "User signed in");
        Ok((user, token))
    }

    /// ストア顧客のログイン
    pub async fn login_customer(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<(Customer, String)> {
        let email = normalize_email(email);
        let customer = self
            .customer_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, actor_type = "customer", "Login attempt with unknown email");
                invalid_credentials()
            })?;

        if !customer.can_sign_in() {
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        self.check_password(password, &customer.password_hash, customer.id)?;

        let token = self.issue_token(customer.id, ActorType::Customer, &customer.email)?;
        info!(customer_id = %customer.id, "Customer signed in");
        Ok((customer, token))
    }

    // --- 顧客 ---

    /// 顧客登録（メールアドレス重複は409）
    pub async fn register_customer(&self, input: RegisterCustomer) -> AppResult<(Customer, String)> {
        let email = normalize_email(&input.email);

        if self.customer_repo.find_by_email(&email).await?.is_some() {
            return Err(email_taken());
        }

        let password_hash = self.hash_password(&input.password)?;

        let customer = self
            .customer_repo
            .create(NewCustomer {
                email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await
            .map_err(|e| match e.sql_err() {
                // 同時登録で一意制約に当たった場合
                Some(SqlErr::UniqueConstraintViolation(_)) => email_taken(),
                _ => AppError::DbErr(e),
            })?;

        let token = self.issue_token(customer.id, ActorType::Customer, &customer.email)?;
        info!(customer_id = %customer.id, "Customer registered");
        Ok((customer, token))
    }

    pub async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        self.customer_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
    }

    // --- 管理者プロビジョニング ---

    /// 管理者アカウントを冪等に用意する
    ///
    /// 既に存在する場合は `reset_password` が true のときだけパスワードを差し替える。
    pub async fn provision_admin(
        &self,
        email: &str,
        password: &str,
        reset_password: bool,
    ) -> AppResult<ProvisionOutcome> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::ValidationError("Admin email is required".to_string()));
        }

        let password_hash = self.hash_password(password)?;

        let inserted = self
            .user_repo
            .insert_if_absent(NewUser {
                email: email.clone(),
                password_hash: password_hash.clone(),
                first_name: None,
                last_name: None,
            })
            .await?;

        if !inserted && reset_password {
            self.user_repo
                .update_password_hash(&email, password_hash)
                .await?;
            info!(email = %email, "Admin password reset");
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                error!(email = %email, "Provisioned admin could not be read back");
                AppError::InternalServerError("Failed to provision admin user".to_string())
            })?;

        if inserted {
            info!(user_id = %user.id, email = %email, "Admin user created");
            Ok(ProvisionOutcome::Created(user))
        } else {
            info!(user_id = %user.id, email = %email, "Admin user already exists");
            Ok(ProvisionOutcome::AlreadyExists(user))
        }
    }

    // --- トークン ---

    pub fn issue_token(&self, actor_id: Uuid, actor_type: ActorType, email: &str) -> AppResult<String> {
        self.jwt_manager
            .generate_access_token(actor_id, actor_type, email)
            .map_err(|e| {
                error!(error = %e, "Failed to generate access token");
                AppError::InternalServerError("Failed to issue token".to_string())
            })
    }

    pub fn verify_token(&self, token: &str) -> AppResult<AccessTokenClaims> {
        self.jwt_manager
            .verify_access_token(token)
            .map_err(|e| match e {
                JwtError::TokenExpired => AppError::Unauthorized("Token has expired".to_string()),
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        self.password_manager
            .hash_password(password)
            .map_err(|e| match e {
                PasswordError::ValidationError(message) => AppError::ValidationError(message),
                other => {
                    error!(error = %other, "Password hashing failed");
                    AppError::InternalServerError("Password hashing failed".to_string())
                }
            })
    }

    fn check_password(&self, password: &str, hash: &str, actor_id: Uuid) -> AppResult<()> {
        let is_valid = self
            .password_manager
            .verify_password(password, hash)
            .map_err(|e| {
                error!(actor_id = %actor_id, error = %e, "Password verification failed");
                AppError::InternalServerError("Authentication failed".to_string())
            })?;

        if !is_valid {
            warn!(actor_id = %actor_id, "Login attempt with incorrect password");
            return Err(invalid_credentials());
        }
        Ok(())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

fn email_taken() -> AppError {
    AppError::Conflict("A customer with this email already exists".to_string())
}
