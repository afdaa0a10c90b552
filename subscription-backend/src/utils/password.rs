// src/utils/password.rs

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// パスワード関連のエラー
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingError(#[from] argon2::password_hash::Error),

    #[error("Argon2 parameter error: {0}")]
    Argon2Error(#[from] argon2::Error),

    #[error("Password validation failed: {0}")]
    ValidationError(String),
}

// validator の length 属性にも渡すので u64
pub const MIN_PASSWORD_LENGTH: u64 = 8;
pub const MAX_PASSWORD_LENGTH: u64 = 128;

/// Argon2 設定
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// メモリコスト（KB）
    pub memory_cost: u32,
    /// 時間コスト（反復回数）
    pub time_cost: u32,
    /// 並列度
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19MB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// パスワードハッシュマネージャー
pub struct PasswordManager {
    argon2: Argon2<'static>,
}

impl PasswordManager {
    pub fn new(argon2_config: Argon2Config) -> Result<Self, PasswordError> {
        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(
                argon2_config.memory_cost,
                argon2_config.time_cost,
                argon2_config.parallelism,
                None,
            )
            .map_err(PasswordError::Argon2Error)?,
        );

        Ok(Self { argon2 })
    }

    pub fn new_default() -> Result<Self, PasswordError> {
        Self::new(Argon2Config::default())
    }

    /// パスワードをハッシュ化
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        validate_password_length(password)?;

        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::HashingError)?;

        Ok(password_hash.to_string())
    }

    /// パスワードを検証（不一致はOk(false)）
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(PasswordError::HashingError)?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::HashingError(e)),
        }
    }
}

impl std::fmt::Debug for PasswordManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordManager").finish_non_exhaustive()
    }
}

/// 文字数のみを検証（文字単位で数える）
pub fn validate_password_length(password: &str) -> Result<(), PasswordError> {
    let length = password.chars().count() as u64;
    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::ValidationError(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::ValidationError(format!(
            "Password must be no more than {} characters long",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
