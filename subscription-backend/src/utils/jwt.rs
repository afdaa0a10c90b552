// src/utils/jwt.rs

use crate::config::JwtSettings;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// JWT関連のエラー
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to decode JWT: {0}")]
    DecodingError(String),

    #[error("JWT token has expired")]
    TokenExpired,

    #[error("Invalid JWT token")]
    InvalidToken,

    #[error("Invalid JWT configuration: {0}")]
    ConfigurationError(String),
}

/// トークンの持ち主の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// 管理画面のオペレーター
    User,
    /// ストアフロントの顧客
    Customer,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::User => "user",
            ActorType::Customer => "customer",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// アクセストークンのClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Subject (user ID or customer ID)
    pub sub: String,
    pub actor_type: ActorType,
    pub email: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Not before
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID
    pub jti: String,
}

impl AccessTokenClaims {
    pub fn actor_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// JWTトークン管理
pub struct JwtManager {
    settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.settings.issuer)
            .field("audience", &self.settings.audience)
            .field("expiry_minutes", &self.settings.expiry_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(settings: JwtSettings) -> Result<Self, JwtError> {
        if settings.secret_key.len() < 32 {
            return Err(JwtError::ConfigurationError(
                "JWT secret key must be at least 32 characters".to_string(),
            ));
        }

        if settings.expiry_minutes <= 0 {
            return Err(JwtError::ConfigurationError(
                "Token expiry must be positive".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_secret(settings.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret_key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Ok(Self {
            settings,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// アクセストークンを生成
    pub fn generate_access_token(
        &self,
        actor_id: Uuid,
        actor_type: ActorType,
        email: &str,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.settings.expiry_minutes);

        let claims = AccessTokenClaims {
            sub: actor_id.to_string(),
            actor_type,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(JwtError::EncodingError)
    }

    /// アクセストークンを検証・デコード
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}
