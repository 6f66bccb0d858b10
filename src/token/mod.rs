// 令牌模块
// 访问令牌与刷新令牌的 HS256 签发与校验

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::account::AccountRecord;
use crate::config::Config;
use crate::entity::Entity;
use crate::error::{Error, Result};

/// 访问令牌的声明，携带账户资料快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub short_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub password_updated_at: Option<i64>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// 刷新令牌的声明，只携带身份
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// 无状态 HS256 签发与校验器
///
/// 令牌不落库，账户后续变更不影响已签发的令牌，直至自然过期。
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: String,
    issuer: String,
    access_validity: Duration,
    refresh_validity: Duration,
}

impl TokenIssuer {
    pub fn new(
        secret: &str,
        issuer: &str,
        access_validity: Duration,
        refresh_validity: Duration,
    ) -> Self {
        Self {
            secret: secret.to_string(),
            issuer: issuer.to_string(),
            access_validity,
            refresh_validity,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            Duration::seconds(config.jwt_expiration_secs as i64),
            Duration::seconds(config.refresh_expiration_secs as i64),
        )
    }

    /// 签发访问令牌，携带账户资料快照
    pub fn issue_access_token(&self, account: &AccountRecord) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: account.id().to_string(),
            short_id: account.short_id().to_string(),
            name: account.name.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            avatar: account.avatar.clone(),
            password_updated_at: account.password_updated_at.map(|t| t.timestamp()),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_validity).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| Error::TokenEncoding(e.to_string()))
    }

    /// 签发刷新令牌，只携带身份
    pub fn issue_refresh_token(&self, account: &AccountRecord) -> Result<String> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: account.id().to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.refresh_validity).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| Error::TokenEncoding(e.to_string()))
    }

    /// 校验访问令牌的签名、过期与签发者
    ///
    /// 所有校验失败统一折叠为 `Unauthorized`，具体原因保留在 `source()` 中。
    pub fn parse_access_token(&self, token: &str) -> Result<AccessClaims> {
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation(),
        )
        .map_err(|source| Error::Unauthorized { source })?;
        Ok(data.claims)
    }

    /// 校验刷新令牌的签名、过期与签发者
    pub fn parse_refresh_token(&self, token: &str) -> Result<RefreshClaims> {
        let data = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation(),
        )
        .map_err(|source| Error::Unauthorized { source })?;
        Ok(data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation
    }
}
