use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityMeta};

/// 外部身份关联记录
///
/// 只负责存储提供方返回的令牌数据，不发起任何 OAuth 流程。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProviderLinkRecord {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: EntityMeta,
    pub owner_id: String,
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expiry: Option<DateTime<Utc>>,
    pub expires_in: i64,
    pub scopes: Vec<String>,
    pub raw: String,
}

impl ProviderLinkRecord {
    /// 创建新的身份关联，令牌字段由调用方回填
    pub fn new(provider: &str, owner_id: &str) -> Self {
        Self {
            meta: EntityMeta::generate(),
            owner_id: owner_id.to_string(),
            provider: provider.to_string(),
            subject: String::new(),
            email: String::new(),
            access_token: String::new(),
            token_type: String::new(),
            refresh_token: String::new(),
            expiry: None,
            expires_in: 0,
            scopes: Vec::new(),
            raw: String::new(),
        }
    }

    /// 提供方令牌是否已过期；无过期时间视为未过期
    pub fn is_token_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= Utc::now(),
            None => false,
        }
    }
}

impl Entity for ProviderLinkRecord {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_expiry() {
        let mut link = ProviderLinkRecord::new("google", "owner-1");
        assert!(!link.is_token_expired());

        link.expiry = Some(Utc::now() + Duration::hours(1));
        assert!(!link.is_token_expired());

        link.expiry = Some(Utc::now() - Duration::hours(1));
        assert!(link.is_token_expired());
    }
}
