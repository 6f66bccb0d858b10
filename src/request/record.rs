use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityMeta, generate_request_token};

/// 确认请求默认有效期（小时）
pub const REQUEST_VALIDITY_HOURS: i64 = 48;

/// 确认请求负载，按工作流区分
pub trait RequestPayload: Clone + Send + Sync {
    /// 工作流名称，用于日志与存储命名
    const KIND: &'static str;
}

/// 邮箱变更确认的负载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailChangePayload {
    pub previous_email: String,
    pub new_email: String,
}

impl EmailChangePayload {
    pub fn new(previous_email: &str, new_email: &str) -> Self {
        Self {
            previous_email: previous_email.to_string(),
            new_email: new_email.to_string(),
        }
    }
}

impl RequestPayload for EmailChangePayload {
    const KIND: &'static str = "email_change";
}

/// 密码重置确认的负载（无额外字段）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordResetPayload {}

impl RequestPayload for PasswordResetPayload {
    const KIND: &'static str = "password_reset";
}

/// 短期确认请求记录
///
/// 令牌只在创建与续期时返回一次；过期时间一经设定不再延长。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord<P> {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub owner_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> RequestRecord<P> {
    /// 创建新请求，生成令牌并按有效期设定过期时间
    pub fn new(owner_id: &str, payload: P, validity: Duration) -> Self {
        let meta = EntityMeta::generate();
        let expires_at = meta.created_at + validity;
        Self {
            meta,
            owner_id: owner_id.to_string(),
            token: generate_request_token(),
            expires_at,
            payload,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// 给定时刻是否已过期；恰好到达过期时间时仍视为存活
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

impl<P> Entity for RequestRecord<P> {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
