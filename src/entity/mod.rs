// 实体基础模块
// 所有持久化记录共享的标识与时间戳字段

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 短标识符长度
pub const SHORT_ID_LEN: usize = 16;

/// 所有记录共享的基础字段，通过组合嵌入各记录类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EntityMeta {
    pub id: String,
    pub short_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityMeta {
    /// 生成一套新的标识与时间戳
    pub fn generate() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            short_id: generate_short_id(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 推进更新时间戳
    pub fn touch(&mut self) {
        let now = Utc::now();
        // 两次写入之间时钟可能未推进
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::nanoseconds(1)
        };
    }
}

/// 持久化记录的统一访问接口
pub trait Entity {
    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn short_id(&self) -> &str {
        &self.meta().short_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.meta().updated_at
    }

    fn touch(&mut self) {
        self.meta_mut().touch();
    }
}

/// 生成随机短标识符（字母数字）
pub fn generate_short_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_ID_LEN)
        .map(char::from)
        .collect()
}

/// 生成不可猜测的确认令牌
pub fn generate_request_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
