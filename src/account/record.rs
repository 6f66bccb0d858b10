use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityMeta};
use crate::error::Result;
use crate::utils::{hash_password, verify_password};

/// 账户记录
///
/// `password` 存 bcrypt 摘要，本地无凭据时为空字符串。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountRecord {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    pub username: String,
    pub password: String,
    pub password_updated_at: Option<DateTime<Utc>>,
    pub email: String,
    pub avatar: String,
    pub suspended: bool,
}

impl AccountRecord {
    /// 创建新账户记录，凭据和头像留空
    pub fn new(name: &str, username: &str, email: &str) -> Self {
        Self {
            meta: EntityMeta::generate(),
            name: name.to_string(),
            username: username.to_string(),
            password: String::new(),
            password_updated_at: None,
            email: email.to_string(),
            avatar: String::new(),
            suspended: false,
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = username.to_string();
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
    }

    pub fn set_avatar(&mut self, avatar: &str) {
        self.avatar = avatar.to_string();
    }

    /// 设置密码：哈希明文并记录修改时间
    pub fn set_password(&mut self, plain: &str) -> Result<()> {
        self.password = hash_password(plain)?;
        self.password_updated_at = Some(Utc::now());
        Ok(())
    }

    /// 校验明文密码；账户无本地凭据时恒为 false
    pub fn verify_password(&self, plain: &str) -> Result<bool> {
        if self.password.is_empty() {
            return Ok(false);
        }
        Ok(verify_password(plain, &self.password)?)
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn release(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

impl Entity for AccountRecord {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
