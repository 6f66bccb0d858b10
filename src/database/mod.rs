// 数据库模块
// 存储接口定义与各后端实现

use async_trait::async_trait;

use crate::account::AccountRecord;
use crate::error::Result;
use crate::provider::ProviderLinkRecord;
use crate::request::RequestRecord;

pub mod memory; // 内存实现，用于测试
pub mod operations; // PostgreSQL 实现

// 重新导出常用类型，方便其他模块使用
pub use memory::{MemoryAccountStore, MemoryProviderLinkStore, MemoryRequestStore};
pub use operations::{
    PgAccountStore, PgEmailChangeStore, PgPasswordResetStore, PgProviderLinkStore,
};

/// 账户存储接口
///
/// 查找未命中返回 `Ok(None)`；`update` 对不存在的行返回 `NotFound`，
/// `delete` 幂等。
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, record: &AccountRecord) -> Result<()>;
    async fn update(&self, record: &AccountRecord) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<AccountRecord>>;
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<AccountRecord>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>>;
}

/// 外部身份关联存储接口
#[async_trait]
pub trait ProviderLinkStore: Send + Sync {
    async fn insert(&self, record: &ProviderLinkRecord) -> Result<()>;
    async fn update(&self, record: &ProviderLinkRecord) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ProviderLinkRecord>>;
    async fn find_by_owner(
        &self,
        provider: &str,
        owner_id: &str,
    ) -> Result<Option<ProviderLinkRecord>>;
    async fn find_by_email(
        &self,
        provider: &str,
        email: &str,
    ) -> Result<Option<ProviderLinkRecord>>;
}

/// 确认请求存储接口
///
/// 每个属主最多保留一条记录；`find_by_owner` 返回最新一条。
#[async_trait]
pub trait RequestStore<P>: Send + Sync {
    async fn insert(&self, record: &RequestRecord<P>) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<RequestRecord<P>>>;
}
