//! 账户管理库：关系型持久化配读穿缓存，签发访问与刷新令牌，
//! 并管理邮箱变更、密码重置两类短期确认请求。

pub mod account;
pub mod cache;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod provider;
pub mod request;
pub mod token;
pub mod utils;

pub use account::{AccountFetcher, AccountManager, AccountRecord};
pub use cache::{CacheBackend, MemoryCache, RedisCache};
pub use config::Config;
pub use database::{
    AccountStore, MemoryAccountStore, MemoryProviderLinkStore, MemoryRequestStore, PgAccountStore,
    PgEmailChangeStore, PgPasswordResetStore, PgProviderLinkStore, ProviderLinkStore, RequestStore,
};
pub use entity::{Entity, EntityMeta};
pub use error::{Error, Result};
pub use provider::{ProviderLinkFetcher, ProviderLinkManager, ProviderLinkRecord};
pub use request::{
    EmailChangeManager, EmailChangePayload, PasswordResetManager, PasswordResetPayload,
    RequestManager, RequestPayload, RequestRecord,
};
pub use token::{AccessClaims, RefreshClaims, TokenIssuer};
