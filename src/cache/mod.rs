// 缓存模块
// 键值缓存的统一接口与后端实现

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub mod keys;
pub mod memory;
pub mod redis;

// 重新导出常用类型，方便其他模块使用
pub use memory::MemoryCache;
pub use redis::RedisCache;

/// 键值缓存后端接口
///
/// 未命中是正常结果（`Ok(None)`），传输故障才是错误。
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, keys: &[String]) -> Result<()>;
}

/// 将记录序列化为缓存值
pub(crate) fn encode_value<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::CacheUnavailable(format!("serialization error: {}", e)))
}

/// 从缓存值反序列化记录
pub(crate) fn decode_value<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::CacheUnavailable(format!("deserialization error: {}", e)))
}
