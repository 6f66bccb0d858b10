use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::CacheBackend;
use crate::error::{Error, Result};

/// 内存缓存后端，用于测试和单进程嵌入场景
///
/// 不处理过期时间；可注入写失败以测试存储成功但缓存失败的路径。
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 控制后续写入是否失败
    pub fn set_write_failures(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::CacheUnavailable("injected write failure".into()));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("account:missing").await.unwrap(), None);

        cache.set("account:alice", "{}").await.unwrap();
        assert_eq!(
            cache.get("account:alice").await.unwrap(),
            Some("{}".to_string())
        );

        cache
            .delete(&["account:alice".to_string(), "account:ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(cache.get("account:alice").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let cache = MemoryCache::new();
        cache.set_write_failures(true);
        let err = cache.set("account:alice", "{}").await.unwrap_err();
        assert!(matches!(err, Error::CacheUnavailable(_)));

        cache.set_write_failures(false);
        cache.set("account:alice", "{}").await.unwrap();
        assert_eq!(cache.len().await, 1);
    }
}
