// 身份关联管理器
// 以提供方名为命名空间，组合存储与缓存

use std::sync::Arc;

use crate::cache::{self, CacheBackend, keys};
use crate::database::ProviderLinkStore;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::provider::ProviderLinkRecord;

/// 身份关联管理器，管理单个提供方（如 "google"）的关联记录
pub struct ProviderLinkManager<S, C> {
    provider: String,
    store: Arc<S>,
    cache: Arc<C>,
}

impl<S: ProviderLinkStore, C: CacheBackend> ProviderLinkManager<S, C> {
    pub fn new(provider: &str, store: Arc<S>, cache: Arc<C>) -> Self {
        Self {
            provider: provider.to_string(),
            store,
            cache,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// 首选缓存别名：属主账户标识
    fn primary_alias(&self, record: &ProviderLinkRecord) -> String {
        keys::provider_link_key(&self.provider, &record.owner_id)
    }

    /// 记录可能占用的全部缓存键
    fn alias_keys(&self, record: &ProviderLinkRecord) -> Vec<String> {
        let mut aliases = vec![
            keys::provider_link_key(&self.provider, record.id()),
            keys::provider_link_key(&self.provider, &record.owner_id),
        ];
        if !record.email.is_empty() {
            aliases.push(keys::provider_link_key(&self.provider, &record.email));
        }
        aliases
    }

    /// 插入关联并缓存在属主别名下
    pub async fn create(&self, record: &ProviderLinkRecord) -> Result<()> {
        self.store.insert(record).await?;
        tracing::info!(
            "linked {} identity for account {}",
            self.provider,
            record.owner_id
        );

        let value = cache::encode_value(record)?;
        self.cache.set(&self.primary_alias(record), &value).await?;
        Ok(())
    }

    /// 更新关联并刷新缓存：清掉新旧全部别名，重写首选别名
    pub async fn update(&self, record: &mut ProviderLinkRecord) -> Result<()> {
        let prior = self
            .store
            .find_by_id(record.id())
            .await?
            .ok_or(Error::NotFound)?;

        record.touch();
        self.store.update(record).await?;
        tracing::debug!("updated {} link {}", self.provider, record.id());

        let mut stale = self.alias_keys(&prior);
        for alias in self.alias_keys(record) {
            if !stale.contains(&alias) {
                stale.push(alias);
            }
        }
        self.cache.delete(&stale).await?;

        let value = cache::encode_value(record)?;
        self.cache.set(&self.primary_alias(record), &value).await?;
        Ok(())
    }

    /// 删除关联并清掉全部缓存别名
    pub async fn delete(&self, record: &ProviderLinkRecord) -> Result<()> {
        self.store.delete(record.id()).await?;
        tracing::info!(
            "unlinked {} identity for account {}",
            self.provider,
            record.owner_id
        );

        self.cache.delete(&self.alias_keys(record)).await?;
        Ok(())
    }

    /// 只查存储，不碰缓存
    pub async fn find_by_id(&self, id: &str) -> Result<Option<ProviderLinkRecord>> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Option<ProviderLinkRecord>> {
        self.store.find_by_owner(&self.provider, owner_id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<ProviderLinkRecord>> {
        self.store.find_by_email(&self.provider, email).await
    }

    /// 查存储并以查找键写入缓存；未命中返回 NotFound
    pub async fn seed_by_id(&self, id: &str) -> Result<ProviderLinkRecord> {
        let found = self.store.find_by_id(id).await?;
        self.seed(id, found).await
    }

    pub async fn seed_by_owner(&self, owner_id: &str) -> Result<ProviderLinkRecord> {
        let found = self.store.find_by_owner(&self.provider, owner_id).await?;
        self.seed(owner_id, found).await
    }

    pub async fn seed_by_email(&self, email: &str) -> Result<ProviderLinkRecord> {
        let found = self.store.find_by_email(&self.provider, email).await?;
        self.seed(email, found).await
    }

    async fn seed(
        &self,
        key: &str,
        found: Option<ProviderLinkRecord>,
    ) -> Result<ProviderLinkRecord> {
        let record = found.ok_or(Error::NotFound)?;
        let value = cache::encode_value(&record)?;
        self.cache
            .set(&keys::provider_link_key(&self.provider, key), &value)
            .await?;
        tracing::debug!("seeded {} link cache under {}", self.provider, key);
        Ok(record)
    }

    /// 缓存优先读：未命中回源存储并回填属主键
    pub async fn get_by_owner(&self, owner_id: &str) -> Result<Option<ProviderLinkRecord>> {
        let key = keys::provider_link_key(&self.provider, owner_id);
        if let Some(raw) = self.cache.get(&key).await? {
            return Ok(Some(cache::decode_value(&raw)?));
        }
        match self.store.find_by_owner(&self.provider, owner_id).await? {
            Some(record) => Ok(Some(self.seed(owner_id, Some(record)).await?)),
            None => Ok(None),
        }
    }
}

/// 身份关联缓存读取器，供不持有存储句柄的调用方使用
pub struct ProviderLinkFetcher<C> {
    provider: String,
    cache: Arc<C>,
}

impl<C: CacheBackend> ProviderLinkFetcher<C> {
    pub fn new(provider: &str, cache: Arc<C>) -> Self {
        Self {
            provider: provider.to_string(),
            cache,
        }
    }

    /// 只查缓存；未命中返回 `Ok(None)`
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<ProviderLinkRecord>> {
        self.fetch(id).await
    }

    pub async fn fetch_by_owner(&self, owner_id: &str) -> Result<Option<ProviderLinkRecord>> {
        self.fetch(owner_id).await
    }

    pub async fn fetch_by_email(&self, email: &str) -> Result<Option<ProviderLinkRecord>> {
        self.fetch(email).await
    }

    async fn fetch(&self, key: &str) -> Result<Option<ProviderLinkRecord>> {
        match self
            .cache
            .get(&keys::provider_link_key(&self.provider, key))
            .await?
        {
            Some(raw) => Ok(Some(cache::decode_value(&raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::database::MemoryProviderLinkStore;
    use chrono::{Duration, Utc};

    fn manager() -> (
        ProviderLinkManager<MemoryProviderLinkStore, MemoryCache>,
        Arc<MemoryCache>,
    ) {
        let store = Arc::new(MemoryProviderLinkStore::new());
        let cache = Arc::new(MemoryCache::new());
        (
            ProviderLinkManager::new("google", store, cache.clone()),
            cache,
        )
    }

    fn sample_link() -> ProviderLinkRecord {
        let mut link = ProviderLinkRecord::new("google", "owner-1");
        link.subject = "sub-123".to_string();
        link.email = "alice@gmail.com".to_string();
        link.access_token = "ya29.token".to_string();
        link.token_type = "Bearer".to_string();
        link.refresh_token = "1//refresh".to_string();
        link.expiry = Some(Utc::now() + Duration::hours(1));
        link.expires_in = 3600;
        link.scopes = vec!["email".to_string(), "profile".to_string()];
        link
    }

    #[tokio::test]
    async fn test_create_caches_under_owner_alias() {
        let (manager, cache) = manager();
        let link = sample_link();
        manager.create(&link).await.unwrap();

        let fetcher = ProviderLinkFetcher::new("google", cache);
        let cached = fetcher.fetch_by_owner("owner-1").await.unwrap().unwrap();
        assert_eq!(cached, link);
    }

    #[tokio::test]
    async fn test_duplicate_link_for_owner_is_rejected() {
        let (manager, _cache) = manager();
        manager.create(&sample_link()).await.unwrap();

        let err = manager.create(&sample_link()).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists));
    }

    #[tokio::test]
    async fn test_update_refreshes_owner_alias() {
        let (manager, cache) = manager();
        let mut link = sample_link();
        manager.create(&link).await.unwrap();

        let before = link.updated_at();
        link.access_token = "ya29.rotated".to_string();
        manager.update(&mut link).await.unwrap();
        assert!(link.updated_at() > before);

        let fetcher = ProviderLinkFetcher::new("google", cache);
        let cached = fetcher.fetch_by_owner("owner-1").await.unwrap().unwrap();
        assert_eq!(cached.access_token, "ya29.rotated");
    }

    #[tokio::test]
    async fn test_delete_evicts_every_alias() {
        let (manager, cache) = manager();
        let link = sample_link();
        manager.create(&link).await.unwrap();
        manager.seed_by_id(link.id()).await.unwrap();
        manager.seed_by_email("alice@gmail.com").await.unwrap();

        manager.delete(&link).await.unwrap();
        assert!(cache.is_empty().await);
        assert!(manager.find_by_owner("owner-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_owner_falls_back_to_store() {
        let (manager, cache) = manager();
        let link = sample_link();
        manager.create(&link).await.unwrap();
        cache
            .delete(&[keys::provider_link_key("google", "owner-1")])
            .await
            .unwrap();

        let got = manager.get_by_owner("owner-1").await.unwrap().unwrap();
        assert_eq!(got, link);
        assert!(manager.get_by_owner("nobody").await.unwrap().is_none());
    }
}
