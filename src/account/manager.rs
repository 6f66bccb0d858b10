// 账户管理器
// 组合账户存储与缓存：写路径维护缓存一致，读路径区分 find/seed/fetch/get

use std::sync::Arc;

use crate::account::AccountRecord;
use crate::cache::{self, CacheBackend, keys};
use crate::database::AccountStore;
use crate::entity::Entity;
use crate::error::{Error, Result};

/// 账户管理器，持有注入的存储与缓存句柄
///
/// 存储是权威数据源；缓存写失败时存储结果保持不变，错误原样上抛。
pub struct AccountManager<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
}

impl<S: AccountStore, C: CacheBackend> AccountManager<S, C> {
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    /// 首选缓存别名：用户名，缺省为短标识符
    fn primary_alias(record: &AccountRecord) -> String {
        if record.username.is_empty() {
            keys::account_key(record.short_id())
        } else {
            keys::account_key(&record.username)
        }
    }

    /// 记录可能占用的全部缓存键
    fn alias_keys(record: &AccountRecord) -> Vec<String> {
        let mut aliases = vec![
            keys::account_key(record.id()),
            keys::account_key(record.short_id()),
        ];
        if !record.username.is_empty() {
            aliases.push(keys::account_key(&record.username));
        }
        if !record.email.is_empty() {
            aliases.push(keys::account_key(&record.email));
        }
        aliases
    }

    /// 插入账户并缓存在首选别名下
    pub async fn create(&self, record: &AccountRecord) -> Result<()> {
        self.store.insert(record).await?;
        tracing::info!("created account {}", record.id());

        let value = cache::encode_value(record)?;
        self.cache.set(&Self::primary_alias(record), &value).await?;
        Ok(())
    }

    /// 更新账户并刷新缓存：清掉新旧全部别名，重写首选别名
    pub async fn update(&self, record: &mut AccountRecord) -> Result<()> {
        let prior = self
            .store
            .find_by_id(record.id())
            .await?
            .ok_or(Error::NotFound)?;

        record.touch();
        self.store.update(record).await?;
        tracing::debug!("updated account {}", record.id());

        let mut stale = Self::alias_keys(&prior);
        for alias in Self::alias_keys(record) {
            if !stale.contains(&alias) {
                stale.push(alias);
            }
        }
        self.cache.delete(&stale).await?;

        let value = cache::encode_value(record)?;
        self.cache.set(&Self::primary_alias(record), &value).await?;
        Ok(())
    }

    /// 删除账户并清掉全部缓存别名
    pub async fn delete(&self, record: &AccountRecord) -> Result<()> {
        self.store.delete(record.id()).await?;
        tracing::info!("deleted account {}", record.id());

        self.cache.delete(&Self::alias_keys(record)).await?;
        Ok(())
    }

    /// 只查存储，不碰缓存
    pub async fn find_by_id(&self, id: &str) -> Result<Option<AccountRecord>> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_short_id(&self, short_id: &str) -> Result<Option<AccountRecord>> {
        self.store.find_by_short_id(short_id).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>> {
        self.store.find_by_username(username).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        self.store.find_by_email(email).await
    }

    /// 查存储并以查找键写入缓存；未命中返回 NotFound
    pub async fn seed_by_id(&self, id: &str) -> Result<AccountRecord> {
        let found = self.store.find_by_id(id).await?;
        self.seed(id, found).await
    }

    pub async fn seed_by_short_id(&self, short_id: &str) -> Result<AccountRecord> {
        let found = self.store.find_by_short_id(short_id).await?;
        self.seed(short_id, found).await
    }

    pub async fn seed_by_username(&self, username: &str) -> Result<AccountRecord> {
        let found = self.store.find_by_username(username).await?;
        self.seed(username, found).await
    }

    pub async fn seed_by_email(&self, email: &str) -> Result<AccountRecord> {
        let found = self.store.find_by_email(email).await?;
        self.seed(email, found).await
    }

    async fn seed(&self, key: &str, found: Option<AccountRecord>) -> Result<AccountRecord> {
        let record = found.ok_or(Error::NotFound)?;
        let value = cache::encode_value(&record)?;
        self.cache.set(&keys::account_key(key), &value).await?;
        tracing::debug!("seeded account cache under {}", key);
        Ok(record)
    }

    /// 缓存优先读：未命中回源存储并回填该键
    pub async fn get_by_id(&self, id: &str) -> Result<Option<AccountRecord>> {
        if let Some(hit) = self.fetch(id).await? {
            return Ok(Some(hit));
        }
        match self.store.find_by_id(id).await? {
            Some(record) => Ok(Some(self.seed(id, Some(record)).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_by_short_id(&self, short_id: &str) -> Result<Option<AccountRecord>> {
        if let Some(hit) = self.fetch(short_id).await? {
            return Ok(Some(hit));
        }
        match self.store.find_by_short_id(short_id).await? {
            Some(record) => Ok(Some(self.seed(short_id, Some(record)).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<AccountRecord>> {
        if let Some(hit) = self.fetch(username).await? {
            return Ok(Some(hit));
        }
        match self.store.find_by_username(username).await? {
            Some(record) => Ok(Some(self.seed(username, Some(record)).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        if let Some(hit) = self.fetch(email).await? {
            return Ok(Some(hit));
        }
        match self.store.find_by_email(email).await? {
            Some(record) => Ok(Some(self.seed(email, Some(record)).await?)),
            None => Ok(None),
        }
    }

    async fn fetch(&self, key: &str) -> Result<Option<AccountRecord>> {
        match self.cache.get(&keys::account_key(key)).await? {
            Some(raw) => Ok(Some(cache::decode_value(&raw)?)),
            None => Ok(None),
        }
    }
}

/// 账户缓存读取器，供不持有存储句柄的调用方使用
pub struct AccountFetcher<C> {
    cache: Arc<C>,
}

impl<C: CacheBackend> AccountFetcher<C> {
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }

    /// 只查缓存；未命中返回 `Ok(None)`
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<AccountRecord>> {
        self.fetch(id).await
    }

    pub async fn fetch_by_short_id(&self, short_id: &str) -> Result<Option<AccountRecord>> {
        self.fetch(short_id).await
    }

    pub async fn fetch_by_username(&self, username: &str) -> Result<Option<AccountRecord>> {
        self.fetch(username).await
    }

    pub async fn fetch_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        self.fetch(email).await
    }

    async fn fetch(&self, key: &str) -> Result<Option<AccountRecord>> {
        match self.cache.get(&keys::account_key(key)).await? {
            Some(raw) => Ok(Some(cache::decode_value(&raw)?)),
            None => Ok(None),
        }
    }
}
