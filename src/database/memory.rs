// 内存存储实现
// 与 PostgreSQL 实现遵循同一套接口约定，供测试和单进程嵌入使用

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::AccountRecord;
use crate::database::{AccountStore, ProviderLinkStore, RequestStore};
use crate::error::{Error, Result};
use crate::provider::ProviderLinkRecord;
use crate::request::RequestRecord;

/// 内存账户存储
#[derive(Default)]
pub struct MemoryAccountStore {
    rows: RwLock<HashMap<String, AccountRecord>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, record: &AccountRecord) -> Result<()> {
        let mut rows = self.rows.write().await;
        let duplicate = rows.values().any(|existing| {
            existing.meta.id == record.meta.id
                || existing.meta.short_id == record.meta.short_id
                || (!record.username.is_empty() && existing.username == record.username)
                || (!record.email.is_empty() && existing.email == record.email)
        });
        if duplicate {
            return Err(Error::AlreadyExists);
        }
        rows.insert(record.meta.id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &AccountRecord) -> Result<()> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&record.meta.id) {
            return Err(Error::NotFound);
        }
        // 与唯一索引一致：改到他人占用的用户名或邮箱同样被拒
        let taken = rows.values().any(|existing| {
            existing.meta.id != record.meta.id
                && ((!record.username.is_empty() && existing.username == record.username)
                    || (!record.email.is_empty() && existing.email == record.email))
        });
        if taken {
            return Err(Error::AlreadyExists);
        }
        rows.insert(record.meta.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.rows.write().await.remove(id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AccountRecord>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<AccountRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.meta.short_id == short_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.email == email)
            .cloned())
    }
}

/// 内存身份关联存储
#[derive(Default)]
pub struct MemoryProviderLinkStore {
    rows: RwLock<HashMap<String, ProviderLinkRecord>>,
}

impl MemoryProviderLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderLinkStore for MemoryProviderLinkStore {
    async fn insert(&self, record: &ProviderLinkRecord) -> Result<()> {
        let mut rows = self.rows.write().await;
        let duplicate = rows.values().any(|existing| {
            existing.meta.id == record.meta.id
                || existing.meta.short_id == record.meta.short_id
                || (existing.provider == record.provider && existing.owner_id == record.owner_id)
        });
        if duplicate {
            return Err(Error::AlreadyExists);
        }
        rows.insert(record.meta.id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &ProviderLinkRecord) -> Result<()> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&record.meta.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(Error::NotFound),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.rows.write().await.remove(id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ProviderLinkRecord>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_by_owner(
        &self,
        provider: &str,
        owner_id: &str,
    ) -> Result<Option<ProviderLinkRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.provider == provider && r.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_email(
        &self,
        provider: &str,
        email: &str,
    ) -> Result<Option<ProviderLinkRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.provider == provider && r.email == email)
            .cloned())
    }
}

/// 内存确认请求存储
pub struct MemoryRequestStore<P> {
    rows: RwLock<HashMap<String, RequestRecord<P>>>,
}

impl<P> Default for MemoryRequestStore<P> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<P> MemoryRequestStore<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl<P: Clone + Send + Sync + 'static> RequestStore<P> for MemoryRequestStore<P> {
    async fn insert(&self, record: &RequestRecord<P>) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&record.meta.id) {
            return Err(Error::AlreadyExists);
        }
        rows.insert(record.meta.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.rows.write().await.remove(id);
        Ok(())
    }

    /// 查属主的最新请求
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<RequestRecord<P>>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.owner_id == owner_id)
            .max_by_key(|r| r.meta.created_at)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PasswordResetPayload;
    use chrono::Duration;

    #[tokio::test]
    async fn test_account_uniqueness() {
        let store = MemoryAccountStore::new();
        let account = AccountRecord::new("Alice", "alice", "alice@example.com");
        store.insert(&account).await.unwrap();

        let rival = AccountRecord::new("Another", "alice", "other@example.com");
        let err = store.insert(&rival).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryAccountStore::new();
        let first = AccountRecord::new("Alice", "alice", "shared@example.com");
        store.insert(&first).await.unwrap();

        let rival = AccountRecord::new("Bob", "bob", "shared@example.com");
        let err = store.insert(&rival).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists));
        assert_eq!(store.len().await, 1);

        // 空邮箱表示未设置，不参与唯一性
        store
            .insert(&AccountRecord::new("Anon", "", ""))
            .await
            .unwrap();
        store
            .insert(&AccountRecord::new("Anon2", "anon2", ""))
            .await
            .unwrap();
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_rejected() {
        let store = MemoryAccountStore::new();
        let first = AccountRecord::new("Alice", "alice", "alice@example.com");
        store.insert(&first).await.unwrap();
        let mut second = AccountRecord::new("Bob", "bob", "bob@example.com");
        store.insert(&second).await.unwrap();

        second.set_email("alice@example.com");
        let err = store.update(&second).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists));

        // 保留自身邮箱的更新不受影响
        second.set_email("bob@example.com");
        second.set_name("Robert");
        store.update(&second).await.unwrap();
        let kept = store.find_by_id(&second.meta.id).await.unwrap().unwrap();
        assert_eq!(kept.name, "Robert");
    }

    #[tokio::test]
    async fn test_account_lookups_and_missing_rows() {
        let store = MemoryAccountStore::new();
        assert!(store.find_by_username("ghost").await.unwrap().is_none());

        let account = AccountRecord::new("Alice", "alice", "alice@example.com");
        store.insert(&account).await.unwrap();

        let by_short_id = store
            .find_by_short_id(&account.meta.short_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_short_id, account);

        let absent = AccountRecord::new("Ghost", "ghost", "ghost@example.com");
        assert!(matches!(
            store.update(&absent).await.unwrap_err(),
            Error::NotFound
        ));
        store.delete(&absent.meta.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_request_store_returns_latest_for_owner() {
        let store = MemoryRequestStore::new();
        let older = RequestRecord::new("owner-1", PasswordResetPayload {}, Duration::hours(48));
        store.insert(&older).await.unwrap();

        let mut newer = RequestRecord::new("owner-1", PasswordResetPayload {}, Duration::hours(48));
        newer.meta.created_at = older.meta.created_at + Duration::seconds(1);
        store.insert(&newer).await.unwrap();

        let found = store.find_by_owner("owner-1").await.unwrap().unwrap();
        assert_eq!(found.meta.id, newer.meta.id);
    }
}
