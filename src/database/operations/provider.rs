// 外部身份关联存储库
// 包含身份关联相关的数据库操作

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::ProviderLinkStore;
use crate::error::{Error, Result};
use crate::provider::ProviderLinkRecord;

const PROVIDER_LINK_COLUMNS: &str = "id, short_id, created_at, updated_at, \
     owner_id, provider, subject, email, access_token, token_type, \
     refresh_token, expiry, expires_in, scopes, raw";

/// 身份关联存储库，每个提供方与账户至多一条关联
pub struct PgProviderLinkStore {
    db: Arc<PgPool>,
}

impl PgProviderLinkStore {
    /// 创建新的身份关联存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 建表（不存在时）
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS provider_links (
                id TEXT PRIMARY KEY,
                short_id TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                owner_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                subject TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                access_token TEXT NOT NULL DEFAULT '',
                token_type TEXT NOT NULL DEFAULT '',
                refresh_token TEXT NOT NULL DEFAULT '',
                expiry TIMESTAMPTZ,
                expires_in BIGINT NOT NULL DEFAULT 0,
                scopes TEXT[] NOT NULL DEFAULT '{}',
                raw TEXT NOT NULL DEFAULT '',
                UNIQUE (provider, owner_id)
            )
            "#,
        )
        .execute(&*self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProviderLinkStore for PgProviderLinkStore {
    /// 插入身份关联记录
    async fn insert(&self, record: &ProviderLinkRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO provider_links (
                id, short_id, created_at, updated_at,
                owner_id, provider, subject, email,
                access_token, token_type, refresh_token,
                expiry, expires_in, scopes, raw
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(&record.meta.id)
        .bind(&record.meta.short_id)
        .bind(record.meta.created_at)
        .bind(record.meta.updated_at)
        .bind(&record.owner_id)
        .bind(&record.provider)
        .bind(&record.subject)
        .bind(&record.email)
        .bind(&record.access_token)
        .bind(&record.token_type)
        .bind(&record.refresh_token)
        .bind(record.expiry)
        .bind(record.expires_in)
        .bind(&record.scopes)
        .bind(&record.raw)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// 按主键更新令牌数据
    async fn update(&self, record: &ProviderLinkRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE provider_links
            SET updated_at = $2, subject = $3, email = $4,
                access_token = $5, token_type = $6, refresh_token = $7,
                expiry = $8, expires_in = $9, scopes = $10, raw = $11
            WHERE id = $1
            "#,
        )
        .bind(&record.meta.id)
        .bind(record.meta.updated_at)
        .bind(&record.subject)
        .bind(&record.email)
        .bind(&record.access_token)
        .bind(&record.token_type)
        .bind(&record.refresh_token)
        .bind(record.expiry)
        .bind(record.expires_in)
        .bind(&record.scopes)
        .bind(&record.raw)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// 按主键删除；行不存在时视为成功
    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM provider_links WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ProviderLinkRecord>> {
        let query = format!(
            "SELECT {} FROM provider_links WHERE id = $1",
            PROVIDER_LINK_COLUMNS
        );
        let record = sqlx::query_as::<_, ProviderLinkRecord>(&query)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        Ok(record)
    }

    async fn find_by_owner(
        &self,
        provider: &str,
        owner_id: &str,
    ) -> Result<Option<ProviderLinkRecord>> {
        let query = format!(
            "SELECT {} FROM provider_links WHERE provider = $1 AND owner_id = $2",
            PROVIDER_LINK_COLUMNS
        );
        let record = sqlx::query_as::<_, ProviderLinkRecord>(&query)
            .bind(provider)
            .bind(owner_id)
            .fetch_optional(&*self.db)
            .await?;
        Ok(record)
    }

    async fn find_by_email(
        &self,
        provider: &str,
        email: &str,
    ) -> Result<Option<ProviderLinkRecord>> {
        let query = format!(
            "SELECT {} FROM provider_links WHERE provider = $1 AND email = $2",
            PROVIDER_LINK_COLUMNS
        );
        let record = sqlx::query_as::<_, ProviderLinkRecord>(&query)
            .bind(provider)
            .bind(email)
            .fetch_optional(&*self.db)
            .await?;
        Ok(record)
    }
}
