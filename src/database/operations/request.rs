// 确认请求存储库
// 邮箱变更与密码重置请求各占一张表，结构只差负载列

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::RequestStore;
use crate::entity::EntityMeta;
use crate::error::Result;
use crate::request::{EmailChangePayload, PasswordResetPayload, RequestRecord};

#[derive(sqlx::FromRow)]
struct EmailChangeRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    owner_id: String,
    token: String,
    expires_at: DateTime<Utc>,
    previous_email: String,
    new_email: String,
}

impl From<EmailChangeRow> for RequestRecord<EmailChangePayload> {
    fn from(row: EmailChangeRow) -> Self {
        RequestRecord {
            meta: row.meta,
            owner_id: row.owner_id,
            token: row.token,
            expires_at: row.expires_at,
            payload: EmailChangePayload {
                previous_email: row.previous_email,
                new_email: row.new_email,
            },
        }
    }
}

/// 邮箱变更请求存储库
pub struct PgEmailChangeStore {
    db: Arc<PgPool>,
}

impl PgEmailChangeStore {
    /// 创建新的邮箱变更请求存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 建表（不存在时）
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS email_change_requests (
                id TEXT PRIMARY KEY,
                short_id TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                owner_id TEXT NOT NULL,
                token TEXT NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL,
                previous_email TEXT NOT NULL DEFAULT '',
                new_email TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&*self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RequestStore<EmailChangePayload> for PgEmailChangeStore {
    async fn insert(&self, record: &RequestRecord<EmailChangePayload>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO email_change_requests (
                id, short_id, created_at, updated_at,
                owner_id, token, expires_at, previous_email, new_email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.meta.id)
        .bind(&record.meta.short_id)
        .bind(record.meta.created_at)
        .bind(record.meta.updated_at)
        .bind(&record.owner_id)
        .bind(&record.token)
        .bind(record.expires_at)
        .bind(&record.payload.previous_email)
        .bind(&record.payload.new_email)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// 按主键删除；行不存在时视为成功
    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM email_change_requests WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// 查属主的最新请求
    async fn find_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Option<RequestRecord<EmailChangePayload>>> {
        let row = sqlx::query_as::<_, EmailChangeRow>(
            r#"
            SELECT id, short_id, created_at, updated_at,
                   owner_id, token, expires_at, previous_email, new_email
            FROM email_change_requests
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(RequestRecord::from))
    }
}

#[derive(sqlx::FromRow)]
struct PasswordResetRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    owner_id: String,
    token: String,
    expires_at: DateTime<Utc>,
}

impl From<PasswordResetRow> for RequestRecord<PasswordResetPayload> {
    fn from(row: PasswordResetRow) -> Self {
        RequestRecord {
            meta: row.meta,
            owner_id: row.owner_id,
            token: row.token,
            expires_at: row.expires_at,
            payload: PasswordResetPayload {},
        }
    }
}

/// 密码重置请求存储库
pub struct PgPasswordResetStore {
    db: Arc<PgPool>,
}

impl PgPasswordResetStore {
    /// 创建新的密码重置请求存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 建表（不存在时）
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS password_reset_requests (
                id TEXT PRIMARY KEY,
                short_id TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                owner_id TEXT NOT NULL,
                token TEXT NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&*self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RequestStore<PasswordResetPayload> for PgPasswordResetStore {
    async fn insert(&self, record: &RequestRecord<PasswordResetPayload>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_requests (
                id, short_id, created_at, updated_at,
                owner_id, token, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.meta.id)
        .bind(&record.meta.short_id)
        .bind(record.meta.created_at)
        .bind(record.meta.updated_at)
        .bind(&record.owner_id)
        .bind(&record.token)
        .bind(record.expires_at)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// 按主键删除；行不存在时视为成功
    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM password_reset_requests WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// 查属主的最新请求
    async fn find_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Option<RequestRecord<PasswordResetPayload>>> {
        let row = sqlx::query_as::<_, PasswordResetRow>(
            r#"
            SELECT id, short_id, created_at, updated_at,
                   owner_id, token, expires_at
            FROM password_reset_requests
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(RequestRecord::from))
    }
}
