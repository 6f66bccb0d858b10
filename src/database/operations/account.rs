// 账户存储库
// 包含账户相关的数据库操作

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::account::AccountRecord;
use crate::database::AccountStore;
use crate::error::{Error, Result};

const ACCOUNT_COLUMNS: &str = "id, short_id, created_at, updated_at, \
     name, username, password, password_updated_at, email, avatar, suspended";

/// 账户存储库，处理所有与账户相关的数据库操作
pub struct PgAccountStore {
    db: Arc<PgPool>,
}

impl PgAccountStore {
    /// 创建新的账户存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 建表（不存在时）；非空用户名与邮箱各自唯一
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                short_id TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                username TEXT NOT NULL DEFAULT '',
                password TEXT NOT NULL DEFAULT '',
                password_updated_at TIMESTAMPTZ,
                email TEXT NOT NULL DEFAULT '',
                avatar TEXT NOT NULL DEFAULT '',
                suspended BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
        )
        .execute(&*self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS accounts_username_key
            ON accounts (username) WHERE username <> ''
            "#,
        )
        .execute(&*self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_key
            ON accounts (email) WHERE email <> ''
            "#,
        )
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    async fn find_by_column(&self, column: &str, value: &str) -> Result<Option<AccountRecord>> {
        let query = format!(
            "SELECT {} FROM accounts WHERE {} = $1",
            ACCOUNT_COLUMNS, column
        );
        let record = sqlx::query_as::<_, AccountRecord>(&query)
            .bind(value)
            .fetch_optional(&*self.db)
            .await?;
        Ok(record)
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    /// 插入账户记录
    async fn insert(&self, record: &AccountRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, short_id, created_at, updated_at,
                name, username, password, password_updated_at,
                email, avatar, suspended
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&record.meta.id)
        .bind(&record.meta.short_id)
        .bind(record.meta.created_at)
        .bind(record.meta.updated_at)
        .bind(&record.name)
        .bind(&record.username)
        .bind(&record.password)
        .bind(record.password_updated_at)
        .bind(&record.email)
        .bind(&record.avatar)
        .bind(record.suspended)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// 按主键更新可变字段
    async fn update(&self, record: &AccountRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET updated_at = $2, name = $3, username = $4,
                password = $5, password_updated_at = $6,
                email = $7, avatar = $8, suspended = $9
            WHERE id = $1
            "#,
        )
        .bind(&record.meta.id)
        .bind(record.meta.updated_at)
        .bind(&record.name)
        .bind(&record.username)
        .bind(&record.password)
        .bind(record.password_updated_at)
        .bind(&record.email)
        .bind(&record.avatar)
        .bind(record.suspended)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// 按主键删除；行不存在时视为成功
    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AccountRecord>> {
        self.find_by_column("id", id).await
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<AccountRecord>> {
        self.find_by_column("short_id", short_id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>> {
        self.find_by_column("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        self.find_by_column("email", email).await
    }
}
