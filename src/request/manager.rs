// 确认请求生命周期管理器
// 状态机：无请求 → 存活 → 消费或过期；过期后续期生成全新记录

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Duration;

use crate::database::RequestStore;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::request::record::{REQUEST_VALIDITY_HOURS, RequestPayload, RequestRecord};

/// 确认请求管理器，对负载类型泛型，邮箱变更与密码重置共用同一套协议
///
/// 存活检查是协作式的：并发的两次创建可能同时通过检查，各插入一行，
/// `find_by_owner` 之后始终以最新一条为准。
pub struct RequestManager<P, S> {
    store: Arc<S>,
    validity: Duration,
    _payload: PhantomData<fn() -> P>,
}

impl<P, S> RequestManager<P, S>
where
    P: RequestPayload,
    S: RequestStore<P>,
{
    /// 创建管理器，默认 48 小时有效期
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            validity: Duration::hours(REQUEST_VALIDITY_HOURS),
            _payload: PhantomData,
        }
    }

    /// 覆盖有效期
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// 创建新请求；属主已有存活请求时拒绝，过期残留先清除
    ///
    /// 返回的记录是令牌唯一一次对外披露。
    pub async fn create_request(&self, owner_id: &str, payload: P) -> Result<RequestRecord<P>> {
        if let Some(existing) = self.store.find_by_owner(owner_id).await? {
            if existing.is_expired() {
                self.store.delete(existing.id()).await?;
                tracing::debug!("removed stale {} request for {}", P::KIND, owner_id);
            } else {
                return Err(Error::RequestExists);
            }
        }

        let record = RequestRecord::new(owner_id, payload, self.validity);
        self.store.insert(&record).await?;
        tracing::info!("created {} request for {}", P::KIND, owner_id);
        Ok(record)
    }

    /// 只读查询属主的当前请求，无任何副作用
    pub async fn find_request(&self, owner_id: &str) -> Result<Option<RequestRecord<P>>> {
        self.store.find_by_owner(owner_id).await
    }

    /// 查属主请求并在过期时续期
    ///
    /// 无请求返回 NotFound；存活返回 RequestExists（不再披露令牌）；
    /// 过期则删除旧行，用原负载生成新令牌、新过期时间并返回。
    pub async fn get_or_renew(&self, owner_id: &str) -> Result<RequestRecord<P>> {
        let existing = self
            .store
            .find_by_owner(owner_id)
            .await?
            .ok_or(Error::NotFound)?;

        if !existing.is_expired() {
            return Err(Error::RequestExists);
        }

        self.store.delete(existing.id()).await?;
        let renewed = RequestRecord::new(owner_id, existing.payload.clone(), self.validity);
        self.store.insert(&renewed).await?;
        tracing::info!("renewed expired {} request for {}", P::KIND, owner_id);
        Ok(renewed)
    }

    /// 校验令牌并消费请求
    ///
    /// 成功时删除行并返回记录，调用方据此应用负载；同一令牌无法二次使用。
    pub async fn validate_request(&self, owner_id: &str, token: &str) -> Result<RequestRecord<P>> {
        let existing = self
            .store
            .find_by_owner(owner_id)
            .await?
            .ok_or(Error::NotFound)?;

        if existing.is_expired() {
            self.store.delete(existing.id()).await?;
            tracing::warn!("rejected expired {} request for {}", P::KIND, owner_id);
            return Err(Error::RequestExpired);
        }

        if existing.token != token {
            return Err(Error::InvalidToken);
        }

        self.store.delete(existing.id()).await?;
        tracing::info!("consumed {} request for {}", P::KIND, owner_id);
        Ok(existing)
    }

    /// 删除请求；行不存在时视为成功
    pub async fn delete_request(&self, record: &RequestRecord<P>) -> Result<()> {
        self.store.delete(record.id()).await?;
        Ok(())
    }
}
