use thiserror::Error;

/// 统一错误类型，覆盖存储、缓存、请求生命周期和令牌校验的所有失败场景
#[derive(Debug, Error)]
pub enum Error {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("a live request already exists for this owner")]
    RequestExists,

    #[error("request has expired")]
    RequestExpired,

    #[error("presented token does not match")]
    InvalidToken,

    #[error("unauthorized")]
    Unauthorized {
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("token encoding failed: {0}")]
    TokenEncoding(String),

    #[error("credential error: {0}")]
    Credential(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::AlreadyExists,
            other => Error::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::CacheUnavailable(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Credential(err.to_string())
    }
}
