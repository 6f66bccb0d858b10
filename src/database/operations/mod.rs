// PostgreSQL 存储实现
// 所有语句运行时绑定参数，建表语句由各存储库的 ensure_schema 提供

pub mod account;
pub mod provider;
pub mod request;

pub use account::PgAccountStore;
pub use provider::PgProviderLinkStore;
pub use request::{PgEmailChangeStore, PgPasswordResetStore};
