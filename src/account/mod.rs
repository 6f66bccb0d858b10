// 账户模块
// 账户记录与缓存同步管理器

pub mod manager;
pub mod record;

// 重新导出常用类型，方便其他模块使用
pub use manager::{AccountFetcher, AccountManager};
pub use record::AccountRecord;
