// 外部身份模块
// 第三方身份关联的记录与管理器

pub mod manager;
pub mod record;

// 重新导出常用类型，方便其他模块使用
pub use manager::{ProviderLinkFetcher, ProviderLinkManager};
pub use record::ProviderLinkRecord;
