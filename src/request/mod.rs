// 确认请求模块
// 短期确认请求的记录与生命周期管理器

pub mod manager;
pub mod record;

// 重新导出常用类型，方便其他模块使用
pub use manager::RequestManager;
pub use record::{
    EmailChangePayload, PasswordResetPayload, REQUEST_VALIDITY_HOURS, RequestPayload,
    RequestRecord,
};

/// 邮箱变更工作流的管理器别名
pub type EmailChangeManager<S> = RequestManager<EmailChangePayload, S>;

/// 密码重置工作流的管理器别名
pub type PasswordResetManager<S> = RequestManager<PasswordResetPayload, S>;
