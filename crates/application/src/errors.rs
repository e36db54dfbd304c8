//! 应用层错误定义
//!
//! 包装领域错误并补充跨切面错误：限流与认证。

use chrono::{DateTime, Utc};
use domain::DomainError;
use thiserror::Error;

/// 应用层错误类型
#[derive(Error, Debug, Clone)]
pub enum ApplicationError {
    /// 领域错误透传
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 限流拒绝，携带窗口重置时间供 Retry-After 使用
    #[error("请求过于频繁，请在 {retry_after_secs} 秒后重试")]
    RateLimited {
        reset_at: DateTime<Utc>,
        retry_after_secs: u64,
    },

    /// 未认证（无会话）
    #[error("未认证: {0}")]
    Unauthorized(String),

    /// 已认证但无管理员权限
    #[error("权限不足: {0}")]
    Forbidden(String),
}

/// 应用层结果类型
pub type ApplicationResult<T> = Result<T, ApplicationError>;
