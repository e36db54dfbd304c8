//! 领域模型错误定义
//!
//! 定义了系统中所有可能的错误类型，提供清晰的错误上下文。
//! Web 层根据这些类型映射 HTTP 状态码，冲突类错误额外携带稳定的错误码。

use thiserror::Error;

/// 冲突类错误码（同一状态的重复操作）
///
/// 审批/删除/举报的幂等性守卫统一在两个实体上生效，
/// 前端可以根据错误码禁用已失效的操作按钮。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictCode {
    AlreadyApproved,
    AlreadyRejected,
    AlreadyDeleted,
    NotDeleted,
    AlreadyReported,
    AlreadyReviewed,
    AlreadyResolved,
}

impl ConflictCode {
    /// 对外暴露的稳定错误码
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyApproved => "ALREADY_APPROVED",
            Self::AlreadyRejected => "ALREADY_REJECTED",
            Self::AlreadyDeleted => "ALREADY_DELETED",
            Self::NotDeleted => "NOT_DELETED",
            Self::AlreadyReported => "ALREADY_REPORTED",
            Self::AlreadyReviewed => "ALREADY_REVIEWED",
            Self::AlreadyResolved => "ALREADY_RESOLVED",
        }
    }
}

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 输入验证错误
    #[error("验证失败: {field}: {message}")]
    Validation { field: String, message: String },

    /// 资源不存在错误
    #[error("资源不存在: {resource_type} ID {resource_id}")]
    NotFound {
        resource_type: String,
        resource_id: String,
    },

    /// 状态冲突错误（重复的审批、删除、举报等）
    #[error("状态冲突: {message}")]
    Conflict {
        code: ConflictCode,
        message: String,
    },

    /// 批量操作超出上限
    #[error("批量操作超出上限: {given}/{max}")]
    BatchSizeExceeded { given: usize, max: usize },

    /// 存储层错误（细节只记录日志，不向调用方泄露）
    #[error("数据库错误: {message}")]
    Database { message: String },
}

impl DomainError {
    /// 创建验证错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建资源不存在错误
    pub fn not_found(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// 创建状态冲突错误
    pub fn conflict(code: ConflictCode, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    /// 创建数据库错误
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
