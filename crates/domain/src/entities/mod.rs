//! 实体定义
//!
//! 留言板的三类核心实体：留言（Message）、评论（Comment）、平台违规举报（ViolationReport），
//! 以及它们共享的状态、举报和客户端元数据类型。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

pub mod comment;
pub mod message;
pub mod violation_report;

pub use comment::Comment;
pub use message::Message;
pub use violation_report::{ViolationReport, ViolationStatus, ViolationType};

/// 审核状态枚举
///
/// 所有公开提交的内容都从 Pending 开始，由管理员审批为 Approved 或 Rejected。
/// 线上序列化为大写形式（区分大小写）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// 区分大小写地解析状态字符串
    pub fn parse(value: &str) -> DomainResult<Self> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(DomainError::validation(
                "status",
                format!("无效的状态值: {}", other),
            )),
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 反应类型（点赞/点踩）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Dislike,
}

/// 单条内容举报
///
/// `reported_by` 是客户端指纹而非原始 IP，同一指纹对一条内容最多举报一次。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub reported_at: DateTime<Utc>,
    pub reported_by: String,
    pub reason: String,
}

impl Report {
    pub fn new(reported_by: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reported_at: Utc::now(),
            reported_by: reported_by.into(),
            reason: reason.into(),
        }
    }
}

/// 客户端请求元数据（管理端展示用）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub ip_address: String,
    pub user_agent: String,
}

/// 审核记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moderation {
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderated_by: Option<String>,
    pub rejection_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_sensitive() {
        assert_eq!(NoteStatus::parse("PENDING").unwrap(), NoteStatus::Pending);
        assert_eq!(NoteStatus::parse("APPROVED").unwrap(), NoteStatus::Approved);
        assert!(NoteStatus::parse("pending").is_err());
        assert!(NoteStatus::parse("Approved").is_err());
        assert!(NoteStatus::parse("").is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&NoteStatus::Rejected).unwrap();
        assert_eq!(json, "\"REJECTED\"");
        let back: NoteStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(back, NoteStatus::Pending);
    }
}
