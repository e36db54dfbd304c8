//! 平台违规举报实体定义
//!
//! 独立于单条内容的举报：任何客户端都可以提交，只能由管理员推进状态，
//! 不存在自动转换。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ConflictCode, DomainError, DomainResult};

/// 违规类别（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    Spam,
    Harassment,
    InappropriateContent,
    Misinformation,
    Other,
}

/// 违规举报处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationStatus {
    Pending,
    Reviewed,
    Resolved,
}

impl ViolationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewed => "REVIEWED",
            Self::Resolved => "RESOLVED",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "REVIEWED" => Ok(Self::Reviewed),
            "RESOLVED" => Ok(Self::Resolved),
            other => Err(DomainError::validation(
                "status",
                format!("无效的处理状态: {}", other),
            )),
        }
    }
}

/// 平台违规举报实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationReport {
    pub id: Uuid,
    pub report_type: ViolationType,
    pub description: String,
    /// 被举报内容的URL（可选）
    pub url: Option<String>,
    /// 相关留言ID（可选，不强制引用完整性）
    pub message_id: Option<Uuid>,
    pub status: ViolationStatus,
    /// 举报人的客户端指纹
    pub reported_by: String,
    /// 举报人的原始IP（仅管理端展示）
    pub reported_by_ip: String,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub admin_notes: Option<String>,
}

impl ViolationReport {
    pub fn new(
        report_type: ViolationType,
        description: impl Into<String>,
        url: Option<String>,
        message_id: Option<Uuid>,
        reported_by: impl Into<String>,
        reported_by_ip: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_type,
            description: description.into(),
            url,
            message_id,
            status: ViolationStatus::Pending,
            reported_by: reported_by.into(),
            reported_by_ip: reported_by_ip.into(),
            created_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            admin_notes: None,
        }
    }

    /// 管理员推进处理状态，同一状态的重复推进视为冲突
    pub fn review(
        &mut self,
        target: ViolationStatus,
        reviewed_by: impl Into<String>,
        admin_notes: Option<String>,
    ) -> DomainResult<()> {
        let code = match target {
            ViolationStatus::Pending => {
                return Err(DomainError::validation("status", "不能回退到待处理状态"))
            }
            ViolationStatus::Reviewed => ConflictCode::AlreadyReviewed,
            ViolationStatus::Resolved => ConflictCode::AlreadyResolved,
        };
        if self.status == target {
            return Err(DomainError::conflict(code, "举报已处于该处理状态"));
        }
        self.status = target;
        self.reviewed_at = Some(Utc::now());
        self.reviewed_by = Some(reviewed_by.into());
        if admin_notes.is_some() {
            self.admin_notes = admin_notes;
        }
        Ok(())
    }
}
