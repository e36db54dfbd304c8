//! 评论实体定义
//!
//! 评论挂在某条留言下（不强制外键，悬空的 message_id 在预览时表现为"留言不存在"）。
//! 与留言共享审核/软删除/互动语义，额外带有自动拒绝阈值：
//! 举报数达到阈值时由系统自动转为 Rejected。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClientMetadata, Moderation, NoteStatus, ReactionKind, Report};
use crate::errors::{ConflictCode, DomainError, DomainResult};

/// 系统自动审核时记录的审核人标识
pub const SYSTEM_MODERATOR: &str = "system";

/// 评论实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// 评论唯一ID
    pub id: Uuid,
    /// 所属留言ID（不强制引用完整性）
    pub message_id: Uuid,
    /// 评论内容
    pub content: String,
    /// 可选的笔名
    pub author_name: Option<String>,
    /// 审核状态
    pub status: NoteStatus,
    /// 审核记录
    #[serde(flatten)]
    pub moderation: Moderation,
    /// 客户端元数据
    pub metadata: ClientMetadata,
    /// 点过赞的客户端指纹
    pub liked_by: Vec<String>,
    /// 点过踩的客户端指纹
    pub disliked_by: Vec<String>,
    /// 举报列表
    pub reports: Vec<Report>,
    /// 嵌套回复占位字段（当前流程未使用）
    pub parent_comment_id: Option<Uuid>,
    pub reply_count: u32,
    /// 软删除
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    /// 时间戳
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// 创建新评论，初始状态固定为 Pending
    pub fn new(
        message_id: Uuid,
        content: impl Into<String>,
        author_name: Option<String>,
        metadata: ClientMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            message_id,
            content: content.into(),
            author_name,
            status: NoteStatus::Pending,
            moderation: Moderation::default(),
            metadata,
            liked_by: Vec::new(),
            disliked_by: Vec::new(),
            reports: Vec::new(),
            parent_comment_id: None,
            reply_count: 0,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.status == NoteStatus::Approved && !self.is_deleted()
    }

    pub fn reaction_of(&self, client_id: &str) -> Option<ReactionKind> {
        if self.liked_by.iter().any(|c| c == client_id) {
            Some(ReactionKind::Like)
        } else if self.disliked_by.iter().any(|c| c == client_id) {
            Some(ReactionKind::Dislike)
        } else {
            None
        }
    }

    pub fn reported_by(&self, client_id: &str) -> bool {
        self.reports.iter().any(|r| r.reported_by == client_id)
    }

    /// 审批通过，重复审批视为冲突
    pub fn approve(&mut self, moderated_by: impl Into<String>) -> DomainResult<()> {
        if self.status == NoteStatus::Approved {
            return Err(DomainError::conflict(
                ConflictCode::AlreadyApproved,
                "评论已是通过状态",
            ));
        }
        self.status = NoteStatus::Approved;
        self.moderation = Moderation {
            moderated_at: Some(Utc::now()),
            moderated_by: Some(moderated_by.into()),
            rejection_reason: None,
        };
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 审批拒绝
    pub fn reject(
        &mut self,
        moderated_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> DomainResult<()> {
        if self.status == NoteStatus::Rejected {
            return Err(DomainError::conflict(
                ConflictCode::AlreadyRejected,
                "评论已是拒绝状态",
            ));
        }
        self.status = NoteStatus::Rejected;
        self.moderation = Moderation {
            moderated_at: Some(Utc::now()),
            moderated_by: Some(moderated_by.into()),
            rejection_reason: Some(reason.into()),
        };
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn soft_delete(&mut self, deleted_by: impl Into<String>) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::conflict(
                ConflictCode::AlreadyDeleted,
                "评论已被删除",
            ));
        }
        self.deleted_at = Some(Utc::now());
        self.deleted_by = Some(deleted_by.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn restore(&mut self) -> DomainResult<()> {
        if !self.is_deleted() {
            return Err(DomainError::conflict(
                ConflictCode::NotDeleted,
                "评论未被删除，无法恢复",
            ));
        }
        self.deleted_at = None;
        self.deleted_by = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn toggle_reaction(&mut self, client_id: &str, kind: ReactionKind) {
        let (target, opposite) = match kind {
            ReactionKind::Like => (&mut self.liked_by, &mut self.disliked_by),
            ReactionKind::Dislike => (&mut self.disliked_by, &mut self.liked_by),
        };
        opposite.retain(|c| c != client_id);
        if target.iter().any(|c| c == client_id) {
            target.retain(|c| c != client_id);
        } else {
            target.push(client_id.to_string());
        }
        self.updated_at = Utc::now();
    }

    pub fn add_report(&mut self, report: Report) -> DomainResult<usize> {
        if self.reported_by(&report.reported_by) {
            return Err(DomainError::conflict(
                ConflictCode::AlreadyReported,
                "该客户端已举报过此内容",
            ));
        }
        self.reports.push(report);
        self.updated_at = Utc::now();
        Ok(self.reports.len())
    }
}
