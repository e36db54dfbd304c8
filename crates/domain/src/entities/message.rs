//! 留言实体定义
//!
//! 留言是访客匿名提交的"便利贴"，从 Pending 开始经管理员审批，
//! 可被点赞/点踩/举报，支持软删除与恢复。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClientMetadata, Moderation, NoteStatus, ReactionKind, Report};
use crate::errors::{ConflictCode, DomainError, DomainResult};

/// 留言实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// 留言唯一ID
    pub id: Uuid,
    /// 留言内容
    pub content: String,
    /// 便利贴颜色（固定色板中的十六进制值）
    pub color: String,
    /// 可选的笔名
    pub author_name: Option<String>,
    /// 审核状态
    pub status: NoteStatus,
    /// 审核记录
    #[serde(flatten)]
    pub moderation: Moderation,
    /// 客户端元数据
    pub metadata: ClientMetadata,
    /// 点过赞的客户端指纹（集合语义，与 disliked_by 互斥）
    pub liked_by: Vec<String>,
    /// 点过踩的客户端指纹
    pub disliked_by: Vec<String>,
    /// 举报列表（每个指纹最多一条）
    pub reports: Vec<Report>,
    /// 软删除时间（设置后从默认列表中排除）
    pub deleted_at: Option<DateTime<Utc>>,
    /// 执行删除的管理员
    pub deleted_by: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// 创建新留言（内容在服务层已验证），初始状态固定为 Pending
    pub fn new(
        content: impl Into<String>,
        color: impl Into<String>,
        author_name: Option<String>,
        metadata: ClientMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            color: color.into(),
            author_name,
            status: NoteStatus::Pending,
            moderation: Moderation::default(),
            metadata,
            liked_by: Vec::new(),
            disliked_by: Vec::new(),
            reports: Vec::new(),
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否已被软删除
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// 对公众是否可见
    pub fn is_visible(&self) -> bool {
        self.status == NoteStatus::Approved && !self.is_deleted()
    }

    /// 指定客户端当前的反应状态
    pub fn reaction_of(&self, client_id: &str) -> Option<ReactionKind> {
        if self.liked_by.iter().any(|c| c == client_id) {
            Some(ReactionKind::Like)
        } else if self.disliked_by.iter().any(|c| c == client_id) {
            Some(ReactionKind::Dislike)
        } else {
            None
        }
    }

    /// 指定客户端是否已举报过
    pub fn reported_by(&self, client_id: &str) -> bool {
        self.reports.iter().any(|r| r.reported_by == client_id)
    }

    /// 审批通过
    ///
    /// 重复审批同一目标状态视为冲突；Rejected → Approved 的改判是允许的。
    pub fn approve(&mut self, moderated_by: impl Into<String>) -> DomainResult<()> {
        if self.status == NoteStatus::Approved {
            return Err(DomainError::conflict(
                ConflictCode::AlreadyApproved,
                "留言已是通过状态",
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

    /// 审批拒绝（必须给出理由）
    pub fn reject(
        &mut self,
        moderated_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> DomainResult<()> {
        if self.status == NoteStatus::Rejected {
            return Err(DomainError::conflict(
                ConflictCode::AlreadyRejected,
                "留言已是拒绝状态",
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

    /// 软删除
    pub fn soft_delete(&mut self, deleted_by: impl Into<String>) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::conflict(
                ConflictCode::AlreadyDeleted,
                "留言已被删除",
            ));
        }
        self.deleted_at = Some(Utc::now());
        self.deleted_by = Some(deleted_by.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 恢复软删除，恢复后保持删除前的审核状态
    pub fn restore(&mut self) -> DomainResult<()> {
        if !self.is_deleted() {
            return Err(DomainError::conflict(
                ConflictCode::NotDeleted,
                "留言未被删除，无法恢复",
            ));
        }
        self.deleted_at = None;
        self.deleted_by = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 切换反应（点赞/点踩互斥）
    ///
    /// 重复同一反应则取消；切换相反反应时先移除原有反应。
    /// 持久化层用原子的集合操作实现同样的语义，这里供内存实现与测试使用。
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

    /// 追加举报，同一指纹重复举报视为冲突
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Message {
        Message::new(
            "test confession",
            "#FFF9C4",
            None,
            ClientMetadata {
                ip_address: "203.0.113.7".to_string(),
                user_agent: "test-agent".to_string(),
            },
        )
    }

    #[test]
    fn test_new_message_starts_pending() {
        let msg = sample_message();
        assert_eq!(msg.status, NoteStatus::Pending);
        assert!(msg.moderation.moderated_at.is_none());
        assert!(msg.liked_by.is_empty());
        assert!(!msg.is_deleted());
        assert!(!msg.is_visible());
    }

    #[test]
    fn test_approve_then_approve_again_conflicts() {
        let mut msg = sample_message();
        msg.approve("admin@x.com").unwrap();
        assert_eq!(msg.status, NoteStatus::Approved);
        assert!(msg.moderation.moderated_at.is_some());
        assert_eq!(msg.moderation.moderated_by.as_deref(), Some("admin@x.com"));

        let moderated_at = msg.moderation.moderated_at;
        let err = msg.approve("admin@x.com").unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                code: ConflictCode::AlreadyApproved,
                ..
            }
        ));
        // 冲突不得改写审核时间
        assert_eq!(msg.moderation.moderated_at, moderated_at);
    }

    #[test]
    fn test_rejected_message_can_be_re_approved() {
        let mut msg = sample_message();
        msg.reject("admin@x.com", "off topic").unwrap();
        assert_eq!(msg.status, NoteStatus::Rejected);
        assert_eq!(
            msg.moderation.rejection_reason.as_deref(),
            Some("off topic")
        );

        // 改判允许，拒绝理由随之清空
        msg.approve("admin@x.com").unwrap();
        assert_eq!(msg.status, NoteStatus::Approved);
        assert!(msg.moderation.rejection_reason.is_none());
    }

    #[test]
    fn test_reaction_toggle_is_mutually_exclusive() {
        let mut msg = sample_message();
        msg.toggle_reaction("A", ReactionKind::Like);
        assert_eq!(msg.liked_by, vec!["A"]);

        msg.toggle_reaction("A", ReactionKind::Dislike);
        assert!(msg.liked_by.is_empty());
        assert_eq!(msg.disliked_by, vec!["A"]);

        // 重复点踩取消
        msg.toggle_reaction("A", ReactionKind::Dislike);
        assert!(msg.disliked_by.is_empty());
        assert_eq!(msg.reaction_of("A"), None);
    }

    #[test]
    fn test_report_dedup() {
        let mut msg = sample_message();
        assert_eq!(msg.add_report(Report::new("fp-1", "spam")).unwrap(), 1);

        let err = msg.add_report(Report::new("fp-1", "spam again")).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                code: ConflictCode::AlreadyReported,
                ..
            }
        ));
        assert_eq!(msg.reports.len(), 1);

        // 不同指纹可以继续举报
        assert_eq!(msg.add_report(Report::new("fp-2", "spam")).unwrap(), 2);
    }

    #[test]
    fn test_soft_delete_and_restore() {
        let mut msg = sample_message();
        msg.approve("admin@x.com").unwrap();
        msg.soft_delete("admin@x.com").unwrap();
        assert!(msg.is_deleted());
        assert!(!msg.is_visible());

        let err = msg.soft_delete("admin@x.com").unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                code: ConflictCode::AlreadyDeleted,
                ..
            }
        ));

        msg.restore().unwrap();
        assert!(!msg.is_deleted());
        // 恢复后保持删除前的状态
        assert_eq!(msg.status, NoteStatus::Approved);

        let err = msg.restore().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                code: ConflictCode::NotDeleted,
                ..
            }
        ));
    }
}
