//! 内存Repository实现
//!
//! 实现领域层的 Repository 接口（用于单元测试和无数据库的演示部署）。
//! 与 PostgreSQL 实现遵守相同的契约：默认列表排除软删除、按创建时间倒序、
//! 互动写入在持有写锁期间完成（等价于存储层的原子集合操作）。

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::{
    BoardStatistics, Comment, CommentRepository, DomainError, DomainResult, Message,
    MessageRepository, NoteStatus, PaginatedResult, Pagination, ReactionKind, ReactionState,
    Report, ViolationReport, ViolationReportRepository, ViolationStatus,
};

fn paginate<T: Clone>(mut items: Vec<T>, pagination: Pagination) -> PaginatedResult<T> {
    let total = items.len() as u64;
    let start = (pagination.offset as usize).min(items.len());
    let end = (start + pagination.limit as usize).min(items.len());
    let page = items.drain(start..end).collect();
    PaginatedResult::new(page, total, pagination)
}

fn statistics_of<'a, I>(items: I) -> BoardStatistics
where
    I: Iterator<Item = (&'a NoteStatus, bool, usize, chrono::DateTime<Utc>)>,
{
    let today = Utc::now().date_naive();
    let mut stats = BoardStatistics::default();
    for (status, deleted, report_count, created_at) in items {
        stats.total += 1;
        if deleted {
            stats.deleted_count += 1;
            continue;
        }
        match status {
            NoteStatus::Pending => stats.pending += 1,
            NoteStatus::Approved => stats.approved += 1,
            NoteStatus::Rejected => stats.rejected += 1,
        }
        if report_count > 0 {
            stats.reported_count += 1;
        }
        if created_at.date_naive() == today {
            stats.today_count += 1;
        }
    }
    stats
}

/// 内存留言Repository
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<HashMap<Uuid, Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &Message) -> DomainResult<Message> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message.clone());
        Ok(message.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Message>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn find_by_status(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Message>> {
        let messages = self.messages.read().await;
        let mut matched: Vec<Message> = messages
            .values()
            .filter(|m| !m.is_deleted())
            .filter(|m| status.map_or(true, |s| m.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matched, pagination))
    }

    async fn update_moderation(&self, message: &Message) -> DomainResult<Message> {
        let mut messages = self.messages.write().await;
        let stored = messages
            .get_mut(&message.id)
            .ok_or_else(|| DomainError::not_found("message", message.id.to_string()))?;
        stored.status = message.status;
        stored.moderation = message.moderation.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn soft_delete(&self, message: &Message) -> DomainResult<()> {
        let mut messages = self.messages.write().await;
        let stored = messages
            .get_mut(&message.id)
            .ok_or_else(|| DomainError::not_found("message", message.id.to_string()))?;
        stored.deleted_at = message.deleted_at;
        stored.deleted_by = message.deleted_by.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> DomainResult<()> {
        let mut messages = self.messages.write().await;
        let stored = messages
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("message", id.to_string()))?;
        stored.deleted_at = None;
        stored.deleted_by = None;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn toggle_reaction(
        &self,
        id: Uuid,
        client_id: &str,
        kind: ReactionKind,
    ) -> DomainResult<ReactionState> {
        let mut messages = self.messages.write().await;
        let stored = messages
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("message", id.to_string()))?;
        stored.toggle_reaction(client_id, kind);
        Ok(ReactionState {
            liked_by: stored.liked_by.clone(),
            disliked_by: stored.disliked_by.clone(),
        })
    }

    async fn add_report(&self, id: Uuid, report: &Report) -> DomainResult<u32> {
        let mut messages = self.messages.write().await;
        let stored = messages
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("message", id.to_string()))?;
        let count = stored.add_report(report.clone())?;
        Ok(count as u32)
    }

    async fn get_statistics(&self) -> DomainResult<BoardStatistics> {
        let messages = self.messages.read().await;
        Ok(statistics_of(messages.values().map(|m| {
            (&m.status, m.is_deleted(), m.reports.len(), m.created_at)
        })))
    }

    async fn backfill_interaction_fields(&self) -> DomainResult<u64> {
        // 内存实现从不缺字段，迁移无事可做
        Ok(0)
    }
}

/// 内存评论Repository
#[derive(Default)]
pub struct InMemoryCommentRepository {
    comments: Arc<RwLock<HashMap<Uuid, Comment>>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create(&self, comment: &Comment) -> DomainResult<Comment> {
        let mut comments = self.comments.write().await;
        comments.insert(comment.id, comment.clone());
        Ok(comment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Comment>> {
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn find_by_message(
        &self,
        message_id: Uuid,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Comment>> {
        let comments = self.comments.read().await;
        let mut matched: Vec<Comment> = comments
            .values()
            .filter(|c| c.message_id == message_id && !c.is_deleted())
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matched, pagination))
    }

    async fn find_by_status(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Comment>> {
        let comments = self.comments.read().await;
        let mut matched: Vec<Comment> = comments
            .values()
            .filter(|c| !c.is_deleted())
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matched, pagination))
    }

    async fn update_moderation(&self, comment: &Comment) -> DomainResult<Comment> {
        let mut comments = self.comments.write().await;
        let stored = comments
            .get_mut(&comment.id)
            .ok_or_else(|| DomainError::not_found("comment", comment.id.to_string()))?;
        stored.status = comment.status;
        stored.moderation = comment.moderation.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn soft_delete(&self, comment: &Comment) -> DomainResult<()> {
        let mut comments = self.comments.write().await;
        let stored = comments
            .get_mut(&comment.id)
            .ok_or_else(|| DomainError::not_found("comment", comment.id.to_string()))?;
        stored.deleted_at = comment.deleted_at;
        stored.deleted_by = comment.deleted_by.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> DomainResult<()> {
        let mut comments = self.comments.write().await;
        let stored = comments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("comment", id.to_string()))?;
        stored.deleted_at = None;
        stored.deleted_by = None;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn toggle_reaction(
        &self,
        id: Uuid,
        client_id: &str,
        kind: ReactionKind,
    ) -> DomainResult<ReactionState> {
        let mut comments = self.comments.write().await;
        let stored = comments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("comment", id.to_string()))?;
        stored.toggle_reaction(client_id, kind);
        Ok(ReactionState {
            liked_by: stored.liked_by.clone(),
            disliked_by: stored.disliked_by.clone(),
        })
    }

    async fn add_report(&self, id: Uuid, report: &Report) -> DomainResult<u32> {
        let mut comments = self.comments.write().await;
        let stored = comments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("comment", id.to_string()))?;
        let count = stored.add_report(report.clone())?;
        Ok(count as u32)
    }

    async fn batch_update_moderation(
        &self,
        ids: &[Uuid],
        status: NoteStatus,
        moderated_by: &str,
        rejection_reason: Option<&str>,
    ) -> DomainResult<u64> {
        let mut comments = self.comments.write().await;
        let now = Utc::now();
        let mut affected = 0;
        for id in ids {
            if let Some(stored) = comments.get_mut(id) {
                if stored.status == status {
                    continue;
                }
                stored.status = status;
                stored.moderation = domain::Moderation {
                    moderated_at: Some(now),
                    moderated_by: Some(moderated_by.to_string()),
                    rejection_reason: rejection_reason.map(str::to_string),
                };
                stored.updated_at = now;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn batch_soft_delete(&self, ids: &[Uuid], deleted_by: &str) -> DomainResult<u64> {
        let mut comments = self.comments.write().await;
        let now = Utc::now();
        let mut affected = 0;
        for id in ids {
            if let Some(stored) = comments.get_mut(id) {
                if stored.is_deleted() {
                    continue;
                }
                stored.deleted_at = Some(now);
                stored.deleted_by = Some(deleted_by.to_string());
                stored.updated_at = now;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn get_statistics(&self) -> DomainResult<BoardStatistics> {
        let comments = self.comments.read().await;
        Ok(statistics_of(comments.values().map(|c| {
            (&c.status, c.is_deleted(), c.reports.len(), c.created_at)
        })))
    }
}

/// 内存违规举报Repository
#[derive(Default)]
pub struct InMemoryViolationReportRepository {
    reports: Arc<RwLock<HashMap<Uuid, ViolationReport>>>,
}

impl InMemoryViolationReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ViolationReportRepository for InMemoryViolationReportRepository {
    async fn create(&self, report: &ViolationReport) -> DomainResult<ViolationReport> {
        let mut reports = self.reports.write().await;
        reports.insert(report.id, report.clone());
        Ok(report.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ViolationReport>> {
        Ok(self.reports.read().await.get(&id).cloned())
    }

    async fn find_by_status(
        &self,
        status: Option<ViolationStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<ViolationReport>> {
        let reports = self.reports.read().await;
        let mut matched: Vec<ViolationReport> = reports
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matched, pagination))
    }

    async fn update_review(&self, report: &ViolationReport) -> DomainResult<ViolationReport> {
        let mut reports = self.reports.write().await;
        let stored = reports
            .get_mut(&report.id)
            .ok_or_else(|| DomainError::not_found("violation_report", report.id.to_string()))?;
        stored.status = report.status;
        stored.reviewed_at = report.reviewed_at;
        stored.reviewed_by = report.reviewed_by.clone();
        stored.admin_notes = report.admin_notes.clone();
        Ok(stored.clone())
    }
}
