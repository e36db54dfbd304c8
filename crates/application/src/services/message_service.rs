//! 留言服务
//!
//! 留言的完整生命周期：访客提交（始终进入 Pending）、管理员审核、
//! 软删除与恢复、点赞/点踩/举报互动、审核统计。
//! 提交与互动的限流在 Web 层执行（按指纹计数），本服务不重复检查。

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use domain::{
    validation, AuthorNameKind, BoardStatistics, ClientMetadata, DomainError, Message,
    MessageRepository, NoteStatus, PaginatedResult, Pagination, ReactionKind, Report,
    ValidationRules,
};

use crate::errors::ApplicationResult;

/// 提交留言请求
#[derive(Debug, Clone)]
pub struct CreateMessageRequest {
    pub content: String,
    pub color: String,
    pub author_name: Option<String>,
}

/// 审核请求（留言与评论共用同一形状）
#[derive(Debug, Clone)]
pub struct ModerationRequest {
    pub status: NoteStatus,
    pub moderated_by: String,
    pub rejection_reason: Option<String>,
}

/// 留言服务
pub struct MessageService {
    repository: Arc<dyn MessageRepository>,
    rules: ValidationRules,
}

impl MessageService {
    pub fn new(repository: Arc<dyn MessageRepository>, rules: ValidationRules) -> Self {
        Self { repository, rules }
    }

    /// 访客提交留言，初始状态固定为 Pending，不对提交者可见
    pub async fn create_message(
        &self,
        request: CreateMessageRequest,
        metadata: ClientMetadata,
    ) -> ApplicationResult<Message> {
        validation::validate_content(&request.content, &self.rules)?;
        validation::validate_color(&request.color)?;
        validation::validate_author_name(
            request.author_name.as_deref(),
            AuthorNameKind::Message,
            &self.rules,
        )?;

        let message = Message::new(
            request.content.trim(),
            request.color,
            request.author_name,
            metadata,
        );
        let stored = self.repository.create(&message).await?;
        info!(message_id = %stored.id, "新留言已提交，等待审核");
        Ok(stored)
    }

    /// 公开列表：只返回 Approved 且未删除的留言，按创建时间倒序
    pub async fn list_public(
        &self,
        pagination: Pagination,
    ) -> ApplicationResult<PaginatedResult<Message>> {
        let page = self
            .repository
            .find_by_status(Some(NoteStatus::Approved), pagination)
            .await?;
        Ok(page)
    }

    /// 管理端列表：可按任意状态过滤，`None` 为全部状态
    pub async fn list_admin(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> ApplicationResult<PaginatedResult<Message>> {
        Ok(self.repository.find_by_status(status, pagination).await?)
    }

    /// 公开读取单条留言，不可见（未通过或已删除）一律按不存在处理
    pub async fn get_public(&self, id: Uuid) -> ApplicationResult<Message> {
        let message = self.load(id).await?;
        if !message.is_visible() {
            return Err(DomainError::not_found("message", id.to_string()).into());
        }
        Ok(message)
    }

    /// 管理端读取单条留言（包含软删除与未审核的）
    pub async fn get_admin(&self, id: Uuid) -> ApplicationResult<Message> {
        self.load(id).await
    }

    /// 管理员审核：Approved 清空拒绝理由，Rejected 必须带理由。
    /// 改判（Rejected → Approved 等）允许，重复审核同一目标状态返回冲突。
    pub async fn moderate(
        &self,
        id: Uuid,
        request: ModerationRequest,
    ) -> ApplicationResult<Message> {
        validation::validate_rejection_reason(request.status, request.rejection_reason.as_deref())?;

        let mut message = self.load(id).await?;
        match request.status {
            NoteStatus::Approved => message.approve(&request.moderated_by)?,
            NoteStatus::Rejected => {
                let reason = request
                    .rejection_reason
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                message.reject(&request.moderated_by, reason)?;
            }
            NoteStatus::Pending => {
                return Err(
                    DomainError::validation("status", "不能将留言改回待审核状态").into(),
                );
            }
        }

        let updated = self.repository.update_moderation(&message).await?;
        info!(
            message_id = %id,
            status = %updated.status,
            moderated_by = %request.moderated_by,
            "留言审核完成"
        );
        Ok(updated)
    }

    /// 软删除（重复删除返回冲突）
    pub async fn delete(&self, id: Uuid, deleted_by: &str) -> ApplicationResult<()> {
        let mut message = self.load(id).await?;
        message.soft_delete(deleted_by)?;
        self.repository.soft_delete(&message).await?;
        info!(message_id = %id, deleted_by, "留言已软删除");
        Ok(())
    }

    /// 恢复软删除，恢复后保持删除前的审核状态
    pub async fn restore(&self, id: Uuid) -> ApplicationResult<Message> {
        let mut message = self.load(id).await?;
        message.restore()?;
        self.repository.restore(id).await?;
        info!(message_id = %id, "留言已恢复");
        Ok(message)
    }

    /// 点赞/点踩切换，只允许对可见留言操作
    pub async fn react(
        &self,
        id: Uuid,
        client_id: &str,
        kind: ReactionKind,
    ) -> ApplicationResult<(domain::ReactionState, usize)> {
        let message = self.load(id).await?;
        if !message.is_visible() {
            return Err(DomainError::not_found("message", id.to_string()).into());
        }
        let state = self.repository.toggle_reaction(id, client_id, kind).await?;
        Ok((state, message.reports.len()))
    }

    /// 举报可见留言，同一指纹重复举报返回冲突。
    /// 留言没有自动拒绝阈值（与评论不同），举报只累积供管理端查看。
    pub async fn report(
        &self,
        id: Uuid,
        client_id: &str,
        reason: &str,
    ) -> ApplicationResult<(Message, u32)> {
        let message = self.load(id).await?;
        if !message.is_visible() {
            return Err(DomainError::not_found("message", id.to_string()).into());
        }

        let report = Report::new(client_id, reason.trim());
        let count = self.repository.add_report(id, &report).await?;
        warn!(message_id = %id, report_count = count, "留言被举报");
        Ok((message, count))
    }

    /// 留言集合的审核统计
    pub async fn statistics(&self) -> ApplicationResult<BoardStatistics> {
        Ok(self.repository.get_statistics().await?)
    }

    /// 一次性迁移：为历史记录补互动字段默认值
    pub async fn backfill_interaction_fields(&self) -> ApplicationResult<u64> {
        let affected = self.repository.backfill_interaction_fields().await?;
        info!(affected, "互动字段回填完成");
        Ok(affected)
    }

    async fn load(&self, id: Uuid) -> ApplicationResult<Message> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("message", id.to_string()).into())
    }
}
