//! 评论服务
//!
//! 评论复用留言的审核/软删除/互动语义，额外承担三件事：
//! 创建时的双层限流（全局按IP在前，按指纹+留言的窄限制在后）、
//! 拒绝时的默认理由兜底（全系统仅此一处）、
//! 举报数达到阈值时的系统自动拒绝。

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use config::{ModerationConfig, RateLimitConfig};
use domain::{
    validation, AuthorNameKind, BoardStatistics, ClientMetadata, Comment, CommentRepository,
    DomainError, MessageRepository, NoteStatus, PaginatedResult, Pagination, ReactionKind, Report,
    ValidationRules, SYSTEM_MODERATOR,
};

use crate::client_identity::ClientIdentity;
use crate::dto::BatchAction;
use crate::errors::{ApplicationError, ApplicationResult};
use crate::rate_limiter::FixedWindowRateLimiter;
use crate::services::message_service::ModerationRequest;

/// 拒绝评论但未给理由时使用的默认理由
pub const DEFAULT_REJECTION_REASON: &str = "违反社区规范";

/// 举报数达到阈值时系统自动拒绝记录的理由
const AUTO_REJECT_REASON: &str = "举报数达到阈值，系统自动下线";

/// 创建评论请求
#[derive(Debug, Clone)]
pub struct CreateCommentRequest {
    pub message_id: Uuid,
    pub content: String,
    pub author_name: Option<String>,
}

/// 批量操作请求
#[derive(Debug, Clone)]
pub struct BatchCommentRequest {
    pub ids: Vec<Uuid>,
    pub action: BatchAction,
    pub moderated_by: String,
    pub rejection_reason: Option<String>,
}

/// 评论服务
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    messages: Arc<dyn MessageRepository>,
    rate_limiter: Arc<FixedWindowRateLimiter>,
    rate_limits: RateLimitConfig,
    moderation: ModerationConfig,
    rules: ValidationRules,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        messages: Arc<dyn MessageRepository>,
        rate_limiter: Arc<FixedWindowRateLimiter>,
        rate_limits: RateLimitConfig,
        moderation: ModerationConfig,
        rules: ValidationRules,
    ) -> Self {
        Self {
            comments,
            messages,
            rate_limiter,
            rate_limits,
            moderation,
            rules,
        }
    }

    /// 访客对可见留言发表评论，初始状态固定为 Pending。
    ///
    /// 限流顺序固定：先全局按IP（防大面积灌水），后按（指纹, 留言）
    /// （防盯住单条刷楼）。任一层拒绝即返回 429，不计入另一层。
    pub async fn create_comment(
        &self,
        request: CreateCommentRequest,
        identity: &ClientIdentity,
        metadata: ClientMetadata,
    ) -> ApplicationResult<Comment> {
        validation::validate_content(&request.content, &self.rules)?;
        validation::validate_author_name(
            request.author_name.as_deref(),
            AuthorNameKind::Comment,
            &self.rules,
        )?;

        let global_key = format!("comments:ip:{}", identity.ip);
        let decision = self
            .rate_limiter
            .check(&global_key, self.rate_limits.comments_global);
        if !decision.allowed {
            return Err(rate_limited(decision.reset_at));
        }

        let per_message_key = format!(
            "comments:msg:{}:{}",
            identity.fingerprint, request.message_id
        );
        let decision = self
            .rate_limiter
            .check(&per_message_key, self.rate_limits.comments_per_message);
        if !decision.allowed {
            return Err(rate_limited(decision.reset_at));
        }

        let message = self
            .messages
            .find_by_id(request.message_id)
            .await?
            .filter(|m| m.is_visible())
            .ok_or_else(|| {
                DomainError::not_found("message", request.message_id.to_string())
            })?;

        let comment = Comment::new(
            message.id,
            request.content.trim(),
            request.author_name,
            metadata,
        );
        let stored = self.comments.create(&comment).await?;
        info!(comment_id = %stored.id, message_id = %message.id, "新评论已提交，等待审核");
        Ok(stored)
    }

    /// 某条留言下的公开评论列表（只含 Approved 且未删除）
    pub async fn list_public(
        &self,
        message_id: Uuid,
        pagination: Pagination,
    ) -> ApplicationResult<PaginatedResult<Comment>> {
        Ok(self
            .comments
            .find_by_message(message_id, Some(NoteStatus::Approved), pagination)
            .await?)
    }

    /// 管理端全站评论列表，可按状态过滤
    pub async fn list_admin(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> ApplicationResult<PaginatedResult<Comment>> {
        Ok(self.comments.find_by_status(status, pagination).await?)
    }

    /// 管理端读取单条评论
    pub async fn get_admin(&self, id: Uuid) -> ApplicationResult<Comment> {
        self.load(id).await
    }

    /// 管理员审核单条评论。拒绝但未给理由时以默认理由兜底，
    /// 这是全系统唯一注入默认理由的位置——留言审核仍要求显式理由。
    pub async fn moderate(
        &self,
        id: Uuid,
        request: ModerationRequest,
    ) -> ApplicationResult<Comment> {
        let mut comment = self.load(id).await?;
        match request.status {
            NoteStatus::Approved => comment.approve(&request.moderated_by)?,
            NoteStatus::Rejected => {
                let reason = effective_reason(request.rejection_reason.as_deref());
                comment.reject(&request.moderated_by, reason)?;
            }
            NoteStatus::Pending => {
                return Err(
                    DomainError::validation("status", "不能将评论改回待审核状态").into(),
                );
            }
        }

        let updated = self.comments.update_moderation(&comment).await?;
        info!(
            comment_id = %id,
            status = %updated.status,
            moderated_by = %request.moderated_by,
            "评论审核完成"
        );
        Ok(updated)
    }

    /// 软删除
    pub async fn delete(&self, id: Uuid, deleted_by: &str) -> ApplicationResult<()> {
        let mut comment = self.load(id).await?;
        comment.soft_delete(deleted_by)?;
        self.comments.soft_delete(&comment).await?;
        info!(comment_id = %id, deleted_by, "评论已软删除");
        Ok(())
    }

    /// 恢复软删除
    pub async fn restore(&self, id: Uuid) -> ApplicationResult<Comment> {
        let mut comment = self.load(id).await?;
        comment.restore()?;
        self.comments.restore(id).await?;
        info!(comment_id = %id, "评论已恢复");
        Ok(comment)
    }

    /// 点赞/点踩切换，只允许对可见评论操作
    pub async fn react(
        &self,
        id: Uuid,
        client_id: &str,
        kind: ReactionKind,
    ) -> ApplicationResult<(domain::ReactionState, usize)> {
        let comment = self.load(id).await?;
        if !comment.is_visible() {
            return Err(DomainError::not_found("comment", id.to_string()).into());
        }
        let state = self.comments.toggle_reaction(id, client_id, kind).await?;
        Ok((state, comment.reports.len()))
    }

    /// 举报可见评论。举报数达到 `auto_reject_threshold` 时由系统
    /// 自动转为 Rejected（审核人记为 "system"），阈值及之后的举报
    /// 不重复触发转换。
    pub async fn report(
        &self,
        id: Uuid,
        client_id: &str,
        reason: &str,
    ) -> ApplicationResult<(Comment, u32)> {
        let comment = self.load(id).await?;
        if !comment.is_visible() {
            return Err(DomainError::not_found("comment", id.to_string()).into());
        }

        let report = Report::new(client_id, reason.trim());
        let count = self.comments.add_report(id, &report).await?;
        warn!(comment_id = %id, report_count = count, "评论被举报");

        if count >= self.moderation.auto_reject_threshold {
            self.auto_reject(id, count).await?;
        }

        let updated = self.load(id).await?;
        Ok((updated, count))
    }

    /// 批量审核/删除。超过最大条数在任何写入前整体拒绝；
    /// 存储层单条多行写入，不提供按条成功/失败的粒度。
    pub async fn batch(&self, request: BatchCommentRequest) -> ApplicationResult<u64> {
        if request.ids.is_empty() {
            return Err(DomainError::validation("ids", "批量操作的ID列表不能为空").into());
        }
        if request.ids.len() > self.moderation.max_batch_size {
            return Err(DomainError::BatchSizeExceeded {
                given: request.ids.len(),
                max: self.moderation.max_batch_size,
            }
            .into());
        }

        let affected = match request.action {
            BatchAction::Approve => {
                self.comments
                    .batch_update_moderation(
                        &request.ids,
                        NoteStatus::Approved,
                        &request.moderated_by,
                        None,
                    )
                    .await?
            }
            BatchAction::Reject => {
                let reason = effective_reason(request.rejection_reason.as_deref());
                self.comments
                    .batch_update_moderation(
                        &request.ids,
                        NoteStatus::Rejected,
                        &request.moderated_by,
                        Some(&reason),
                    )
                    .await?
            }
            BatchAction::Delete => {
                self.comments
                    .batch_soft_delete(&request.ids, &request.moderated_by)
                    .await?
            }
        };

        info!(
            action = request.action.as_str(),
            requested = request.ids.len(),
            affected,
            "批量评论操作完成"
        );
        Ok(affected)
    }

    /// 评论集合的审核统计
    pub async fn statistics(&self) -> ApplicationResult<BoardStatistics> {
        Ok(self.comments.get_statistics().await?)
    }

    async fn auto_reject(&self, id: Uuid, count: u32) -> ApplicationResult<()> {
        let mut comment = self.load(id).await?;
        if comment.status == NoteStatus::Rejected {
            return Ok(());
        }
        comment.reject(SYSTEM_MODERATOR, AUTO_REJECT_REASON)?;
        self.comments.update_moderation(&comment).await?;
        warn!(comment_id = %id, report_count = count, "评论举报达到阈值，已自动拒绝");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> ApplicationResult<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", id.to_string()).into())
    }
}

fn effective_reason(reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => r.to_string(),
        None => DEFAULT_REJECTION_REASON.to_string(),
    }
}

fn rate_limited(reset_at: chrono::DateTime<chrono::Utc>) -> ApplicationError {
    let retry_after_secs = (reset_at - chrono::Utc::now()).num_seconds().max(0) as u64;
    ApplicationError::RateLimited {
        reset_at,
        retry_after_secs,
    }
}
