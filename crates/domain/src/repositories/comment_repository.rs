//! 评论Repository接口定义

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Comment, NoteStatus, ReactionKind, Report};
use crate::errors::DomainResult;
use crate::repositories::{BoardStatistics, PaginatedResult, Pagination, ReactionState};

/// 评论Repository接口
///
/// 与留言相同的软删除过滤和原子互动约定，额外提供按留言查询与批量写入。
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// 创建新评论
    async fn create(&self, comment: &Comment) -> DomainResult<Comment>;

    /// 根据ID查找评论（包含软删除的记录）
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Comment>>;

    /// 按留言分页列出评论；`status` 为 `None` 时不过滤状态（管理端）。
    async fn find_by_message(
        &self,
        message_id: Uuid,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Comment>>;

    /// 全站按状态分页列出评论（管理端）
    async fn find_by_status(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Comment>>;

    /// 持久化审核结果
    async fn update_moderation(&self, comment: &Comment) -> DomainResult<Comment>;

    /// 软删除
    async fn soft_delete(&self, comment: &Comment) -> DomainResult<()>;

    /// 恢复软删除
    async fn restore(&self, id: Uuid) -> DomainResult<()>;

    /// 原子地切换反应
    async fn toggle_reaction(
        &self,
        id: Uuid,
        client_id: &str,
        kind: ReactionKind,
    ) -> DomainResult<ReactionState>;

    /// 原子地追加举报，返回更新后的举报总数
    async fn add_report(&self, id: Uuid, report: &Report) -> DomainResult<u32>;

    /// 批量写入审核结果，单条多行 UPDATE，返回受影响行数。
    /// 不提供按条成功/失败的粒度。
    async fn batch_update_moderation(
        &self,
        ids: &[Uuid],
        status: NoteStatus,
        moderated_by: &str,
        rejection_reason: Option<&str>,
    ) -> DomainResult<u64>;

    /// 批量软删除，返回受影响行数（已删除的行不重复计数）
    async fn batch_soft_delete(&self, ids: &[Uuid], deleted_by: &str) -> DomainResult<u64>;

    /// 一趟聚合全部审核统计
    async fn get_statistics(&self) -> DomainResult<BoardStatistics>;
}
