//! 留言Repository接口定义

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Message, NoteStatus, ReactionKind, Report};
use crate::errors::DomainResult;
use crate::repositories::{BoardStatistics, PaginatedResult, Pagination, ReactionState};

/// 留言Repository接口
///
/// 默认的列表查询排除软删除记录；`find_by_id` 能取回软删除记录。
/// 反应与举报必须用原子的集合操作实现，禁止读-改-写。
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 创建新留言
    async fn create(&self, message: &Message) -> DomainResult<Message>;

    /// 根据ID查找留言（包含软删除的记录）
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Message>>;

    /// 按状态分页列出留言；`None` 表示全部状态（管理端）。
    /// 软删除记录一律排除，按创建时间倒序。
    async fn find_by_status(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Message>>;

    /// 持久化审核结果（状态、审核人、时间、拒绝理由）
    async fn update_moderation(&self, message: &Message) -> DomainResult<Message>;

    /// 软删除
    async fn soft_delete(&self, message: &Message) -> DomainResult<()>;

    /// 恢复软删除
    async fn restore(&self, id: Uuid) -> DomainResult<()>;

    /// 原子地切换反应：重复反应取消，相反反应先移除后添加。
    /// 返回更新后的数组状态。
    async fn toggle_reaction(
        &self,
        id: Uuid,
        client_id: &str,
        kind: ReactionKind,
    ) -> DomainResult<ReactionState>;

    /// 原子地追加举报；同一指纹重复举报返回 `Conflict(ALREADY_REPORTED)`。
    /// 返回更新后的举报总数。
    async fn add_report(&self, id: Uuid, report: &Report) -> DomainResult<u32>;

    /// 一趟聚合全部审核统计
    async fn get_statistics(&self) -> DomainResult<BoardStatistics>;

    /// 一次性迁移：为缺少互动字段的历史记录补默认值，已有值的跳过。
    /// 返回受影响的记录数。
    async fn backfill_interaction_fields(&self) -> DomainResult<u64>;
}
