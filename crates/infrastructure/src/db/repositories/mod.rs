//! PostgreSQL Repository实现
//!
//! 每个实现配一个 `Db*` 行模型做 FromRow 映射，实体与行模型互转时
//! 解析状态枚举与 jsonb 举报列表。互动写入（点赞/点踩/举报）全部是
//! 单条原子 UPDATE，绝不读-改-写。

pub mod comment_repository_impl;
pub mod message_repository_impl;
pub mod violation_report_repository_impl;

pub use comment_repository_impl::PostgresCommentRepository;
pub use message_repository_impl::PostgresMessageRepository;
pub use violation_report_repository_impl::PostgresViolationReportRepository;

use domain::{DomainError, DomainResult, Report};
use sqlx::FromRow;

/// 统计聚合行
#[derive(Debug, FromRow)]
pub(crate) struct DbStatistics {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub deleted_count: i64,
    pub reported_count: i64,
    pub today_count: i64,
}

impl From<DbStatistics> for domain::BoardStatistics {
    fn from(row: DbStatistics) -> Self {
        Self {
            total: row.total as u64,
            pending: row.pending as u64,
            approved: row.approved as u64,
            rejected: row.rejected as u64,
            deleted_count: row.deleted_count as u64,
            reported_count: row.reported_count as u64,
            today_count: row.today_count as u64,
        }
    }
}

/// 反应切换后的数组状态行
#[derive(Debug, FromRow)]
pub(crate) struct DbReactionState {
    pub liked_by: Vec<String>,
    pub disliked_by: Vec<String>,
}

impl From<DbReactionState> for domain::ReactionState {
    fn from(row: DbReactionState) -> Self {
        Self {
            liked_by: row.liked_by,
            disliked_by: row.disliked_by,
        }
    }
}

/// 解码 jsonb 列中的举报列表
pub(crate) fn decode_reports(value: serde_json::Value) -> DomainResult<Vec<Report>> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::database(format!("举报列表反序列化失败: {}", e)))
}

/// 把单条举报编码为可与 jsonb 数组拼接的单元素数组
pub(crate) fn encode_report(report: &Report) -> DomainResult<serde_json::Value> {
    serde_json::to_value(vec![report])
        .map_err(|e| DomainError::database(format!("举报序列化失败: {}", e)))
}
