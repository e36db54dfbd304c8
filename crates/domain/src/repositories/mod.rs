//! Repository接口定义
//!
//! 定义数据访问层的抽象接口，遵循清洁架构原则，内层定义接口，外层实现接口。
//! Repository 是持久化状态的唯一写入方；服务层只依赖这些接口。

use serde::Serialize;

pub mod comment_repository;
pub mod message_repository;
pub mod violation_report_repository;

pub use comment_repository::CommentRepository;
pub use message_repository::MessageRepository;
pub use violation_report_repository::ViolationReportRepository;

/// 分页参数（limit/offset 风格，与 HTTP 查询参数一致）
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// 分页结果
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total_count,
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }
}

/// 单一集合的审核统计信息
///
/// 只约定各计数值正确，不约定计算策略；当前实现是一趟聚合查询。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStatistics {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub deleted_count: u64,
    /// 至少有一条举报的活跃记录数
    pub reported_count: u64,
    /// 今日（UTC 自然日）创建的记录数
    pub today_count: u64,
}

/// 切换反应后的最终数组状态
#[derive(Debug, Clone)]
pub struct ReactionState {
    pub liked_by: Vec<String>,
    pub disliked_by: Vec<String>,
}
