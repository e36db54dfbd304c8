//! 违规举报Repository接口定义

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{ViolationReport, ViolationStatus};
use crate::errors::DomainResult;
use crate::repositories::{PaginatedResult, Pagination};

/// 违规举报Repository接口
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ViolationReportRepository: Send + Sync {
    /// 创建新举报
    async fn create(&self, report: &ViolationReport) -> DomainResult<ViolationReport>;

    /// 根据ID查找举报
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ViolationReport>>;

    /// 按处理状态分页列出举报，按创建时间倒序
    async fn find_by_status(
        &self,
        status: Option<ViolationStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<ViolationReport>>;

    /// 持久化处理结果（状态、处理人、时间、备注）
    async fn update_review(&self, report: &ViolationReport) -> DomainResult<ViolationReport>;
}
