//! 平台违规举报服务
//!
//! 独立于单条内容的举报流程：访客提交，管理员推进 REVIEWED/RESOLVED。
//! 没有自动状态转换，也不要求 message_id 指向真实存在的留言。

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use domain::{
    DomainError, PaginatedResult, Pagination, ValidationRules, ViolationReport,
    ViolationReportRepository, ViolationStatus, ViolationType,
};

use crate::client_identity::ClientIdentity;
use crate::errors::ApplicationResult;

/// 提交违规举报请求
#[derive(Debug, Clone)]
pub struct CreateViolationReportRequest {
    pub report_type: ViolationType,
    pub description: String,
    pub url: Option<String>,
    pub message_id: Option<Uuid>,
}

/// 处理违规举报请求
#[derive(Debug, Clone)]
pub struct ReviewViolationRequest {
    pub status: ViolationStatus,
    pub reviewed_by: String,
    pub admin_notes: Option<String>,
}

/// 违规举报服务
pub struct ViolationReportService {
    repository: Arc<dyn ViolationReportRepository>,
    rules: ValidationRules,
}

impl ViolationReportService {
    pub fn new(repository: Arc<dyn ViolationReportRepository>, rules: ValidationRules) -> Self {
        Self { repository, rules }
    }

    /// 访客提交举报，初始状态固定为 Pending
    pub async fn create_report(
        &self,
        request: CreateViolationReportRequest,
        identity: &ClientIdentity,
    ) -> ApplicationResult<ViolationReport> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(DomainError::validation("description", "举报描述不能为空").into());
        }
        if description.chars().count() > self.rules.max_content_length {
            return Err(DomainError::validation(
                "description",
                format!("举报描述不能超过{}个字符", self.rules.max_content_length),
            )
            .into());
        }

        let report = ViolationReport::new(
            request.report_type,
            description,
            request.url,
            request.message_id,
            identity.fingerprint.as_str(),
            identity.ip.as_str(),
        );
        let stored = self.repository.create(&report).await?;
        info!(report_id = %stored.id, "新违规举报已提交");
        Ok(stored)
    }

    /// 管理端列表，可按处理状态过滤
    pub async fn list(
        &self,
        status: Option<ViolationStatus>,
        pagination: Pagination,
    ) -> ApplicationResult<PaginatedResult<ViolationReport>> {
        Ok(self.repository.find_by_status(status, pagination).await?)
    }

    /// 管理端读取单条举报
    pub async fn get(&self, id: Uuid) -> ApplicationResult<ViolationReport> {
        self.load(id).await
    }

    /// 管理员推进处理状态；回退到 Pending 或重复推进同一状态被拒绝
    pub async fn review(
        &self,
        id: Uuid,
        request: ReviewViolationRequest,
    ) -> ApplicationResult<ViolationReport> {
        let mut report = self.load(id).await?;
        report.review(request.status, &request.reviewed_by, request.admin_notes)?;
        let updated = self.repository.update_review(&report).await?;
        info!(
            report_id = %id,
            status = updated.status.as_str(),
            reviewed_by = %request.reviewed_by,
            "违规举报处理完成"
        );
        Ok(updated)
    }

    async fn load(&self, id: Uuid) -> ApplicationResult<ViolationReport> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("violation_report", id.to_string()).into())
    }
}
