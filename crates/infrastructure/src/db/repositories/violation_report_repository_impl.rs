//! 违规举报Repository实现

use crate::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    DomainError, DomainResult, PaginatedResult, Pagination, ViolationReport,
    ViolationReportRepository, ViolationStatus, ViolationType,
};
use sqlx::{query_as, query_scalar, FromRow};
use std::sync::Arc;
use uuid::Uuid;

const REPORT_COLUMNS: &str = "id, report_type, description, url, message_id, status, \
     reported_by, reported_by_ip, created_at, reviewed_at, reviewed_by, admin_notes";

/// 数据库违规举报模型
#[derive(Debug, Clone, FromRow)]
struct DbViolationReport {
    pub id: Uuid,
    pub report_type: String,
    pub description: String,
    pub url: Option<String>,
    pub message_id: Option<Uuid>,
    pub status: String,
    pub reported_by: String,
    pub reported_by_ip: String,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub admin_notes: Option<String>,
}

fn parse_violation_type(value: &str) -> DomainResult<ViolationType> {
    match value {
        "SPAM" => Ok(ViolationType::Spam),
        "HARASSMENT" => Ok(ViolationType::Harassment),
        "INAPPROPRIATE_CONTENT" => Ok(ViolationType::InappropriateContent),
        "MISINFORMATION" => Ok(ViolationType::Misinformation),
        "OTHER" => Ok(ViolationType::Other),
        other => Err(DomainError::database(format!("未知的违规类别: {}", other))),
    }
}

fn violation_type_str(value: ViolationType) -> &'static str {
    match value {
        ViolationType::Spam => "SPAM",
        ViolationType::Harassment => "HARASSMENT",
        ViolationType::InappropriateContent => "INAPPROPRIATE_CONTENT",
        ViolationType::Misinformation => "MISINFORMATION",
        ViolationType::Other => "OTHER",
    }
}

impl TryFrom<DbViolationReport> for ViolationReport {
    type Error = DomainError;

    fn try_from(row: DbViolationReport) -> DomainResult<Self> {
        Ok(ViolationReport {
            id: row.id,
            report_type: parse_violation_type(&row.report_type)?,
            description: row.description,
            url: row.url,
            message_id: row.message_id,
            status: ViolationStatus::parse(&row.status)?,
            reported_by: row.reported_by,
            reported_by_ip: row.reported_by_ip,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
            reviewed_by: row.reviewed_by,
            admin_notes: row.admin_notes,
        })
    }
}

/// 违规举报Repository实现
pub struct PostgresViolationReportRepository {
    pool: Arc<DbPool>,
}

impl PostgresViolationReportRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViolationReportRepository for PostgresViolationReportRepository {
    async fn create(&self, report: &ViolationReport) -> DomainResult<ViolationReport> {
        let row = query_as::<_, DbViolationReport>(&format!(
            r#"
            INSERT INTO violation_reports (id, report_type, description, url, message_id,
                                           status, reported_by, reported_by_ip, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(report.id)
        .bind(violation_type_str(report.report_type))
        .bind(&report.description)
        .bind(&report.url)
        .bind(report.message_id)
        .bind(report.status.as_str())
        .bind(&report.reported_by)
        .bind(&report.reported_by_ip)
        .bind(report.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<ViolationReport>> {
        let row = query_as::<_, DbViolationReport>(&format!(
            "SELECT {} FROM violation_reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        row.map(ViolationReport::try_from).transpose()
    }

    async fn find_by_status(
        &self,
        status: Option<ViolationStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<ViolationReport>> {
        let status = status.map(|s| s.as_str().to_string());

        let total_count: i64 = query_scalar(
            "SELECT COUNT(*) FROM violation_reports WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(&status)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let rows = query_as::<_, DbViolationReport>(&format!(
            r#"
            SELECT {} FROM violation_reports
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            REPORT_COLUMNS
        ))
        .bind(&status)
        .bind(pagination.limit as i64)
        .bind(pagination.offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let reports = rows
            .into_iter()
            .map(ViolationReport::try_from)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(reports, total_count as u64, pagination))
    }

    async fn update_review(&self, report: &ViolationReport) -> DomainResult<ViolationReport> {
        let row = query_as::<_, DbViolationReport>(&format!(
            r#"
            UPDATE violation_reports
            SET status = $2, reviewed_at = $3, reviewed_by = $4, admin_notes = $5
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(report.id)
        .bind(report.status.as_str())
        .bind(report.reviewed_at)
        .bind(&report.reviewed_by)
        .bind(&report.admin_notes)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("violation_report", report.id.to_string()))?;

        row.try_into()
    }
}
