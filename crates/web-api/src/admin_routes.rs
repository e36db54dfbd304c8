//! 管理端路由
//!
//! 全部路由要求 Bearer 令牌白名单认证（见 auth 模块）。
//! 审核人身份来自请求体的 moderatedBy / reviewedBy 字段。

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use application::{
    AdminCommentDto, AdminMessageDto, BatchAction, BatchCommentRequest, BatchResultDto,
    ModerationRequest, PageDto, ReviewViolationRequest, ViolationReportDto,
};
use domain::{DomainError, NoteStatus, Pagination, ViolationStatus};

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::routes::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeratePayload {
    status: String,
    moderated_by: String,
    rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletePayload {
    deleted_by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchPayload {
    action: BatchAction,
    comment_ids: Vec<Uuid>,
    moderated_by: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewPayload {
    status: String,
    reviewed_by: String,
    admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusPageQuery {
    status: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl StatusPageQuery {
    fn pagination(&self) -> Pagination {
        PageQuery::new(self.limit, self.offset).pagination()
    }

    fn note_status(&self) -> Result<Option<NoteStatus>, ApiError> {
        self.status
            .as_deref()
            .map(NoteStatus::parse)
            .transpose()
            .map_err(to_api_error)
    }

    fn violation_status(&self) -> Result<Option<ViolationStatus>, ApiError> {
        self.status
            .as_deref()
            .map(ViolationStatus::parse)
            .transpose()
            .map_err(to_api_error)
    }
}

fn to_api_error(err: DomainError) -> ApiError {
    application::ApplicationError::from(err).into()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/{id}", patch(moderate_message).delete(delete_message))
        .route("/messages/{id}/restore", post(restore_message))
        .route("/comments", get(list_comments))
        .route("/comments/{id}", patch(moderate_comment).delete(delete_comment))
        .route("/comments/{id}/restore", post(restore_comment))
        .route("/comments/batch", post(batch_comments))
        .route("/statistics", get(statistics))
        .route("/violation-reports", get(list_violation_reports))
        .route(
            "/violation-reports/{id}",
            get(get_violation_report).patch(review_violation_report),
        )
        .route("/migrations/backfill-interactions", post(backfill_interactions))
}

async fn list_messages(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<StatusPageQuery>,
) -> Result<Json<PageDto<AdminMessageDto>>, ApiError> {
    let status = query.note_status()?;
    let page = state
        .message_service
        .list_admin(status, query.pagination())
        .await?;
    Ok(Json(PageDto::map_from(page, |m| AdminMessageDto::from(m))))
}

async fn moderate_message(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModeratePayload>,
) -> Result<Json<AdminMessageDto>, ApiError> {
    let status = NoteStatus::parse(&payload.status).map_err(to_api_error)?;
    let message = state
        .message_service
        .moderate(
            id,
            ModerationRequest {
                status,
                moderated_by: payload.moderated_by,
                rejection_reason: payload.rejection_reason,
            },
        )
        .await?;
    Ok(Json(AdminMessageDto::from(&message)))
}

async fn delete_message(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeletePayload>,
) -> Result<StatusCode, ApiError> {
    state.message_service.delete(id, &payload.deleted_by).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn restore_message(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminMessageDto>, ApiError> {
    let message = state.message_service.restore(id).await?;
    Ok(Json(AdminMessageDto::from(&message)))
}

async fn list_comments(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<StatusPageQuery>,
) -> Result<Json<PageDto<AdminCommentDto>>, ApiError> {
    let status = query.note_status()?;
    let page = state
        .comment_service
        .list_admin(status, query.pagination())
        .await?;
    Ok(Json(PageDto::map_from(page, |c| AdminCommentDto::from(c))))
}

async fn moderate_comment(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModeratePayload>,
) -> Result<Json<AdminCommentDto>, ApiError> {
    let status = NoteStatus::parse(&payload.status).map_err(to_api_error)?;
    let comment = state
        .comment_service
        .moderate(
            id,
            ModerationRequest {
                status,
                moderated_by: payload.moderated_by,
                rejection_reason: payload.rejection_reason,
            },
        )
        .await?;
    Ok(Json(AdminCommentDto::from(&comment)))
}

async fn delete_comment(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeletePayload>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(id, &payload.deleted_by).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn restore_comment(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminCommentDto>, ApiError> {
    let comment = state.comment_service.restore(id).await?;
    Ok(Json(AdminCommentDto::from(&comment)))
}

async fn batch_comments(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Json(payload): Json<BatchPayload>,
) -> Result<Json<BatchResultDto>, ApiError> {
    let action = payload.action;
    let count = state
        .comment_service
        .batch(BatchCommentRequest {
            ids: payload.comment_ids,
            action,
            moderated_by: payload.moderated_by,
            rejection_reason: payload.reason,
        })
        .await?;
    Ok(Json(BatchResultDto {
        count,
        action: action.as_str().to_string(),
    }))
}

async fn statistics(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let messages = state.message_service.statistics().await?;
    let comments = state.comment_service.statistics().await?;
    Ok(Json(json!({
        "messages": messages,
        "comments": comments,
    })))
}

async fn list_violation_reports(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<StatusPageQuery>,
) -> Result<Json<PageDto<ViolationReportDto>>, ApiError> {
    let status = query.violation_status()?;
    let page = state
        .violation_service
        .list(status, query.pagination())
        .await?;
    Ok(Json(PageDto::map_from(page, |r| ViolationReportDto::from(r))))
}

async fn get_violation_report(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ViolationReportDto>, ApiError> {
    let report = state.violation_service.get(id).await?;
    Ok(Json(ViolationReportDto::from(&report)))
}

async fn review_violation_report(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<ViolationReportDto>, ApiError> {
    let status = ViolationStatus::parse(&payload.status).map_err(to_api_error)?;
    let report = state
        .violation_service
        .review(
            id,
            ReviewViolationRequest {
                status,
                reviewed_by: payload.reviewed_by,
                admin_notes: payload.admin_notes,
            },
        )
        .await?;
    Ok(Json(ViolationReportDto::from(&report)))
}

async fn backfill_interactions(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.message_service.backfill_interaction_fields().await?;
    Ok(Json(json!({ "updated": updated })))
}
