//! 公开路由
//!
//! 访客侧的全部HTTP入口：提交留言、浏览已通过内容、评论、
//! 点赞/点踩/举报、平台违规举报。留言提交与互动的限流在这里
//! 按指纹计数，评论创建的双层限流在应用服务内部。

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use application::{
    CommentDto, CreateCommentRequest, CreateMessageRequest, CreateViolationReportRequest,
    InteractionAction, InteractionDto, MessageDto, PageDto, ViolationReportDto,
};
use config::RateLimitPolicy;
use domain::{DomainError, Pagination, ReactionKind, ViolationType};

use crate::error::ApiError;
use crate::identity::{client_identity, client_metadata};
use crate::state::AppState;
use crate::admin_routes;

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessagePayload {
    content: String,
    color: String,
    author_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentPayload {
    content: String,
    author_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionPayload {
    action: InteractionAction,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViolationReportPayload {
    report_type: ViolationType,
    description: String,
    url: Option<String>,
    message_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

impl PageQuery {
    pub(crate) fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self { limit, offset }
    }

    pub(crate) fn pagination(&self) -> Pagination {
        let limit = self.limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);
        Pagination::new(limit, self.offset.unwrap_or(0))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", public_routes())
        .nest("/api/v1/admin", admin_routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(create_message).get(list_messages))
        .route("/messages/{id}", get(get_message))
        .route("/messages/{id}/interactions", post(message_interaction))
        .route(
            "/messages/{id}/comments",
            post(create_comment).get(list_comments),
        )
        .route("/comments/{id}/interactions", post(comment_interaction))
        .route("/violation-reports", post(create_violation_report))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 按指纹检查限流，超限返回 429
fn check_rate_limit(
    state: &AppState,
    key: &str,
    policy: RateLimitPolicy,
) -> Result<(), ApiError> {
    let decision = state.rate_limiter.check(key, policy);
    if decision.allowed {
        Ok(())
    } else {
        let retry_after = (decision.reset_at - chrono::Utc::now()).num_seconds().max(0) as u64;
        Err(ApiError::rate_limited(decision.reset_at, retry_after))
    }
}

async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateMessagePayload>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let identity = client_identity(&headers);
    check_rate_limit(
        &state,
        &format!("messages:{}", identity.fingerprint),
        state.rate_limits.message_submission,
    )?;

    let message = state
        .message_service
        .create_message(
            CreateMessageRequest {
                content: payload.content,
                color: payload.color,
                author_name: payload.author_name,
            },
            client_metadata(&headers),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageDto::from_entity(&message, Some(&identity.fingerprint))),
    ))
}

async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageDto<MessageDto>>, ApiError> {
    let identity = client_identity(&headers);
    let page = state.message_service.list_public(query.pagination()).await?;
    Ok(Json(PageDto::map_from(page, |m| {
        MessageDto::from_entity(m, Some(&identity.fingerprint))
    })))
}

async fn get_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageDto>, ApiError> {
    let identity = client_identity(&headers);
    let message = state.message_service.get_public(id).await?;
    Ok(Json(MessageDto::from_entity(
        &message,
        Some(&identity.fingerprint),
    )))
}

async fn message_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<InteractionPayload>,
) -> Result<Json<InteractionDto>, ApiError> {
    let identity = client_identity(&headers);
    check_rate_limit(
        &state,
        &format!("interactions:{}", identity.fingerprint),
        state.rate_limits.interactions,
    )?;

    let dto = match payload.action {
        InteractionAction::Like | InteractionAction::Dislike => {
            let kind = reaction_kind(payload.action);
            let (reaction, report_count) = state
                .message_service
                .react(id, &identity.fingerprint, kind)
                .await?;
            InteractionDto::from_reaction(&reaction, report_count, &identity.fingerprint)
        }
        InteractionAction::Report => {
            let reason = report_reason(payload.reason.as_deref())?;
            let (message, report_count) = state
                .message_service
                .report(id, &identity.fingerprint, reason)
                .await?;
            InteractionDto {
                like_count: message.liked_by.len(),
                dislike_count: message.disliked_by.len(),
                report_count: report_count as usize,
                viewer_reaction: None,
            }
        }
    };
    Ok(Json(dto))
}

async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<CreateCommentPayload>,
) -> Result<(StatusCode, Json<CommentDto>), ApiError> {
    let identity = client_identity(&headers);
    let comment = state
        .comment_service
        .create_comment(
            CreateCommentRequest {
                message_id,
                content: payload.content,
                author_name: payload.author_name,
            },
            &identity,
            client_metadata(&headers),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentDto::from_entity(&comment, Some(&identity.fingerprint))),
    ))
}

async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(message_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageDto<CommentDto>>, ApiError> {
    let identity = client_identity(&headers);
    let page = state
        .comment_service
        .list_public(message_id, query.pagination())
        .await?;
    Ok(Json(PageDto::map_from(page, |c| {
        CommentDto::from_entity(c, Some(&identity.fingerprint))
    })))
}

async fn comment_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<InteractionPayload>,
) -> Result<Json<InteractionDto>, ApiError> {
    let identity = client_identity(&headers);
    check_rate_limit(
        &state,
        &format!("interactions:{}", identity.fingerprint),
        state.rate_limits.interactions,
    )?;

    let dto = match payload.action {
        InteractionAction::Like | InteractionAction::Dislike => {
            let kind = reaction_kind(payload.action);
            let (reaction, report_count) = state
                .comment_service
                .react(id, &identity.fingerprint, kind)
                .await?;
            InteractionDto::from_reaction(&reaction, report_count, &identity.fingerprint)
        }
        InteractionAction::Report => {
            let reason = report_reason(payload.reason.as_deref())?;
            let (comment, report_count) = state
                .comment_service
                .report(id, &identity.fingerprint, reason)
                .await?;
            InteractionDto {
                like_count: comment.liked_by.len(),
                dislike_count: comment.disliked_by.len(),
                report_count: report_count as usize,
                viewer_reaction: None,
            }
        }
    };
    Ok(Json(dto))
}

async fn create_violation_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ViolationReportPayload>,
) -> Result<(StatusCode, Json<ViolationReportDto>), ApiError> {
    let identity = client_identity(&headers);
    let report = state
        .violation_service
        .create_report(
            CreateViolationReportRequest {
                report_type: payload.report_type,
                description: payload.description,
                url: payload.url,
                message_id: payload.message_id,
            },
            &identity,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ViolationReportDto::from(&report))))
}

fn reaction_kind(action: InteractionAction) -> ReactionKind {
    match action {
        InteractionAction::Like => ReactionKind::Like,
        InteractionAction::Dislike => ReactionKind::Dislike,
        InteractionAction::Report => unreachable!("report 在上层单独处理"),
    }
}

fn report_reason(reason: Option<&str>) -> Result<&str, ApiError> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| {
            application::ApplicationError::from(DomainError::validation(
                "reason",
                "举报必须给出理由",
            ))
            .into()
        })
}
