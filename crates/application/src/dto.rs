//! 数据传输对象
//!
//! Web 层的 JSON 形状。公开 DTO 隐藏客户端元数据与指纹数组，
//! 只暴露计数和调用方自己的反应状态；管理端 DTO 携带完整审核信息。

use chrono::{DateTime, Utc};
use domain::{Comment, Message, NoteStatus, ReactionKind, ViolationReport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 调用方自己的反应状态
fn reaction_str(kind: Option<ReactionKind>) -> Option<&'static str> {
    kind.map(|k| match k {
        ReactionKind::Like => "like",
        ReactionKind::Dislike => "dislike",
    })
}

/// 公开的留言视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    pub content: String,
    pub color: String,
    pub author_name: Option<String>,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
    pub like_count: usize,
    pub dislike_count: usize,
    pub viewer_reaction: Option<&'static str>,
}

impl MessageDto {
    pub fn from_entity(message: &Message, viewer: Option<&str>) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            color: message.color.clone(),
            author_name: message.author_name.clone(),
            status: message.status,
            created_at: message.created_at,
            like_count: message.liked_by.len(),
            dislike_count: message.disliked_by.len(),
            viewer_reaction: reaction_str(viewer.and_then(|v| message.reaction_of(v))),
        }
    }
}

/// 管理端的留言视图（含审核与元数据）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessageDto {
    #[serde(flatten)]
    pub message: Message,
    pub like_count: usize,
    pub dislike_count: usize,
    pub report_count: usize,
}

impl From<&Message> for AdminMessageDto {
    fn from(message: &Message) -> Self {
        Self {
            like_count: message.liked_by.len(),
            dislike_count: message.disliked_by.len(),
            report_count: message.reports.len(),
            message: message.clone(),
        }
    }
}

/// 公开的评论视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: Uuid,
    pub message_id: Uuid,
    pub content: String,
    pub author_name: Option<String>,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
    pub like_count: usize,
    pub dislike_count: usize,
    pub viewer_reaction: Option<&'static str>,
}

impl CommentDto {
    pub fn from_entity(comment: &Comment, viewer: Option<&str>) -> Self {
        Self {
            id: comment.id,
            message_id: comment.message_id,
            content: comment.content.clone(),
            author_name: comment.author_name.clone(),
            status: comment.status,
            created_at: comment.created_at,
            like_count: comment.liked_by.len(),
            dislike_count: comment.disliked_by.len(),
            viewer_reaction: reaction_str(viewer.and_then(|v| comment.reaction_of(v))),
        }
    }
}

/// 管理端的评论视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCommentDto {
    #[serde(flatten)]
    pub comment: Comment,
    pub like_count: usize,
    pub dislike_count: usize,
    pub report_count: usize,
}

impl From<&Comment> for AdminCommentDto {
    fn from(comment: &Comment) -> Self {
        Self {
            like_count: comment.liked_by.len(),
            dislike_count: comment.disliked_by.len(),
            report_count: comment.reports.len(),
            comment: comment.clone(),
        }
    }
}

/// 互动（点赞/点踩/举报）后的响应：更新后的计数与调用方自己的状态
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionDto {
    pub like_count: usize,
    pub dislike_count: usize,
    pub report_count: usize,
    pub viewer_reaction: Option<&'static str>,
}

impl InteractionDto {
    pub fn from_reaction(state: &domain::ReactionState, report_count: usize, viewer: &str) -> Self {
        let viewer_reaction = if state.liked_by.iter().any(|c| c == viewer) {
            Some("like")
        } else if state.disliked_by.iter().any(|c| c == viewer) {
            Some("dislike")
        } else {
            None
        };
        Self {
            like_count: state.liked_by.len(),
            dislike_count: state.disliked_by.len(),
            report_count,
            viewer_reaction,
        }
    }
}

/// 批量操作结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultDto {
    pub count: u64,
    pub action: String,
}

/// 管理端的违规举报视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationReportDto {
    #[serde(flatten)]
    pub report: ViolationReport,
}

impl From<&ViolationReport> for ViolationReportDto {
    fn from(report: &ViolationReport) -> Self {
        Self {
            report: report.clone(),
        }
    }
}

/// 分页响应包装
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub limit: u32,
    pub offset: u32,
}

impl<T> PageDto<T> {
    pub fn map_from<S>(page: domain::PaginatedResult<S>, f: impl Fn(&S) -> T) -> Self {
        Self {
            items: page.items.iter().map(f).collect(),
            total_count: page.total_count,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// 互动动作（HTTP 请求体）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Like,
    Dislike,
    Report,
}

/// 批量动作（HTTP 请求体）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Approve,
    Reject,
    Delete,
}

impl BatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Delete => "delete",
        }
    }
}
