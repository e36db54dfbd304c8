//! 评论Repository实现

use crate::db::repositories::{decode_reports, encode_report, DbReactionState, DbStatistics};
use crate::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    BoardStatistics, ClientMetadata, Comment, CommentRepository, DomainError, DomainResult,
    Moderation, NoteStatus, PaginatedResult, Pagination, ReactionKind, ReactionState, Report,
};
use sqlx::{query, query_as, query_scalar, FromRow};
use std::sync::Arc;
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "id, message_id, content, author_name, status, moderated_at, \
     moderated_by, rejection_reason, ip_address, user_agent, liked_by, disliked_by, \
     reports, parent_comment_id, reply_count, deleted_at, deleted_by, created_at, updated_at";

/// 数据库评论模型
#[derive(Debug, Clone, FromRow)]
struct DbComment {
    pub id: Uuid,
    pub message_id: Uuid,
    pub content: String,
    pub author_name: Option<String>,
    pub status: String,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderated_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
    pub liked_by: Vec<String>,
    pub disliked_by: Vec<String>,
    pub reports: serde_json::Value,
    pub parent_comment_id: Option<Uuid>,
    pub reply_count: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbComment> for Comment {
    type Error = DomainError;

    fn try_from(row: DbComment) -> DomainResult<Self> {
        Ok(Comment {
            id: row.id,
            message_id: row.message_id,
            content: row.content,
            author_name: row.author_name,
            status: NoteStatus::parse(&row.status)?,
            moderation: Moderation {
                moderated_at: row.moderated_at,
                moderated_by: row.moderated_by,
                rejection_reason: row.rejection_reason,
            },
            metadata: ClientMetadata {
                ip_address: row.ip_address,
                user_agent: row.user_agent,
            },
            liked_by: row.liked_by,
            disliked_by: row.disliked_by,
            reports: decode_reports(row.reports)?,
            parent_comment_id: row.parent_comment_id,
            reply_count: row.reply_count as u32,
            deleted_at: row.deleted_at,
            deleted_by: row.deleted_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 评论Repository实现
pub struct PostgresCommentRepository {
    pool: Arc<DbPool>,
}

impl PostgresCommentRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: &Comment) -> DomainResult<Comment> {
        let reports = serde_json::to_value(&comment.reports)
            .map_err(|e| DomainError::database(e.to_string()))?;

        let row = query_as::<_, DbComment>(&format!(
            r#"
            INSERT INTO comments (id, message_id, content, author_name, status, ip_address,
                                  user_agent, liked_by, disliked_by, reports,
                                  parent_comment_id, reply_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(comment.id)
        .bind(comment.message_id)
        .bind(&comment.content)
        .bind(&comment.author_name)
        .bind(comment.status.as_str())
        .bind(&comment.metadata.ip_address)
        .bind(&comment.metadata.user_agent)
        .bind(&comment.liked_by)
        .bind(&comment.disliked_by)
        .bind(reports)
        .bind(comment.parent_comment_id)
        .bind(comment.reply_count as i32)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Comment>> {
        let row = query_as::<_, DbComment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        row.map(Comment::try_from).transpose()
    }

    async fn find_by_message(
        &self,
        message_id: Uuid,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Comment>> {
        let status = status.map(|s| s.as_str().to_string());

        let total_count: i64 = query_scalar(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE message_id = $1 AND deleted_at IS NULL
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(message_id)
        .bind(&status)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let rows = query_as::<_, DbComment>(&format!(
            r#"
            SELECT {} FROM comments
            WHERE message_id = $1 AND deleted_at IS NULL
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            COMMENT_COLUMNS
        ))
        .bind(message_id)
        .bind(&status)
        .bind(pagination.limit as i64)
        .bind(pagination.offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let comments = rows
            .into_iter()
            .map(Comment::try_from)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(comments, total_count as u64, pagination))
    }

    async fn find_by_status(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Comment>> {
        let status = status.map(|s| s.as_str().to_string());

        let total_count: i64 = query_scalar(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR status = $1)
            "#,
        )
        .bind(&status)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let rows = query_as::<_, DbComment>(&format!(
            r#"
            SELECT {} FROM comments
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            COMMENT_COLUMNS
        ))
        .bind(&status)
        .bind(pagination.limit as i64)
        .bind(pagination.offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let comments = rows
            .into_iter()
            .map(Comment::try_from)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(comments, total_count as u64, pagination))
    }

    async fn update_moderation(&self, comment: &Comment) -> DomainResult<Comment> {
        let row = query_as::<_, DbComment>(&format!(
            r#"
            UPDATE comments
            SET status = $2, moderated_at = $3, moderated_by = $4,
                rejection_reason = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(comment.id)
        .bind(comment.status.as_str())
        .bind(comment.moderation.moderated_at)
        .bind(&comment.moderation.moderated_by)
        .bind(&comment.moderation.rejection_reason)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("comment", comment.id.to_string()))?;

        row.try_into()
    }

    async fn soft_delete(&self, comment: &Comment) -> DomainResult<()> {
        let result = query(
            r#"
            UPDATE comments
            SET deleted_at = $2, deleted_by = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(comment.id)
        .bind(comment.deleted_at)
        .bind(&comment.deleted_by)
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("comment", comment.id.to_string()));
        }
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> DomainResult<()> {
        let result = query(
            r#"
            UPDATE comments
            SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("comment", id.to_string()));
        }
        Ok(())
    }

    async fn toggle_reaction(
        &self,
        id: Uuid,
        client_id: &str,
        kind: ReactionKind,
    ) -> DomainResult<ReactionState> {
        let kind = match kind {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        };

        let row = query_as::<_, DbReactionState>(
            r#"
            UPDATE comments
            SET liked_by = CASE
                    WHEN $3 = 'like' AND $2 = ANY(liked_by) THEN array_remove(liked_by, $2)
                    WHEN $3 = 'like' THEN array_append(array_remove(liked_by, $2), $2)
                    ELSE array_remove(liked_by, $2)
                END,
                disliked_by = CASE
                    WHEN $3 = 'dislike' AND $2 = ANY(disliked_by) THEN array_remove(disliked_by, $2)
                    WHEN $3 = 'dislike' THEN array_append(array_remove(disliked_by, $2), $2)
                    ELSE array_remove(disliked_by, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING liked_by, disliked_by
            "#,
        )
        .bind(id)
        .bind(client_id)
        .bind(kind)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("comment", id.to_string()))?;

        Ok(row.into())
    }

    async fn add_report(&self, id: Uuid, report: &Report) -> DomainResult<u32> {
        let payload = encode_report(report)?;

        let count: Option<i32> = query_scalar(
            r#"
            UPDATE comments
            SET reports = reports || $2::jsonb, updated_at = NOW()
            WHERE id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM jsonb_array_elements(reports) AS r
                  WHERE r->>'reportedBy' = $3
              )
            RETURNING jsonb_array_length(reports)
            "#,
        )
        .bind(id)
        .bind(payload)
        .bind(&report.reported_by)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        match count {
            Some(count) => Ok(count as u32),
            None => {
                let exists: bool = query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&*self.pool)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;
                if exists {
                    Err(DomainError::conflict(
                        domain::ConflictCode::AlreadyReported,
                        "该客户端已举报过此内容",
                    ))
                } else {
                    Err(DomainError::not_found("comment", id.to_string()))
                }
            }
        }
    }

    async fn batch_update_moderation(
        &self,
        ids: &[Uuid],
        status: NoteStatus,
        moderated_by: &str,
        rejection_reason: Option<&str>,
    ) -> DomainResult<u64> {
        // 已处于目标状态的行不计入受影响数
        let result = query(
            r#"
            UPDATE comments
            SET status = $2, moderated_at = NOW(), moderated_by = $3,
                rejection_reason = $4, updated_at = NOW()
            WHERE id = ANY($1) AND status != $2
            "#,
        )
        .bind(ids)
        .bind(status.as_str())
        .bind(moderated_by)
        .bind(rejection_reason)
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn batch_soft_delete(&self, ids: &[Uuid], deleted_by: &str) -> DomainResult<u64> {
        let result = query(
            r#"
            UPDATE comments
            SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW()
            WHERE id = ANY($1) AND deleted_at IS NULL
            "#,
        )
        .bind(ids)
        .bind(deleted_by)
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn get_statistics(&self) -> DomainResult<BoardStatistics> {
        let row = query_as::<_, DbStatistics>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE deleted_at IS NULL AND status = 'PENDING') AS pending,
                COUNT(*) FILTER (WHERE deleted_at IS NULL AND status = 'APPROVED') AS approved,
                COUNT(*) FILTER (WHERE deleted_at IS NULL AND status = 'REJECTED') AS rejected,
                COUNT(*) FILTER (WHERE deleted_at IS NOT NULL) AS deleted_count,
                COUNT(*) FILTER (
                    WHERE deleted_at IS NULL AND jsonb_array_length(reports) > 0
                ) AS reported_count,
                COUNT(*) FILTER (
                    WHERE deleted_at IS NULL AND created_at >= date_trunc('day', NOW())
                ) AS today_count
            FROM comments
            "#,
        )
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.into())
    }
}
