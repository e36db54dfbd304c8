//! 留言Repository实现

use crate::db::repositories::{decode_reports, encode_report, DbReactionState, DbStatistics};
use crate::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    BoardStatistics, ClientMetadata, DomainError, DomainResult, Message, MessageRepository,
    Moderation, NoteStatus, PaginatedResult, Pagination, ReactionKind, ReactionState, Report,
};
use sqlx::{query, query_as, query_scalar, FromRow};
use std::sync::Arc;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "id, content, color, author_name, status, moderated_at, \
     moderated_by, rejection_reason, ip_address, user_agent, liked_by, disliked_by, \
     reports, deleted_at, deleted_by, created_at, updated_at";

/// 数据库留言模型
#[derive(Debug, Clone, FromRow)]
struct DbMessage {
    pub id: Uuid,
    pub content: String,
    pub color: String,
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
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbMessage> for Message {
    type Error = DomainError;

    fn try_from(row: DbMessage) -> DomainResult<Self> {
        Ok(Message {
            id: row.id,
            content: row.content,
            color: row.color,
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
            deleted_at: row.deleted_at,
            deleted_by: row.deleted_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 留言Repository实现
pub struct PostgresMessageRepository {
    pool: Arc<DbPool>,
}

impl PostgresMessageRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn create(&self, message: &Message) -> DomainResult<Message> {
        let reports = serde_json::to_value(&message.reports)
            .map_err(|e| DomainError::database(e.to_string()))?;

        let row = query_as::<_, DbMessage>(&format!(
            r#"
            INSERT INTO messages (id, content, color, author_name, status, ip_address,
                                  user_agent, liked_by, disliked_by, reports, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(message.id)
        .bind(&message.content)
        .bind(&message.color)
        .bind(&message.author_name)
        .bind(message.status.as_str())
        .bind(&message.metadata.ip_address)
        .bind(&message.metadata.user_agent)
        .bind(&message.liked_by)
        .bind(&message.disliked_by)
        .bind(reports)
        .bind(message.created_at)
        .bind(message.updated_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Message>> {
        let row = query_as::<_, DbMessage>(&format!(
            "SELECT {} FROM messages WHERE id = $1",
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        row.map(Message::try_from).transpose()
    }

    async fn find_by_status(
        &self,
        status: Option<NoteStatus>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResult<Message>> {
        let status = status.map(|s| s.as_str().to_string());

        let total_count: i64 = query_scalar(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR status = $1)
            "#,
        )
        .bind(&status)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let rows = query_as::<_, DbMessage>(&format!(
            r#"
            SELECT {} FROM messages
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(&status)
        .bind(pagination.limit as i64)
        .bind(pagination.offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        let messages = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(messages, total_count as u64, pagination))
    }

    async fn update_moderation(&self, message: &Message) -> DomainResult<Message> {
        let row = query_as::<_, DbMessage>(&format!(
            r#"
            UPDATE messages
            SET status = $2, moderated_at = $3, moderated_by = $4,
                rejection_reason = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(message.id)
        .bind(message.status.as_str())
        .bind(message.moderation.moderated_at)
        .bind(&message.moderation.moderated_by)
        .bind(&message.moderation.rejection_reason)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("message", message.id.to_string()))?;

        row.try_into()
    }

    async fn soft_delete(&self, message: &Message) -> DomainResult<()> {
        let result = query(
            r#"
            UPDATE messages
            SET deleted_at = $2, deleted_by = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(message.id)
        .bind(message.deleted_at)
        .bind(&message.deleted_by)
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("message", message.id.to_string()));
        }
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> DomainResult<()> {
        let result = query(
            r#"
            UPDATE messages
            SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("message", id.to_string()));
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

        // 单条 UPDATE 完成互斥切换：重复反应移除，相反反应先移除后追加
        let row = query_as::<_, DbReactionState>(
            r#"
            UPDATE messages
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
        .ok_or_else(|| DomainError::not_found("message", id.to_string()))?;

        Ok(row.into())
    }

    async fn add_report(&self, id: Uuid, report: &Report) -> DomainResult<u32> {
        let payload = encode_report(report)?;

        // 去重守卫写进 WHERE：同一指纹已举报时零行受影响
        let count: Option<i32> = query_scalar(
            r#"
            UPDATE messages
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
                let exists: bool = query_scalar("SELECT EXISTS(SELECT 1 FROM messages WHERE id = $1)")
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
                    Err(DomainError::not_found("message", id.to_string()))
                }
            }
        }
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
            FROM messages
            "#,
        )
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.into())
    }

    async fn backfill_interaction_fields(&self) -> DomainResult<u64> {
        let result = query(
            r#"
            UPDATE messages
            SET liked_by = COALESCE(liked_by, '{}'),
                disliked_by = COALESCE(disliked_by, '{}'),
                reports = COALESCE(reports, '[]'::jsonb)
            WHERE liked_by IS NULL OR disliked_by IS NULL OR reports IS NULL
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
