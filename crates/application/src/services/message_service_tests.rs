//! 留言服务单元测试
//!
//! 基于内存Repository验证提交、审核、互动和可见性规则。

use std::sync::Arc;

use domain::{
    ClientMetadata, ConflictCode, DomainError, NoteStatus, Pagination, ReactionKind,
    ValidationRules,
};
use uuid::Uuid;

use crate::errors::ApplicationError;
use crate::memory::InMemoryMessageRepository;
use crate::services::message_service::{CreateMessageRequest, MessageService, ModerationRequest};

fn service() -> MessageService {
    MessageService::new(
        Arc::new(InMemoryMessageRepository::new()),
        ValidationRules::default(),
    )
}

fn metadata() -> ClientMetadata {
    ClientMetadata {
        ip_address: "203.0.113.7".to_string(),
        user_agent: "test-agent".to_string(),
    }
}

fn request(content: &str) -> CreateMessageRequest {
    CreateMessageRequest {
        content: content.to_string(),
        color: "#FFF9C4".to_string(),
        author_name: None,
    }
}

fn approve_request() -> ModerationRequest {
    ModerationRequest {
        status: NoteStatus::Approved,
        moderated_by: "admin@x.com".to_string(),
        rejection_reason: None,
    }
}

fn is_validation(err: &ApplicationError) -> bool {
    matches!(err, ApplicationError::Domain(DomainError::Validation { .. }))
}

#[tokio::test]
async fn test_create_message_starts_pending() {
    let service = service();
    let message = service
        .create_message(request("first confession"), metadata())
        .await
        .unwrap();

    assert_eq!(message.status, NoteStatus::Pending);
    assert_eq!(message.content, "first confession");
    assert!(!message.is_visible());
}

#[tokio::test]
async fn test_create_message_rejects_color_outside_palette() {
    let service = service();
    let mut req = request("hello");
    req.color = "#123456".to_string();

    let err = service.create_message(req, metadata()).await.unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn test_create_message_rejects_blank_content() {
    let service = service();
    let err = service
        .create_message(request("   "), metadata())
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn test_public_list_contains_only_approved() {
    let service = service();
    let approved = service
        .create_message(request("approved one"), metadata())
        .await
        .unwrap();
    service
        .create_message(request("still pending"), metadata())
        .await
        .unwrap();
    service.moderate(approved.id, approve_request()).await.unwrap();

    let page = service.list_public(Pagination::default()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].id, approved.id);

    // 管理端不过滤状态
    let all = service
        .list_admin(None, Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total_count, 2);
}

#[tokio::test]
async fn test_moderate_reject_requires_reason() {
    let service = service();
    let message = service
        .create_message(request("needs review"), metadata())
        .await
        .unwrap();

    let err = service
        .moderate(
            message.id,
            ModerationRequest {
                status: NoteStatus::Rejected,
                moderated_by: "admin@x.com".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn test_moderate_twice_conflicts() {
    let service = service();
    let message = service
        .create_message(request("twice"), metadata())
        .await
        .unwrap();
    service.moderate(message.id, approve_request()).await.unwrap();

    let err = service
        .moderate(message.id, approve_request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Conflict {
            code: ConflictCode::AlreadyApproved,
            ..
        })
    ));
}

#[tokio::test]
async fn test_get_public_hides_pending_message() {
    let service = service();
    let message = service
        .create_message(request("hidden"), metadata())
        .await
        .unwrap();

    let err = service.get_public(message.id).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotFound { .. })
    ));

    // 管理端可读
    assert_eq!(service.get_admin(message.id).await.unwrap().id, message.id);
}

#[tokio::test]
async fn test_react_requires_visible_message() {
    let service = service();
    let message = service
        .create_message(request("pending target"), metadata())
        .await
        .unwrap();

    let err = service
        .react(message.id, "fp-1", ReactionKind::Like)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_react_toggles_and_switches() {
    let service = service();
    let message = service
        .create_message(request("likeable"), metadata())
        .await
        .unwrap();
    service.moderate(message.id, approve_request()).await.unwrap();

    let (state, _) = service
        .react(message.id, "fp-1", ReactionKind::Like)
        .await
        .unwrap();
    assert_eq!(state.liked_by, vec!["fp-1"]);

    let (state, _) = service
        .react(message.id, "fp-1", ReactionKind::Dislike)
        .await
        .unwrap();
    assert!(state.liked_by.is_empty());
    assert_eq!(state.disliked_by, vec!["fp-1"]);

    let (state, _) = service
        .react(message.id, "fp-1", ReactionKind::Dislike)
        .await
        .unwrap();
    assert!(state.disliked_by.is_empty());
}

#[tokio::test]
async fn test_report_dedup_per_fingerprint() {
    let service = service();
    let message = service
        .create_message(request("reportable"), metadata())
        .await
        .unwrap();
    service.moderate(message.id, approve_request()).await.unwrap();

    let (_, count) = service.report(message.id, "fp-1", "spam").await.unwrap();
    assert_eq!(count, 1);

    let err = service.report(message.id, "fp-1", "spam").await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Conflict {
            code: ConflictCode::AlreadyReported,
            ..
        })
    ));

    // 留言没有自动拒绝，举报再多也保持 Approved
    let (updated, count) = service.report(message.id, "fp-2", "spam").await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(updated.status, NoteStatus::Approved);
}

#[tokio::test]
async fn test_delete_and_restore_flow() {
    let service = service();
    let message = service
        .create_message(request("deletable"), metadata())
        .await
        .unwrap();
    service.moderate(message.id, approve_request()).await.unwrap();

    service.delete(message.id, "admin@x.com").await.unwrap();
    let page = service.list_public(Pagination::default()).await.unwrap();
    assert_eq!(page.total_count, 0);

    let err = service.delete(message.id, "admin@x.com").await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Conflict {
            code: ConflictCode::AlreadyDeleted,
            ..
        })
    ));

    let restored = service.restore(message.id).await.unwrap();
    assert_eq!(restored.status, NoteStatus::Approved);
    assert!(!restored.is_deleted());
}

#[tokio::test]
async fn test_statistics_counts_by_status() {
    let service = service();
    let a = service.create_message(request("a"), metadata()).await.unwrap();
    let b = service.create_message(request("b"), metadata()).await.unwrap();
    service.create_message(request("c"), metadata()).await.unwrap();

    service.moderate(a.id, approve_request()).await.unwrap();
    service
        .moderate(
            b.id,
            ModerationRequest {
                status: NoteStatus::Rejected,
                moderated_by: "admin@x.com".to_string(),
                rejection_reason: Some("off topic".to_string()),
            },
        )
        .await
        .unwrap();
    service.report(a.id, "fp-1", "spam").await.unwrap();

    let stats = service.statistics().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.reported_count, 1);
    assert_eq!(stats.today_count, 3);
    assert_eq!(stats.deleted_count, 0);
}

#[tokio::test]
async fn test_create_then_fetch_round_trip_preserves_all_fields() {
    let service = service();
    let mut req = request("round trip");
    req.author_name = Some("小鱼".to_string());

    let created = service.create_message(req, metadata()).await.unwrap();
    let fetched = service.get_admin(created.id).await.unwrap();

    // 取回的实体与创建返回值逐字段相等
    assert_eq!(fetched, created);
    assert_eq!(fetched.color, "#FFF9C4");
    assert_eq!(fetched.author_name.as_deref(), Some("小鱼"));
    assert_eq!(fetched.metadata, metadata());
    assert!(fetched.liked_by.is_empty());
    assert!(fetched.disliked_by.is_empty());
    assert!(fetched.reports.is_empty());
    assert!(fetched.deleted_at.is_none());
    assert!(fetched.moderation.moderated_at.is_none());
}

#[tokio::test]
async fn test_moderate_unknown_message_is_not_found() {
    let service = service();
    let err = service
        .moderate(Uuid::new_v4(), approve_request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotFound { .. })
    ));
}
