//! 评论服务单元测试
//!
//! 覆盖双层限流、默认拒绝理由兜底、举报自动拒绝和批量操作边界。

use std::sync::Arc;

use config::{ModerationConfig, RateLimitConfig, RateLimitPolicy};
use domain::{
    ClientMetadata, Comment, CommentRepository, ConflictCode, DomainError, MessageRepository,
    NoteStatus, Pagination, ValidationRules, SYSTEM_MODERATOR,
};
use uuid::Uuid;

use crate::client_identity::ClientIdentity;
use crate::dto::BatchAction;
use crate::errors::ApplicationError;
use crate::memory::{InMemoryCommentRepository, InMemoryMessageRepository};
use crate::rate_limiter::FixedWindowRateLimiter;
use crate::services::comment_service::{
    BatchCommentRequest, CommentService, CreateCommentRequest, DEFAULT_REJECTION_REASON,
};
use crate::services::message_service::ModerationRequest;

struct Fixture {
    service: CommentService,
    messages: Arc<InMemoryMessageRepository>,
}

fn generous_limits() -> RateLimitConfig {
    RateLimitConfig {
        message_submission: RateLimitPolicy {
            limit: 100,
            window_secs: 3600,
        },
        interactions: RateLimitPolicy {
            limit: 100,
            window_secs: 60,
        },
        comments_global: RateLimitPolicy {
            limit: 100,
            window_secs: 600,
        },
        comments_per_message: RateLimitPolicy {
            limit: 100,
            window_secs: 3600,
        },
    }
}

fn fixture_with(limits: RateLimitConfig) -> Fixture {
    let messages = Arc::new(InMemoryMessageRepository::new());
    let service = CommentService::new(
        Arc::new(InMemoryCommentRepository::new()),
        messages.clone(),
        Arc::new(FixedWindowRateLimiter::new()),
        limits,
        ModerationConfig {
            auto_reject_threshold: 3,
            max_batch_size: 50,
        },
        ValidationRules::default(),
    );
    Fixture { service, messages }
}

fn fixture() -> Fixture {
    fixture_with(generous_limits())
}

fn identity(ip: &str, fingerprint: &str) -> ClientIdentity {
    ClientIdentity {
        ip: ip.to_string(),
        fingerprint: fingerprint.to_string(),
    }
}

fn metadata() -> ClientMetadata {
    ClientMetadata {
        ip_address: "203.0.113.7".to_string(),
        user_agent: "test-agent".to_string(),
    }
}

fn comment_request(message_id: Uuid, content: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        message_id,
        content: content.to_string(),
        author_name: None,
    }
}

/// 直接在存储里放一条已通过审核的留言
async fn seed_visible_message(messages: &InMemoryMessageRepository) -> Uuid {
    let mut message = domain::Message::new("host message", "#FFF9C4", None, metadata());
    message.approve("admin@x.com").unwrap();
    messages.create(&message).await.unwrap();
    message.id
}

#[tokio::test]
async fn test_create_comment_on_visible_message() {
    let fx = fixture();
    let message_id = seed_visible_message(&fx.messages).await;

    let comment = fx
        .service
        .create_comment(
            comment_request(message_id, "nice one"),
            &identity("1.1.1.1", "fp-1"),
            metadata(),
        )
        .await
        .unwrap();

    assert_eq!(comment.status, NoteStatus::Pending);
    assert_eq!(comment.message_id, message_id);
}

#[tokio::test]
async fn test_create_comment_on_pending_message_is_not_found() {
    let fx = fixture();
    let message = domain::Message::new("unreviewed", "#FFF9C4", None, metadata());
    fx.messages.create(&message).await.unwrap();

    let err = fx
        .service
        .create_comment(
            comment_request(message.id, "too early"),
            &identity("1.1.1.1", "fp-1"),
            metadata(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_comment_author_name_charset_is_restricted() {
    let fx = fixture();
    let message_id = seed_visible_message(&fx.messages).await;

    let mut req = comment_request(message_id, "hello");
    req.author_name = Some("bad name!".to_string());
    let err = fx
        .service
        .create_comment(req, &identity("1.1.1.1", "fp-1"), metadata())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_global_ip_rate_limit_blocks_before_per_message() {
    let mut limits = generous_limits();
    limits.comments_global = RateLimitPolicy {
        limit: 2,
        window_secs: 600,
    };
    let fx = fixture_with(limits);
    let message_id = seed_visible_message(&fx.messages).await;

    for i in 0..2 {
        fx.service
            .create_comment(
                comment_request(message_id, &format!("comment {}", i)),
                &identity("1.1.1.1", &format!("fp-{}", i)),
                metadata(),
            )
            .await
            .unwrap();
    }

    // 第三条来自同一IP，即使是新指纹也被全局上限拦截
    let err = fx
        .service
        .create_comment(
            comment_request(message_id, "flood"),
            &identity("1.1.1.1", "fp-fresh"),
            metadata(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::RateLimited { .. }));

    // 不同IP不受影响
    fx.service
        .create_comment(
            comment_request(message_id, "other ip"),
            &identity("2.2.2.2", "fp-x"),
            metadata(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_per_message_rate_limit_is_scoped_to_message() {
    let mut limits = generous_limits();
    limits.comments_per_message = RateLimitPolicy {
        limit: 1,
        window_secs: 3600,
    };
    let fx = fixture_with(limits);
    let first = seed_visible_message(&fx.messages).await;
    let second = seed_visible_message(&fx.messages).await;

    fx.service
        .create_comment(
            comment_request(first, "one"),
            &identity("1.1.1.1", "fp-1"),
            metadata(),
        )
        .await
        .unwrap();

    let err = fx
        .service
        .create_comment(
            comment_request(first, "two"),
            &identity("1.1.1.1", "fp-1"),
            metadata(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::RateLimited { .. }));

    // 同一指纹对另一条留言仍可评论
    fx.service
        .create_comment(
            comment_request(second, "elsewhere"),
            &identity("1.1.1.1", "fp-1"),
            metadata(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reject_without_reason_uses_default() {
    let fx = fixture();
    let message_id = seed_visible_message(&fx.messages).await;
    let comment = fx
        .service
        .create_comment(
            comment_request(message_id, "to reject"),
            &identity("1.1.1.1", "fp-1"),
            metadata(),
        )
        .await
        .unwrap();

    let updated = fx
        .service
        .moderate(
            comment.id,
            ModerationRequest {
                status: NoteStatus::Rejected,
                moderated_by: "admin@x.com".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, NoteStatus::Rejected);
    assert_eq!(
        updated.moderation.rejection_reason.as_deref(),
        Some(DEFAULT_REJECTION_REASON)
    );

    // 改判通过后拒绝理由随之清空
    let restored = fx
        .service
        .moderate(
            comment.id,
            ModerationRequest {
                status: NoteStatus::Approved,
                moderated_by: "admin@x.com".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .unwrap();
    assert!(restored.moderation.rejection_reason.is_none());
}

#[tokio::test]
async fn test_report_threshold_triggers_auto_reject() {
    let fx = fixture();
    let message_id = seed_visible_message(&fx.messages).await;
    let comment = fx
        .service
        .create_comment(
            comment_request(message_id, "borderline"),
            &identity("1.1.1.1", "fp-author"),
            metadata(),
        )
        .await
        .unwrap();
    fx.service
        .moderate(
            comment.id,
            ModerationRequest {
                status: NoteStatus::Approved,
                moderated_by: "admin@x.com".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .unwrap();

    let (updated, count) = fx.service.report(comment.id, "fp-a", "spam").await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(updated.status, NoteStatus::Approved);

    let (updated, _) = fx.service.report(comment.id, "fp-b", "spam").await.unwrap();
    assert_eq!(updated.status, NoteStatus::Approved);

    // 第三条举报达到阈值，系统自动拒绝
    let (updated, count) = fx.service.report(comment.id, "fp-c", "spam").await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(updated.status, NoteStatus::Rejected);
    assert_eq!(
        updated.moderation.moderated_by.as_deref(),
        Some(SYSTEM_MODERATOR)
    );
}

#[tokio::test]
async fn test_report_duplicate_fingerprint_conflicts() {
    let fx = fixture();
    let message_id = seed_visible_message(&fx.messages).await;
    let comment = fx
        .service
        .create_comment(
            comment_request(message_id, "target"),
            &identity("1.1.1.1", "fp-author"),
            metadata(),
        )
        .await
        .unwrap();
    fx.service
        .moderate(
            comment.id,
            ModerationRequest {
                status: NoteStatus::Approved,
                moderated_by: "admin@x.com".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .unwrap();

    fx.service.report(comment.id, "fp-a", "spam").await.unwrap();
    let err = fx
        .service
        .report(comment.id, "fp-a", "spam again")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Conflict {
            code: ConflictCode::AlreadyReported,
            ..
        })
    ));
}

#[tokio::test]
async fn test_batch_rejects_oversized_request_before_writing() {
    let fx = fixture();
    let ids: Vec<Uuid> = (0..51).map(|_| Uuid::new_v4()).collect();

    let err = fx
        .service
        .batch(BatchCommentRequest {
            ids,
            action: BatchAction::Approve,
            moderated_by: "admin@x.com".to_string(),
            rejection_reason: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::BatchSizeExceeded { given: 51, max: 50 })
    ));

    let err = fx
        .service
        .batch(BatchCommentRequest {
            ids: Vec::new(),
            action: BatchAction::Approve,
            moderated_by: "admin@x.com".to_string(),
            rejection_reason: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_batch_approve_counts_only_changed_rows() {
    let fx = fixture();
    let message_id = seed_visible_message(&fx.messages).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let comment = fx
            .service
            .create_comment(
                comment_request(message_id, &format!("comment {}", i)),
                &identity("1.1.1.1", &format!("fp-{}", i)),
                metadata(),
            )
            .await
            .unwrap();
        ids.push(comment.id);
    }
    // 其中一条预先通过，批量时不重复计数
    fx.service
        .moderate(
            ids[0],
            ModerationRequest {
                status: NoteStatus::Approved,
                moderated_by: "admin@x.com".to_string(),
                rejection_reason: None,
            },
        )
        .await
        .unwrap();

    let affected = fx
        .service
        .batch(BatchCommentRequest {
            ids: ids.clone(),
            action: BatchAction::Approve,
            moderated_by: "admin@x.com".to_string(),
            rejection_reason: None,
        })
        .await
        .unwrap();
    assert_eq!(affected, 2);

    let page = fx
        .service
        .list_public(message_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn test_batch_reject_uses_default_reason() {
    let fx = fixture();
    let message_id = seed_visible_message(&fx.messages).await;
    let comment = fx
        .service
        .create_comment(
            comment_request(message_id, "bulk target"),
            &identity("1.1.1.1", "fp-1"),
            metadata(),
        )
        .await
        .unwrap();

    let affected = fx
        .service
        .batch(BatchCommentRequest {
            ids: vec![comment.id],
            action: BatchAction::Reject,
            moderated_by: "admin@x.com".to_string(),
            rejection_reason: None,
        })
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let updated = fx.service.get_admin(comment.id).await.unwrap();
    assert_eq!(updated.status, NoteStatus::Rejected);
    assert_eq!(
        updated.moderation.rejection_reason.as_deref(),
        Some(DEFAULT_REJECTION_REASON)
    );
}

#[tokio::test]
async fn test_repository_tolerates_dangling_message_reference() {
    // 存储层不做引用完整性约束：指向已不存在留言的评论照常落库，
    // 缺失只在预览（create_comment 的可见性检查）时表现为留言不存在
    let comments = InMemoryCommentRepository::new();
    let orphan = Comment::new(
        Uuid::new_v4(),
        "留言早已被清理",
        None,
        ClientMetadata::default(),
    );

    let stored = comments.create(&orphan).await.unwrap();
    assert_eq!(stored.message_id, orphan.message_id);
    assert!(comments.find_by_id(stored.id).await.unwrap().is_some());
}
