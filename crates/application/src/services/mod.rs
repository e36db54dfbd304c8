//! 应用服务
//!
//! 编排领域实体与 Repository 的用例层。所有写路径从这里进入：
//! 验证 → （必要时）限流 → 实体状态转换 → Repository 持久化。

pub mod comment_service;
pub mod message_service;
pub mod violation_report_service;

#[cfg(test)]
mod comment_service_tests;
#[cfg(test)]
mod message_service_tests;

pub use comment_service::{
    BatchCommentRequest, CommentService, CreateCommentRequest, DEFAULT_REJECTION_REASON,
};
pub use message_service::{CreateMessageRequest, MessageService, ModerationRequest};
pub use violation_report_service::{
    CreateViolationReportRequest, ReviewViolationRequest, ViolationReportService,
};
