//! 应用层
//!
//! 用例编排：服务、限流、客户端标识、DTO。
//! 依赖领域层抽象，不依赖具体存储或 Web 框架。

pub mod client_identity;
pub mod dto;
pub mod errors;
pub mod memory;
pub mod rate_limiter;
pub mod services;

pub use client_identity::{extract_ip, fingerprint_of, ClientIdentity, UNKNOWN_IP};
pub use dto::{
    AdminCommentDto, AdminMessageDto, BatchAction, BatchResultDto, CommentDto, InteractionAction,
    InteractionDto, MessageDto, PageDto, ViolationReportDto,
};
pub use errors::{ApplicationError, ApplicationResult};
pub use memory::{
    InMemoryCommentRepository, InMemoryMessageRepository, InMemoryViolationReportRepository,
};
pub use rate_limiter::{FixedWindowRateLimiter, RateLimitDecision};
pub use services::{
    BatchCommentRequest, CommentService, CreateCommentRequest, CreateMessageRequest,
    CreateViolationReportRequest, MessageService, ModerationRequest, ReviewViolationRequest,
    ViolationReportService, DEFAULT_REJECTION_REASON,
};
