//! 领域层
//!
//! 留言板的核心业务模型：实体、验证规则、错误类型和 Repository 抽象。
//! 本层不依赖任何具体存储或 Web 框架。

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod validation;

pub use entities::{
    ClientMetadata, Comment, Message, Moderation, NoteStatus, ReactionKind, Report,
    ViolationReport, ViolationStatus, ViolationType,
};
pub use entities::comment::SYSTEM_MODERATOR;
pub use errors::{ConflictCode, DomainError, DomainResult};
pub use repositories::{
    BoardStatistics, CommentRepository, MessageRepository, PaginatedResult, Pagination,
    ReactionState, ViolationReportRepository,
};
pub use validation::{AuthorNameKind, ValidationRules, APPROVED_PALETTE};
