//! 基础设施层
//!
//! 领域 Repository 接口的 PostgreSQL 实现与连接池管理。

pub mod db;

pub use db::repositories::{
    PostgresCommentRepository, PostgresMessageRepository, PostgresViolationReportRepository,
};
pub use db::{Db, DbPool};
