use std::sync::Arc;

use application::{CommentService, FixedWindowRateLimiter, MessageService, ViolationReportService};
use config::RateLimitConfig;

#[derive(Clone)]
pub struct AppState {
    pub message_service: Arc<MessageService>,
    pub comment_service: Arc<CommentService>,
    pub violation_service: Arc<ViolationReportService>,
    pub rate_limiter: Arc<FixedWindowRateLimiter>,
    pub rate_limits: RateLimitConfig,
    /// 管理端Bearer令牌白名单；空白名单拒绝所有管理请求
    pub admin_tokens: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        message_service: Arc<MessageService>,
        comment_service: Arc<CommentService>,
        violation_service: Arc<ViolationReportService>,
        rate_limiter: Arc<FixedWindowRateLimiter>,
        rate_limits: RateLimitConfig,
        admin_tokens: Vec<String>,
    ) -> Self {
        Self {
            message_service,
            comment_service,
            violation_service,
            rate_limiter,
            rate_limits,
            admin_tokens: Arc::new(admin_tokens),
        }
    }
}
