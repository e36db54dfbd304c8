//! 主应用程序入口
//!
//! 组装全部组件并启动留言板 Web 服务。

use std::sync::Arc;
use std::time::Duration;

use application::{CommentService, FixedWindowRateLimiter, MessageService, ViolationReportService};
use config::AppConfig;
use domain::ValidationRules;
use infrastructure::{
    Db, PostgresCommentRepository, PostgresMessageRepository, PostgresViolationReportRepository,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

/// 限流器过期窗口的清理周期
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取并校验配置（关键安全项缺失会直接 panic）
    let config = AppConfig::from_env();
    config.validate()?;

    tracing::info!(
        database = %config.database.url.split('@').last().unwrap_or("unknown"),
        "连接数据库"
    );

    let pool =
        Arc::new(Db::create_pool(&config.database.url, config.database.max_connections).await?);

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&*pool).await?;

    let rules = ValidationRules {
        min_content_length: config.content.min_content_length,
        max_content_length: config.content.max_content_length,
        max_author_name_length: config.content.max_author_name_length,
    };

    let message_repository = Arc::new(PostgresMessageRepository::new(pool.clone()));
    let comment_repository = Arc::new(PostgresCommentRepository::new(pool.clone()));
    let violation_repository = Arc::new(PostgresViolationReportRepository::new(pool));

    let rate_limiter = Arc::new(FixedWindowRateLimiter::new());

    let message_service = Arc::new(MessageService::new(message_repository.clone(), rules));
    let comment_service = Arc::new(CommentService::new(
        comment_repository,
        message_repository,
        rate_limiter.clone(),
        config.rate_limits.clone(),
        config.moderation,
        rules,
    ));
    let violation_service = Arc::new(ViolationReportService::new(violation_repository, rules));

    // 周期清理限流器的过期窗口，避免键无限增长
    {
        let rate_limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                rate_limiter.cleanup_expired();
            }
        });
    }

    let state = AppState::new(
        message_service,
        comment_service,
        violation_service,
        rate_limiter,
        config.rate_limits.clone(),
        config.admin.tokens.clone(),
    );

    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("留言板服务器启动在 http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
