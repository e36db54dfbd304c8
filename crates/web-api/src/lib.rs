//! Web API 层
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务。
//! 公开面与管理面分开：管理面走 Bearer 令牌白名单认证。

mod admin_routes;
mod auth;
mod error;
mod identity;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
