//! 管理端认证
//!
//! Bearer 令牌白名单校验，失败关闭：缺头返回 401，令牌不在白名单
//! （包括白名单为空）返回 403。令牌比较区分大小写。

use application::ApplicationError;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// 通过管理端认证的请求守卫
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::from(ApplicationError::Unauthorized("缺少 Authorization 头".into()))
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::from(ApplicationError::Unauthorized(
                "Authorization 头必须是 Bearer 格式".into(),
            ))
        })?;

        if token.is_empty() || !state.admin_tokens.iter().any(|t| t == token) {
            warn!(path = %parts.uri.path(), "管理端令牌校验失败");
            return Err(ApplicationError::Forbidden("令牌无效".into()).into());
        }

        Ok(AdminAuth)
    }
}
