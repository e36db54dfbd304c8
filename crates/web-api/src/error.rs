//! API错误与线上错误信封
//!
//! 所有失败响应统一为 `{"success": false, "error": {"message", "code"}}`；
//! 限流响应额外携带 `Retry-After` 头和 ISO 格式的 `resetAt`。
//! 数据库错误细节只进日志，绝不下发给客户端。

use application::ApplicationError;
use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Clone, Copy)]
struct RateLimitInfo {
    reset_at: DateTime<Utc>,
    retry_after_secs: u64,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            rate_limit: None,
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn rate_limited(reset_at: DateTime<Utc>, retry_after_secs: u64) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: "RATE_LIMITED",
            message: format!("请求过于频繁，请在 {} 秒后重试", retry_after_secs),
            rate_limit: Some(RateLimitInfo {
                reset_at,
                retry_after_secs,
            }),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use domain::DomainError;

        match error {
            ApplicationError::Domain(DomainError::Validation { field, message }) => {
                ApiError::bad_request("VALIDATION_ERROR", format!("{}: {}", field, message))
            }
            ApplicationError::Domain(DomainError::NotFound {
                resource_type,
                resource_id,
            }) => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} 不存在: {}", resource_type, resource_id),
            ),
            ApplicationError::Domain(DomainError::Conflict { code, message }) => {
                ApiError::new(StatusCode::CONFLICT, code.as_str(), message)
            }
            ApplicationError::Domain(DomainError::BatchSizeExceeded { given, max }) => {
                ApiError::bad_request(
                    "BATCH_SIZE_EXCEEDED",
                    format!("批量操作最多 {} 条，收到 {} 条", max, given),
                )
            }
            ApplicationError::Domain(DomainError::Database { message }) => {
                error!(detail = %message, "数据库错误");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "内部错误",
                )
            }
            ApplicationError::RateLimited {
                reset_at,
                retry_after_secs,
            } => ApiError::rate_limited(reset_at, retry_after_secs),
            ApplicationError::Unauthorized(message) => ApiError::unauthorized(message),
            ApplicationError::Forbidden(message) => ApiError::forbidden(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error_body = json!({
            "message": self.message,
            "code": self.code,
        });
        if let Some(info) = self.rate_limit {
            error_body["resetAt"] = json!(info.reset_at.to_rfc3339());
        }
        let body = Json(json!({
            "success": false,
            "error": error_body,
        }));

        let mut response = (self.status, body).into_response();
        if let Some(info) = self.rate_limit {
            if let Ok(value) = info.retry_after_secs.to_string().parse() {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ConflictCode, DomainError};

    #[test]
    fn test_conflict_maps_to_409_with_code() {
        let err: ApiError = ApplicationError::from(DomainError::conflict(
            ConflictCode::AlreadyReported,
            "dup",
        ))
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "ALREADY_REPORTED");
    }

    #[test]
    fn test_database_detail_is_not_surfaced() {
        let err: ApiError =
            ApplicationError::from(DomainError::database("connection refused to 10.0.0.5")).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("10.0.0.5"));
    }

    #[test]
    fn test_auth_errors_map_to_401_and_403() {
        let unauthorized: ApiError =
            ApplicationError::Unauthorized("缺少 Authorization 头".into()).into();
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.code, "UNAUTHORIZED");

        let forbidden: ApiError = ApplicationError::Forbidden("令牌无效".into()).into();
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
        assert_eq!(forbidden.code, "FORBIDDEN");
    }

    #[test]
    fn test_rate_limited_carries_reset_info() {
        let reset_at = Utc::now();
        let err = ApiError::rate_limited(reset_at, 42);
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.rate_limit.unwrap().retry_after_secs, 42);
    }
}
