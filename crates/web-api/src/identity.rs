//! 从请求头提取客户端标识与元数据

use application::ClientIdentity;
use axum::http::HeaderMap;
use domain::ClientMetadata;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// 从代理头与浏览器头导出（IP, 指纹）
pub fn client_identity(headers: &HeaderMap) -> ClientIdentity {
    ClientIdentity::derive(
        header_str(headers, "x-forwarded-for"),
        header_str(headers, "x-real-ip"),
        header_str(headers, "user-agent"),
        header_str(headers, "accept-language"),
        header_str(headers, "accept-encoding"),
    )
}

/// 管理端展示用的原始请求元数据
pub fn client_metadata(headers: &HeaderMap) -> ClientMetadata {
    let identity = client_identity(headers);
    ClientMetadata {
        ip_address: identity.ip,
        user_agent: header_str(headers, "user-agent").unwrap_or_default().to_string(),
    }
}
