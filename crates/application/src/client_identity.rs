//! 客户端标识
//!
//! 从一次请求导出两个不同的键：原始IP（管理端展示）和隐私保护的指纹
//! （限流与点赞/点踩/举报去重）。去重一律用指纹，绝不用原始IP。

use data_encoding::HEXLOWER;
use ring::digest;

/// 无法识别IP时的占位值
pub const UNKNOWN_IP: &str = "unknown";

/// 客户端标识：原始IP + 单向指纹
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub ip: String,
    pub fingerprint: String,
}

impl ClientIdentity {
    /// 从请求头字段导出标识
    ///
    /// 指纹是对 IP + User-Agent + Accept-Language + Accept-Encoding
    /// 拼接后的 SHA-256 摘要：同一客户端形态下确定，不可逆，
    /// 浏览器或请求头变化后不保证稳定。
    pub fn derive(
        forwarded_for: Option<&str>,
        real_ip: Option<&str>,
        user_agent: Option<&str>,
        accept_language: Option<&str>,
        accept_encoding: Option<&str>,
    ) -> Self {
        let ip = extract_ip(forwarded_for, real_ip);
        let fingerprint = fingerprint_of(
            &ip,
            user_agent.unwrap_or(""),
            accept_language.unwrap_or(""),
            accept_encoding.unwrap_or(""),
        );
        Self { ip, fingerprint }
    }
}

/// 提取客户端IP：优先 x-forwarded-for 的第一项，其次 x-real-ip，否则 "unknown"
pub fn extract_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    if let Some(forwarded) = forwarded_for {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real) = real_ip {
        let real = real.trim();
        if !real.is_empty() {
            return real.to_string();
        }
    }
    UNKNOWN_IP.to_string()
}

/// 计算客户端指纹（小写十六进制的 SHA-256）
pub fn fingerprint_of(
    ip: &str,
    user_agent: &str,
    accept_language: &str,
    accept_encoding: &str,
) -> String {
    let material = format!("{}|{}|{}|{}", ip, user_agent, accept_language, accept_encoding);
    let hash = digest::digest(&digest::SHA256, material.as_bytes());
    HEXLOWER.encode(hash.as_ref())
}
