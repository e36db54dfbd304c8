//! 输入验证规则
//!
//! 纯函数，无副作用、无 I/O；失败统一返回 `DomainError::Validation`。
//! 长度边界来自配置（`ValidationRules`），色板是固定白名单。

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::entities::NoteStatus;
use crate::errors::{DomainError, DomainResult};

/// 便利贴的固定色板
///
/// 白名单是唯一权威判据：格式合法但不在色板内的颜色一律拒绝。
pub const APPROVED_PALETTE: &[&str] = &[
    "#FFF9C4", // 黄
    "#FFCCBC", // 橙
    "#C8E6C9", // 绿
    "#BBDEFB", // 蓝
    "#E1BEE7", // 紫
    "#F8BBD0", // 粉
    "#B2EBF2", // 青
    "#FFE0B2", // 杏
];

static PALETTE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| APPROVED_PALETTE.iter().copied().collect());

/// 长度边界（配置注入，见 config crate）
#[derive(Debug, Clone, Copy)]
pub struct ValidationRules {
    pub min_content_length: usize,
    pub max_content_length: usize,
    pub max_author_name_length: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_content_length: 1,
            max_content_length: 500,
            max_author_name_length: 30,
        }
    }
}

/// 笔名的归属实体，决定字符集限制的严格程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorNameKind {
    Message,
    Comment,
}

/// 验证内容：非空白、字符数在配置边界内
pub fn validate_content(content: &str, rules: &ValidationRules) -> DomainResult<()> {
    if content.trim().is_empty() {
        return Err(DomainError::validation("content", "内容不能为空"));
    }
    let length = content.chars().count();
    if length < rules.min_content_length {
        return Err(DomainError::validation(
            "content",
            format!("内容不能少于{}个字符", rules.min_content_length),
        ));
    }
    if length > rules.max_content_length {
        return Err(DomainError::validation(
            "content",
            format!("内容不能超过{}个字符", rules.max_content_length),
        ));
    }
    Ok(())
}

/// 验证颜色：必须是色板成员
pub fn validate_color(color: &str) -> DomainResult<()> {
    if !PALETTE_SET.contains(color) {
        return Err(DomainError::validation(
            "color",
            format!("颜色不在允许的色板内: {}", color),
        ));
    }
    Ok(())
}

/// 验证可选笔名
///
/// 留言笔名只限制长度；评论笔名额外限制字符集为
/// 字母（含重音字母）、数字、下划线和连字符。
pub fn validate_author_name(
    name: Option<&str>,
    kind: AuthorNameKind,
    rules: &ValidationRules,
) -> DomainResult<()> {
    let Some(name) = name else {
        return Ok(());
    };

    if name.trim().is_empty() {
        return Err(DomainError::validation("authorName", "笔名不能为空白"));
    }
    if name.chars().count() > rules.max_author_name_length {
        return Err(DomainError::validation(
            "authorName",
            format!("笔名不能超过{}个字符", rules.max_author_name_length),
        ));
    }

    if kind == AuthorNameKind::Comment {
        let allowed = |c: char| c.is_alphabetic() || c.is_ascii_digit() || c == '_' || c == '-';
        if !name.chars().all(allowed) {
            return Err(DomainError::validation(
                "authorName",
                "笔名只能包含字母、数字、下划线和连字符",
            ));
        }
    }

    Ok(())
}

/// 区分大小写地验证并解析状态字符串
pub fn validate_status(status: &str) -> DomainResult<NoteStatus> {
    NoteStatus::parse(status)
}

/// 验证拒绝理由：Rejected 必须带理由
///
/// 评论流程在服务层用默认理由兜底（仅此一处），这里保持严格。
pub fn validate_rejection_reason(status: NoteStatus, reason: Option<&str>) -> DomainResult<()> {
    if status == NoteStatus::Rejected
        && reason.map(str::trim).filter(|r| !r.is_empty()).is_none()
    {
        return Err(DomainError::validation(
            "rejectionReason",
            "拒绝时必须给出理由",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ValidationRules {
        ValidationRules {
            min_content_length: 3,
            max_content_length: 10,
            max_author_name_length: 8,
        }
    }

    #[test]
    fn test_content_bounds() {
        let rules = rules();
        assert!(validate_content("abc", &rules).is_ok());
        assert!(validate_content("abcdefghij", &rules).is_ok());

        assert!(validate_content("ab", &rules).is_err());
        assert!(validate_content("abcdefghijk", &rules).is_err());
        assert!(validate_content("", &rules).is_err());
        assert!(validate_content("   ", &rules).is_err());
        // 全角字符按字符数计算
        assert!(validate_content("秘密秘密秘密", &rules).is_ok());
    }

    #[test]
    fn test_color_whitelist_is_authoritative() {
        assert!(validate_color("#FFF9C4").is_ok());
        assert!(validate_color("#BBDEFB").is_ok());

        // 格式正确但不在色板内
        assert!(validate_color("#ABCDEF").is_err());
        assert!(validate_color("#000000").is_err());
        // 格式错误
        assert!(validate_color("FFF9C4").is_err());
        assert!(validate_color("#fff9c4").is_err());
        assert!(validate_color("yellow").is_err());
    }

    #[test]
    fn test_author_name_optional_and_bounded() {
        let rules = rules();
        assert!(validate_author_name(None, AuthorNameKind::Message, &rules).is_ok());
        assert!(validate_author_name(Some("anon"), AuthorNameKind::Message, &rules).is_ok());
        assert!(
            validate_author_name(Some("toolongname"), AuthorNameKind::Message, &rules).is_err()
        );
        assert!(validate_author_name(Some("  "), AuthorNameKind::Message, &rules).is_err());
    }

    #[test]
    fn test_comment_author_name_charset() {
        let rules = rules();
        assert!(validate_author_name(Some("ana_1-2"), AuthorNameKind::Comment, &rules).is_ok());
        // 重音字母允许
        assert!(validate_author_name(Some("María"), AuthorNameKind::Comment, &rules).is_ok());
        assert!(validate_author_name(Some("a b"), AuthorNameKind::Comment, &rules).is_err());
        assert!(validate_author_name(Some("a!"), AuthorNameKind::Comment, &rules).is_err());
        // 留言笔名不受字符集限制
        assert!(validate_author_name(Some("a b!"), AuthorNameKind::Message, &rules).is_ok());
    }

    #[test]
    fn test_rejection_reason_required_when_rejected() {
        assert!(validate_rejection_reason(NoteStatus::Rejected, Some("spam")).is_ok());
        assert!(validate_rejection_reason(NoteStatus::Rejected, None).is_err());
        assert!(validate_rejection_reason(NoteStatus::Rejected, Some("  ")).is_err());
        assert!(validate_rejection_reason(NoteStatus::Approved, None).is_ok());
    }
}
