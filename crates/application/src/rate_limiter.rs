//! 固定窗口限流器
//!
//! 进程内按键计数，防止刷帖和互动洪水。状态不跨进程、不跨重启，
//! 多实例部署时各实例独立计数——这是单实例部署目标下接受的限制，
//! 不要悄悄替换为持久化实现（窗口语义会变）。

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use config::RateLimitPolicy;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::warn;

/// 单个键的计数窗口
#[derive(Debug, Clone)]
struct WindowEntry {
    /// 当前窗口内的计数
    count: u32,
    /// 窗口开始时间（单调时钟，用于判定过期）
    window_start: Instant,
    /// 窗口重置的挂钟时间（对外暴露）
    reset_at: DateTime<Utc>,
}

/// 限流判定结果
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// 本窗口内剩余额度
    pub remaining: u32,
    /// 窗口重置时间
    pub reset_at: DateTime<Utc>,
}

/// 固定窗口限流器
pub struct FixedWindowRateLimiter {
    entries: RwLock<HashMap<String, WindowEntry>>,
}

impl FixedWindowRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 检查并计数
    ///
    /// 首次调用开启窗口；窗口内超过 limit 返回 allowed=false 且 reset_at 不变；
    /// 窗口过期后的调用开启新窗口。锁中毒时失败打开（放行并告警），
    /// 宁可漏限合法流量也不阻断。
    pub fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let window = Duration::from_secs(policy.window_secs);
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(key, error = %err, "限流器锁中毒，失败打开放行请求");
                return RateLimitDecision {
                    allowed: true,
                    remaining: policy.limit,
                    reset_at: Utc::now() + ChronoDuration::seconds(policy.window_secs as i64),
                };
            }
        };

        let now = Instant::now();
        let entry = entries.entry(key.to_string()).or_insert_with(|| WindowEntry {
            count: 0,
            window_start: now,
            reset_at: Utc::now() + ChronoDuration::seconds(policy.window_secs as i64),
        });

        // 窗口过期则重置
        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
            entry.reset_at = Utc::now() + ChronoDuration::seconds(policy.window_secs as i64);
        }

        if entry.count >= policy.limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: policy.limit - entry.count,
            reset_at: entry.reset_at,
        }
    }

    /// 清理过期窗口（防止内存泄漏），由后台任务周期调用
    pub fn cleanup_expired(&self) {
        if let Ok(mut entries) = self.entries.write() {
            let now = Utc::now();
            entries.retain(|_, entry| entry.reset_at > now);
        }
    }

    /// 重置指定键的窗口（测试与管理端用）
    pub fn reset(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    /// 当前跟踪的键数量
    pub fn tracked_keys(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

impl Default for FixedWindowRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
