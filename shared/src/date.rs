//! 时间显示模块
//!
//! 后端返回的时间可能是三种格式之一：
//! - RFC 3339（`2024-05-01T08:30:00+00:00`）
//! - 不带时区的 ISO（`2024-05-01T08:30:00`，可带小数秒）
//! - Flask jsonify 默认的 HTTP 日期（`Wed, 01 May 2024 08:30:00 GMT`）

use chrono::{DateTime, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 解析为不带时区的时间（统一按 UTC 处理）
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// 格式化用于界面显示；无法解析时原样返回
pub fn display_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}
