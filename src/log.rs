//! stderr ロギング
//!
//! `<ISO8601> <LEVEL>: <message>` の 1 行形式で stderr に出す。
//! stdout はモデル一覧・補完スクリプト・ヘルプ専用。

use std::fmt;

/// 現在時刻を ISO8601 (RFC3339) で返す
pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        };
        f.write_str(s)
    }
}

/// 1 行ログを stderr に書き出す
pub fn log(level: LogLevel, message: &str) {
    eprintln!("{} {}: {}", now_iso8601(), level, message);
}

pub fn info(message: &str) {
    log(LogLevel::Info, message);
}

pub fn warn(message: &str) {
    log(LogLevel::Warn, message);
}

pub fn error(message: &str) {
    log(LogLevel::Error, message);
}

pub fn debug(message: &str) {
    log(LogLevel::Debug, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Info.to_string(), "INFO");
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
    }

    #[test]
    fn test_now_iso8601_shape() {
        let ts = now_iso8601();
        // 2026-01-01T00:00:00+00:00 のような形
        assert!(ts.contains('T'));
        assert!(ts.len() >= 20);
    }
}
