//! エラーハンドリング
//!
//! メッセージを運ぶ enum で統一。リトライ可否（is_transient）と
//! 終了コード（exit_code）はエラー種別から決まる。

/// aibatch 全体で使うエラー型
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// 引数・設定の不備（usage エラー、終了コード 64）
    #[error("{0}")]
    Usage(String),
    /// ファイル I/O エラー
    #[error("{0}")]
    Io(String),
    /// JSON のパース・シリアライズ失敗
    #[error("{0}")]
    Json(String),
    /// HTTP レベルの失敗（通信断・不正リクエスト等、リトライしない）
    #[error("{0}")]
    Http(String),
    /// レートリミット超過（リトライ対象）
    #[error("{0}")]
    RateLimit(String),
    /// 上流 API エラー（5xx 等、リトライ対象）
    #[error("{0}")]
    Api(String),
    /// 認証失敗（リトライしない）
    #[error("{0}")]
    Auth(String),
}

impl Error {
    /// 引数不正エラー
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// I/O エラー
    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// JSON エラー
    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    /// HTTP エラー
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// レートリミットエラー
    pub fn rate_limit(msg: impl Into<String>) -> Self {
        Self::RateLimit(msg.into())
    }

    /// 上流 API エラー
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// 認証エラー
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// usage エラーかどうか（main で print_usage するか判定）
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// リトライしてよいエラーかどうか
    ///
    /// レートリミットと上流 API エラーだけが対象。それ以外を
    /// リトライすると非一時的な障害で無限ループするため必ず false。
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit(_) | Self::Api(_))
    }

    /// プロセスの終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 64,
            _ => 74,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error() {
        let err = Error::invalid_argument("bad flag");
        assert!(err.is_usage());
        assert!(!err.is_transient());
        assert_eq!(err.exit_code(), 64);
        assert_eq!(err.to_string(), "bad flag");
    }

    #[test]
    fn test_transient_kinds() {
        assert!(Error::rate_limit("429").is_transient());
        assert!(Error::api("500").is_transient());
        assert!(!Error::http("400").is_transient());
        assert!(!Error::auth("401").is_transient());
        assert!(!Error::io_msg("io").is_transient());
        assert!(!Error::json("json").is_transient());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::io_msg("x").exit_code(), 74);
        assert_eq!(Error::http("x").exit_code(), 74);
        assert_eq!(Error::rate_limit("x").exit_code(), 74);
        assert_eq!(Error::auth("x").exit_code(), 74);
    }
}
