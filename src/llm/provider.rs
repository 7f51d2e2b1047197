//! LLM プロバイダのトレイト定義

use serde_json::Value;

use crate::error::Error;

/// LLM プロバイダのトレイト
///
/// 各プロバイダ（GPT、Echo）はこのトレイトを実装する。リクエスト生成・
/// HTTP 実行・テキスト抽出を分けておくことで、HTTP を伴わない
/// テストダブルを差し込める。
pub trait LlmProvider {
    /// プロバイダ名を返す
    fn name(&self) -> &str;

    /// リクエストペイロードを生成
    ///
    /// # Arguments
    /// * `query` - ユーザーターン（レンダリング済みプロンプト）
    /// * `system_instruction` - システムロール文字列
    ///
    /// # Returns
    /// * `Ok(Value)` - リクエスト JSON
    /// * `Err(Error)` - 生成失敗
    fn make_request_payload(
        &self,
        query: &str,
        system_instruction: Option<&str>,
    ) -> Result<Value, Error>;

    /// HTTP リクエストを実行してレスポンスを取得
    ///
    /// # Arguments
    /// * `request_json` - リクエスト JSON 文字列
    ///
    /// # Returns
    /// * `Ok(String)` - レスポンス JSON 文字列
    /// * `Err(Error)` - 失敗（種別はリトライ判定に使われる）
    fn make_http_request(&self, request_json: &str) -> Result<String, Error>;

    /// レスポンスからテキストを抽出
    ///
    /// # Returns
    /// * `Ok(Option<String>)` - 抽出したテキスト（存在しない場合は None）
    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error>;
}

/// メッセージ構造体（system / user）
#[derive(Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_new() {
        let msg = Message::new("user", "Hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_message_system() {
        let msg = Message::system("You are helpful");
        assert_eq!(msg.role, "system");
        assert_eq!(msg.content, "You are helpful");
    }

    #[test]
    fn test_message_user_multiline() {
        let msg = Message::user("Line 1\nLine 2");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "Line 1\nLine 2");
    }
}
