//! LLM ドライバーの実装
//!
//! プロバイダに依存しない共通処理（ペイロード生成 → HTTP → テキスト
//! 抽出）を提供する。

use crate::error::Error;
use crate::llm::provider::LlmProvider;

/// LLM ドライバー
pub struct LlmDriver<P: LlmProvider> {
    provider: P,
}

impl<P: LlmProvider> LlmDriver<P> {
    /// 新しいドライバーを作成
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// LLM にクエリを送信してレスポンステキストを取得
    ///
    /// # Arguments
    /// * `query` - ユーザーターン（レンダリング済みプロンプト）
    /// * `system_instruction` - システムロール文字列
    ///
    /// # Returns
    /// * `Ok(String)` - 応答テキスト（1 チャンク分の CompletionResult）
    /// * `Err(Error)` - 失敗（種別はそのまま呼び出し元のリトライ判定へ）
    pub fn query(&self, query: &str, system_instruction: Option<&str>) -> Result<String, Error> {
        let payload = self
            .provider
            .make_request_payload(query, system_instruction)?;

        let request_json = serde_json::to_string(&payload)
            .map_err(|e| Error::json(format!("Failed to serialize request: {}", e)))?;

        let response_json = self.provider.make_http_request(&request_json)?;

        let text = self
            .provider
            .parse_response_text(&response_json)?
            .ok_or_else(|| Error::http("No text in response".to_string()))?;

        Ok(text)
    }

    /// プロバイダを取得
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
