//! Echo プロバイダの実装
//!
//! 実際の API は呼ばず、レンダリング済みプロンプトをそのまま応答として
//! 返す。ドライラン（何が送られるかの確認）とテストに使う。

use serde_json::{json, Value};

use crate::error::Error;
use crate::llm::provider::LlmProvider;

/// Echo プロバイダ
pub struct EchoProvider;

impl EchoProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn make_request_payload(
        &self,
        query: &str,
        system_instruction: Option<&str>,
    ) -> Result<Value, Error> {
        Ok(json!({
            "system": system_instruction.unwrap_or(""),
            "user": query
        }))
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        // ネットワークには出ず、リクエストをそのまま折り返す
        Ok(request_json.to_string())
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;
        Ok(v["user"].as_str().map(|s| s.to_string()))
    }
}
