//! GPT プロバイダの実装
//!
//! OpenAI Chat Completions (/v1/chat/completions) を blocking クライアント
//! で呼ぶ。HTTP ステータスをエラー種別に分類するのはここだけ:
//! 429 → RateLimit、5xx → Api（どちらもリトライ対象）、401/403 → Auth、
//! それ以外の失敗 → Http（リトライしない）。

use serde_json::{json, Value};

use crate::error::Error;
use crate::llm::provider::{LlmProvider, Message};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// GPT プロバイダ
pub struct GptProvider {
    model: String,
    api_key: String,
    temperature: f64,
}

impl GptProvider {
    /// 新しい GPT プロバイダを作成
    ///
    /// # Arguments
    /// * `model` - モデル名（許可リスト検証は resolver 済み）
    /// * `api_key` - API キー（RunConfig から渡される）
    /// * `temperature` - 温度パラメータ
    pub fn new(model: String, api_key: String, temperature: f64) -> Self {
        Self {
            model,
            api_key,
            temperature,
        }
    }
}

/// エラーレスポンスの本文から error.message を取り出す
fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = v["error"]["message"].as_str() {
            return msg.to_string();
        }
    }
    format!("HTTP {}: {}", status, body)
}

impl LlmProvider for GptProvider {
    fn name(&self) -> &str {
        "gpt"
    }

    fn make_request_payload(
        &self,
        query: &str,
        system_instruction: Option<&str>,
    ) -> Result<Value, Error> {
        let mut messages: Vec<Message> = Vec::new();
        if let Some(system) = system_instruction {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(query));

        let messages_json: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();

        Ok(json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages_json
        }))
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        let client = reqwest::blocking::Client::new();
        let response = client
            .post(CHAT_COMPLETIONS_URL)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .body(request_json.to_string())
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            return Ok(response_text);
        }

        let error_msg = extract_error_message(status, &response_text);
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::rate_limit(format!(
                "Rate limit exceeded: {}",
                error_msg
            )));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::auth(format!("Authentication failed: {}", error_msg)));
        }
        if status.is_server_error() {
            return Err(Error::api(format!("OpenAI API error: {}", error_msg)));
        }
        Err(Error::http(format!("OpenAI API error: {}", error_msg)))
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;

        if let Some(error) = v.get("error") {
            let msg = error["message"].as_str().unwrap_or("Unknown error");
            return Err(Error::http(format!("OpenAI API error: {}", msg)));
        }

        let text = v["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string());
        Ok(text)
    }
}
