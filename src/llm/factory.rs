//! プロバイダファクトリー
//!
//! RunConfig のモデル ID から適切なプロバイダを作成する。

use serde_json::Value;

use crate::error::Error;
use crate::llm::driver::LlmDriver;
use crate::llm::echo::EchoProvider;
use crate::llm::gpt::GptProvider;
use crate::llm::provider::LlmProvider;
use crate::models;
use crate::resolver::RunConfig;

/// プロバイダの enum ラッパー
///
/// 異なるプロバイダ型を型安全に扱うために使用する。
pub enum AnyProvider {
    Gpt(GptProvider),
    Echo(EchoProvider),
}

impl LlmProvider for AnyProvider {
    fn name(&self) -> &str {
        match self {
            Self::Gpt(p) => p.name(),
            Self::Echo(p) => p.name(),
        }
    }

    fn make_request_payload(
        &self,
        query: &str,
        system_instruction: Option<&str>,
    ) -> Result<Value, Error> {
        match self {
            Self::Gpt(p) => p.make_request_payload(query, system_instruction),
            Self::Echo(p) => p.make_request_payload(query, system_instruction),
        }
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        match self {
            Self::Gpt(p) => p.make_http_request(request_json),
            Self::Echo(p) => p.make_http_request(request_json),
        }
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        match self {
            Self::Gpt(p) => p.parse_response_text(response_json),
            Self::Echo(p) => p.parse_response_text(response_json),
        }
    }
}

/// RunConfig からプロバイダを作成する
pub fn create_provider(config: &RunConfig) -> Result<AnyProvider, Error> {
    if config.model.as_ref() == models::ECHO_MODEL {
        return Ok(AnyProvider::Echo(EchoProvider::new()));
    }
    let api_key = config.api_key.clone().ok_or_else(|| {
        Error::invalid_argument(format!("Model '{}' requires an API key", config.model))
    })?;
    Ok(AnyProvider::Gpt(GptProvider::new(
        config.model.to_string(),
        api_key,
        f64::from(config.temperature),
    )))
}

/// RunConfig からドライバーを作成する
pub fn create_driver(config: &RunConfig) -> Result<LlmDriver<AnyProvider>, Error> {
    let provider = create_provider(config)?;
    Ok(LlmDriver::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::RunRequest;
    use crate::domain::ModelName;
    use crate::resolver::resolve_run_config;
    use std::path::PathBuf;

    fn config_for(model: &str, key: Option<&str>) -> RunConfig {
        let req = RunRequest {
            input: Some(PathBuf::from("in.txt")),
            prompt: Some("p: {chunk}".to_string()),
            model: Some(ModelName::new(model)),
            key: key.map(|k| k.to_string()),
            ..Default::default()
        };
        resolve_run_config(&req, None, None).unwrap()
    }

    #[test]
    fn test_create_provider_echo() {
        let provider = create_provider(&config_for("echo", None)).unwrap();
        assert_eq!(provider.name(), "echo");
    }

    #[test]
    fn test_create_provider_gpt() {
        let provider = create_provider(&config_for("gpt-4", Some("sk-test"))).unwrap();
        assert_eq!(provider.name(), "gpt");
    }

    #[test]
    fn test_create_driver_echo_round_trip() {
        let driver = create_driver(&config_for("echo", None)).unwrap();
        let text = driver.query("hello", Some("")).unwrap();
        assert_eq!(text, "hello");
    }
}
