//! 実行パラメータの解決
//!
//! CLI 値 > 設定ファイル > 組み込みデフォルト（API キーのみ環境変数
//! フォールバックあり）の優先順でマージし、不変の RunConfig を 1 つ
//! 作る。ここでの失敗はすべて設定エラーで、入力ファイルを開く前・
//! チャンク処理が始まる前に run を中断する。

use std::path::{Path, PathBuf};

use crate::domain::command::RunRequest;
use crate::domain::template::PromptTemplate;
use crate::domain::ModelName;
use crate::error::Error;
use crate::models;
use crate::settings::Settings;

/// チャンク行数のデフォルト
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// プロンプトファイルのデフォルトパス
pub const DEFAULT_PROMPT_FILE: &str = "default.pmt";

/// サンプリング温度のデフォルト（0 = 最大限決定的）
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// 解決済み実行パラメータ
///
/// 実行前に 1 度だけ構築し、以後は参照で渡す。コアがプロセス全体の
/// 可変状態に依存しないための唯一の入口。
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub chunk_size: usize,
    pub template: PromptTemplate,
    pub role: String,
    pub temperature: f32,
    pub model: ModelName,
    /// echo モデルのときは None のままでよい
    pub api_key: Option<String>,
    pub verbose: bool,
}

/// RunRequest と設定ファイルから RunConfig を解決する
///
/// * `env_key` - OPENAI_API_KEY 環境変数の値（main が読んで渡す）
pub fn resolve_run_config(
    req: &RunRequest,
    settings: Option<&Settings>,
    env_key: Option<String>,
) -> Result<RunConfig, Error> {
    let input = req
        .input
        .clone()
        .ok_or_else(|| Error::invalid_argument("Input file is required (-i/--input)"))?;

    let chunk_size = req
        .chunks
        .or_else(|| settings.and_then(|s| s.chunks))
        .unwrap_or(DEFAULT_CHUNK_SIZE);
    if chunk_size < 1 {
        return Err(Error::invalid_argument("Chunk size must be at least 1"));
    }

    let model = req
        .model
        .clone()
        .or_else(|| settings.and_then(|s| s.model.clone()).map(ModelName::new))
        .unwrap_or_else(|| ModelName::new(models::DEFAULT_MODEL));
    models::validate_model(model.as_ref())?;

    let temperature = req
        .temperature
        .or_else(|| settings.and_then(|s| s.temperature))
        .unwrap_or(DEFAULT_TEMPERATURE);

    let role = req
        .role
        .clone()
        .or_else(|| settings.and_then(|s| s.role.clone()))
        .unwrap_or_default();

    let api_key = req
        .key
        .clone()
        .or_else(|| settings.and_then(|s| s.key.clone()))
        .or(env_key);
    if api_key.is_none() && model.as_ref() != models::ECHO_MODEL {
        return Err(Error::invalid_argument(
            "Please set an OpenAI API key in aibatch.json (\"key\": ...), with -k/--key, \
             or in the OPENAI_API_KEY environment variable",
        ));
    }

    let prompt_text = resolve_prompt(req, settings)?;
    let template = PromptTemplate::new(prompt_text)?;

    let output = req
        .output
        .clone()
        .or_else(|| settings.and_then(|s| s.output.clone()))
        .unwrap_or_else(|| default_output_path(&input));

    Ok(RunConfig {
        input,
        output,
        chunk_size,
        template,
        role,
        temperature,
        model,
        api_key,
        verbose: req.verbose,
    })
}

/// プロンプト本文の解決: -p > 設定ファイル > プロンプトファイル
///
/// 設定ファイル由来の値だけ `\n`（2 文字）を改行に展開する。
/// CLI の -p はシェルが渡したままを使う。
fn resolve_prompt(req: &RunRequest, settings: Option<&Settings>) -> Result<String, Error> {
    if let Some(p) = &req.prompt {
        return Ok(p.clone());
    }
    if let Some(p) = settings.and_then(|s| s.prompt.as_deref()) {
        return Ok(p.replace("\\n", "\n"));
    }
    let prompt_file = req
        .prompt_file
        .clone()
        .or_else(|| settings.and_then(|s| s.prompt_file.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_FILE));
    std::fs::read_to_string(&prompt_file).map_err(|_| {
        Error::invalid_argument(format!(
            "Please set a prompt in aibatch.json (\"prompt\": ...), with -p/--prompt, \
             in {}, or in a file given with -f/--prompt-file",
            DEFAULT_PROMPT_FILE
        ))
    })
}

/// 出力パスのデフォルト: 入力の拡張子を落として `_output.json` を付ける
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input");
    match input.parent() {
        Some(dir) if dir != Path::new("") => dir.join(format!("{}_output.json", stem)),
        _ => PathBuf::from(format!("{}_output.json", stem)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_request() -> RunRequest {
        RunRequest {
            input: Some(PathBuf::from("data.csv")),
            prompt: Some("Do: {chunk}".to_string()),
            key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let cfg = resolve_run_config(&base_request(), None, None).unwrap();
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(cfg.model.as_ref(), models::DEFAULT_MODEL);
        assert_eq!(cfg.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(cfg.role, "");
        assert_eq!(cfg.output, PathBuf::from("data_output.json"));
        assert!(!cfg.verbose);
    }

    #[test]
    fn test_resolve_missing_input() {
        let req = RunRequest {
            input: None,
            ..base_request()
        };
        let e = resolve_run_config(&req, None, None).unwrap_err();
        assert!(e.is_usage());
        assert!(e.to_string().contains("Input file"));
    }

    #[test]
    fn test_resolve_unknown_model() {
        let req = RunRequest {
            model: Some(ModelName::new("gpt-9000")),
            ..base_request()
        };
        let e = resolve_run_config(&req, None, None).unwrap_err();
        assert!(e.is_usage());
        assert_eq!(e.exit_code(), 64);
        assert!(e.to_string().contains("Unknown model"));
    }

    #[test]
    fn test_resolve_chunk_size_zero() {
        let req = RunRequest {
            chunks: Some(0),
            ..base_request()
        };
        let e = resolve_run_config(&req, None, None).unwrap_err();
        assert!(e.is_usage());
        assert!(e.to_string().contains("Chunk size"));
    }

    #[test]
    fn test_resolve_cli_beats_settings() {
        let settings = Settings {
            chunks: Some(50),
            model: Some("gpt-3.5-turbo".to_string()),
            temperature: Some(1.5),
            role: Some("from settings".to_string()),
            ..Default::default()
        };
        let req = RunRequest {
            chunks: Some(2),
            model: Some(ModelName::new("gpt-4o")),
            temperature: Some(0.3),
            role: Some("from cli".to_string()),
            ..base_request()
        };
        let cfg = resolve_run_config(&req, Some(&settings), None).unwrap();
        assert_eq!(cfg.chunk_size, 2);
        assert_eq!(cfg.model.as_ref(), "gpt-4o");
        assert_eq!(cfg.temperature, 0.3);
        assert_eq!(cfg.role, "from cli");
    }

    #[test]
    fn test_resolve_settings_beat_defaults() {
        let settings = Settings {
            chunks: Some(50),
            model: Some("gpt-3.5-turbo".to_string()),
            output: Some(PathBuf::from("custom.txt")),
            ..Default::default()
        };
        let cfg = resolve_run_config(&base_request(), Some(&settings), None).unwrap();
        assert_eq!(cfg.chunk_size, 50);
        assert_eq!(cfg.model.as_ref(), "gpt-3.5-turbo");
        assert_eq!(cfg.output, PathBuf::from("custom.txt"));
    }

    #[test]
    fn test_resolve_key_precedence() {
        let settings = Settings {
            key: Some("sk-settings".to_string()),
            ..Default::default()
        };
        let cfg = resolve_run_config(
            &base_request(),
            Some(&settings),
            Some("sk-env".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));

        let req = RunRequest {
            key: None,
            ..base_request()
        };
        let cfg = resolve_run_config(&req, Some(&settings), Some("sk-env".to_string())).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("sk-settings"));

        let cfg = resolve_run_config(&req, None, Some("sk-env".to_string())).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_resolve_missing_key() {
        let req = RunRequest {
            key: None,
            ..base_request()
        };
        let e = resolve_run_config(&req, None, None).unwrap_err();
        assert!(e.is_usage());
        assert!(e.to_string().contains("API key"));
    }

    #[test]
    fn test_resolve_echo_needs_no_key() {
        let req = RunRequest {
            key: None,
            model: Some(ModelName::new("echo")),
            ..base_request()
        };
        let cfg = resolve_run_config(&req, None, None).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_resolve_settings_prompt_unescapes_newlines() {
        let settings = Settings {
            prompt: Some("Line one\\nLine two: {chunk}".to_string()),
            ..Default::default()
        };
        let req = RunRequest {
            prompt: None,
            ..base_request()
        };
        let cfg = resolve_run_config(&req, Some(&settings), None).unwrap();
        assert_eq!(cfg.template.as_str(), "Line one\nLine two: {chunk}");
    }

    #[test]
    fn test_resolve_cli_prompt_is_verbatim() {
        let req = RunRequest {
            prompt: Some("keep \\n as-is: {chunk}".to_string()),
            ..base_request()
        };
        let cfg = resolve_run_config(&req, None, None).unwrap();
        assert_eq!(cfg.template.as_str(), "keep \\n as-is: {chunk}");
    }

    #[test]
    fn test_resolve_prompt_file_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.pmt");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "From file: {{chunk}}").unwrap();
        let req = RunRequest {
            prompt: None,
            prompt_file: Some(path),
            ..base_request()
        };
        let cfg = resolve_run_config(&req, None, None).unwrap();
        assert_eq!(cfg.template.as_str(), "From file: {chunk}");
    }

    #[test]
    fn test_resolve_missing_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let req = RunRequest {
            prompt: None,
            prompt_file: Some(dir.path().join("absent.pmt")),
            ..base_request()
        };
        let e = resolve_run_config(&req, None, None).unwrap_err();
        assert!(e.is_usage());
        assert!(e.to_string().contains("Please set a prompt"));
    }

    #[test]
    fn test_resolve_bad_template_is_usage_error() {
        let req = RunRequest {
            prompt: Some("no placeholder".to_string()),
            ..base_request()
        };
        let e = resolve_run_config(&req, None, None).unwrap_err();
        assert!(e.is_usage());
        assert!(e.to_string().contains("{chunk}"));
    }

    #[test]
    fn test_default_output_path_with_dir() {
        let req = RunRequest {
            input: Some(PathBuf::from("sub/dir/tickets.csv")),
            ..base_request()
        };
        let cfg = resolve_run_config(&req, None, None).unwrap();
        assert_eq!(cfg.output, PathBuf::from("sub/dir/tickets_output.json"));
    }
}
