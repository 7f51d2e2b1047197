//! aibatch.json の読み込み
//!
//! すべてのフィールドは任意。CLI 値とのマージと必須チェックは
//! resolver が行う。

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// デフォルトの設定ファイル名（カレントディレクトリ）
pub const SETTINGS_FILE: &str = "aibatch.json";

/// aibatch.json の内容（解決前）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// 1 チャンクの行数
    pub chunks: Option<usize>,
    /// プロンプトテンプレート（`\n` の 2 文字は resolver で改行に展開）
    pub prompt: Option<String>,
    /// プロンプトファイルのパス
    pub prompt_file: Option<PathBuf>,
    /// システムロール文字列
    pub role: Option<String>,
    /// サンプリング温度
    pub temperature: Option<f32>,
    /// モデル ID
    pub model: Option<String>,
    /// API キー
    pub key: Option<String>,
    /// 出力ファイルのパス
    pub output: Option<PathBuf>,
}

/// serde 用の内部構造
#[derive(Debug, Deserialize)]
struct SettingsRaw {
    #[serde(alias = "chunk_size")]
    chunks: Option<usize>,
    prompt: Option<String>,
    prompt_file: Option<PathBuf>,
    role: Option<String>,
    temperature: Option<f32>,
    model: Option<String>,
    #[serde(alias = "api_key")]
    key: Option<String>,
    output: Option<PathBuf>,
}

impl From<SettingsRaw> for Settings {
    fn from(r: SettingsRaw) -> Self {
        Settings {
            chunks: r.chunks,
            prompt: r.prompt,
            prompt_file: r.prompt_file,
            role: r.role,
            temperature: r.temperature,
            model: r.model,
            key: r.key,
            output: r.output,
        }
    }
}

impl Settings {
    /// JSON 文字列からパース（ファイル読みは load で行う）
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let raw: SettingsRaw = serde_json::from_str(json)?;
        Ok(raw.into())
    }
}

/// 設定ファイルを読み込む
///
/// 明示パス（--config）はファイルが無ければエラー。デフォルトパスは
/// 無ければ Ok(None)。JSON が壊れていればどちらもエラー（メッセージに
/// パスを含める）。
pub fn load(explicit: Option<&Path>) -> Result<Option<Settings>, Error> {
    let path: PathBuf = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(SETTINGS_FILE);
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| Error::io_msg(format!("{}: {}", path.display(), e)))?;
    Settings::parse(&contents)
        .map_err(|e| Error::json(format!("{}: {}", path.display(), e)))
        .map(Some)
}
