//! aibatch コマンドの enum（Command Pattern）
//!
//! バッチ実行 vs モデル一覧表示の分岐を enum で明示する。

use std::path::PathBuf;

use crate::domain::ModelName;

/// aibatch の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum BatchCommand {
    /// ヘルプ表示
    Help,
    /// モデル許可リストの表示（コアは実行しない）
    ListModels,
    /// バッチ実行（解決前の生パラメータを運ぶ）
    Run(RunRequest),
}

/// バッチ実行 1 回分の解決前パラメータ
///
/// CLI から来た値のみを保持する。設定ファイル・環境変数との
/// マージは resolver が行い、結果は RunConfig になる。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunRequest {
    pub input: Option<PathBuf>,
    pub chunks: Option<usize>,
    pub prompt: Option<String>,
    pub prompt_file: Option<PathBuf>,
    pub key: Option<String>,
    pub role: Option<String>,
    pub temperature: Option<f32>,
    pub model: Option<ModelName>,
    pub output: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
    pub verbose: bool,
}
