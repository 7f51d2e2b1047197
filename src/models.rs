//! モデル許可リスト
//!
//! 利用可能なモデル ID は固定リスト。リスト外の指定は入力ファイルを
//! 開く前に usage エラーで落とす。`echo` はネットワークを使わない
//! オフラインプロバイダを選ぶ特別なモデル ID。

use crate::error::Error;

/// モデル未指定時のデフォルト
pub const DEFAULT_MODEL: &str = "gpt-4";

/// オフライン（ドライラン）用モデル ID
pub const ECHO_MODEL: &str = "echo";

/// 利用可能なモデル ID
pub const SUPPORTED_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4",
    "gpt-3.5-turbo",
    ECHO_MODEL,
];

/// モデル ID が許可リストに含まれるか検証する
pub fn validate_model(name: &str) -> Result<(), Error> {
    if SUPPORTED_MODELS.contains(&name) {
        return Ok(());
    }
    Err(Error::invalid_argument(format!(
        "Unknown model: '{}'. Available: {}",
        name,
        SUPPORTED_MODELS.join(", ")
    )))
}

/// -L / --list-models 用の一覧表示（stdout）
pub fn print_models() {
    for name in SUPPORTED_MODELS {
        if *name == DEFAULT_MODEL {
            println!("{} (default)", name);
        } else {
            println!("{}", name);
        }
    }
}
