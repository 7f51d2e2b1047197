//! プロンプトテンプレート
//!
//! `{chunk}` プレースホルダをちょうど 1 つ含む文字列を包む Newtype。
//! 検証は構築時に行うため、バッチループ中に不正テンプレートで
//! 失敗することはない（設定エラーとして実行前に落とす）。

use regex::Regex;

use crate::error::Error;

/// チャンク代入点の名前
pub const PLACEHOLDER: &str = "{chunk}";

/// `{name}` 形式のトークンだけをプレースホルダとして扱う。
/// それ以外の波括弧（プロンプト中の JSON 例など）は素通しする。
const PLACEHOLDER_PATTERN: &str = r"\{[A-Za-z_][A-Za-z0-9_]*\}";

/// 検証済みプロンプトテンプレート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    /// テンプレートを検証して構築する
    ///
    /// `{name}` 形式のトークンがちょうど 1 つ、かつ `{chunk}` で
    /// あること。欠落・別名・複数はすべて usage エラー。
    pub fn new(text: impl Into<String>) -> Result<Self, Error> {
        let text = text.into();
        let re = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| Error::invalid_argument(format!("Bad placeholder pattern: {}", e)))?;
        let tokens: Vec<&str> = re.find_iter(&text).map(|m| m.as_str()).collect();
        match tokens.as_slice() {
            [] => Err(Error::invalid_argument(format!(
                "Prompt template must contain the {} placeholder",
                PLACEHOLDER
            ))),
            [one] if *one == PLACEHOLDER => Ok(Self(text)),
            [other] => Err(Error::invalid_argument(format!(
                "Unknown placeholder {} in prompt template (expected {})",
                other, PLACEHOLDER
            ))),
            _ => Err(Error::invalid_argument(format!(
                "Prompt template must contain exactly one {} placeholder, found {}",
                PLACEHOLDER,
                tokens.len()
            ))),
        }
    }

    /// チャンクの生の行（終端の改行込み）を連結して代入する
    pub fn render(&self, chunk: &[String]) -> String {
        self.0.replace(PLACEHOLDER, &chunk.concat())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
