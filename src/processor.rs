//! バッチ処理ループ
//!
//! チャンクを順番に 1 つずつ処理する。チャンク i の書き込みが flush
//! されるまでチャンク i+1 には進まない。同時リクエストは常に 1 本。

use std::io::Write;
use std::thread;
use std::time::Duration;

use crate::chunker::Chunk;
use crate::error::Error;
use crate::llm::driver::LlmDriver;
use crate::llm::provider::LlmProvider;
use crate::log;
use crate::resolver::RunConfig;

/// リトライポリシー
///
/// 一時的エラー（Error::is_transient）のときだけ同じチャンクを
/// 再試行する。遅延と試行回数上限は注入可能。デフォルトは
/// 「遅延 1 秒・上限なし」で、リトライし続ける挙動は保ちつつ
/// タイトループでエンドポイントを叩き続けることだけを避ける。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 1 チャンクあたりの最大試行回数。None なら無制限
    pub max_attempts: Option<u32>,
    /// 失敗から次の試行までの待ち時間
    pub delay: Duration,
}

impl RetryPolicy {
    /// 上限なしのポリシー
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    /// 試行回数上限付きのポリシー
    pub fn with_limit(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_secs(1))
    }
}

/// チャンク列を順に処理し、応答ブロックを out に書き出す
///
/// 各ブロックは応答テキスト + 空行 1 つ（\n\n）。書き込みごとに
/// flush するので、途中で落ちても完了済みチャンクは残る。
///
/// # Returns
/// * `Ok(usize)` - 書き込んだブロック数（= 処理したチャンク数）
pub fn process<P, W, I>(
    chunks: I,
    total_chunks: usize,
    config: &RunConfig,
    driver: &LlmDriver<P>,
    retry: &RetryPolicy,
    out: &mut W,
) -> Result<usize, Error>
where
    P: LlmProvider,
    W: Write,
    I: Iterator<Item = Result<Chunk, Error>>,
{
    let mut written = 0usize;
    for (index, chunk) in chunks.enumerate() {
        let chunk = chunk?;
        log::info(&format!("Chunk #{}/{}", index, total_chunks));

        let prompt = config.template.render(&chunk);
        let response = complete_with_retry(driver, &prompt, &config.role, retry, index)?;
        if config.verbose {
            log::debug(&response);
        }

        out.write_all(response.as_bytes())
            .and_then(|_| out.write_all(b"\n\n"))
            .map_err(|e| Error::io_msg(format!("Failed to write output: {}", e)))?;
        out.flush()
            .map_err(|e| Error::io_msg(format!("Failed to flush output: {}", e)))?;
        written += 1;
    }
    Ok(written)
}

/// 1 チャンク分の完了呼び出し（リトライループ）
///
/// 一時的エラーは警告を出して同じチャンクを再試行する。それ以外の
/// エラー種別は即座に伝播して run 全体を中断する。リトライ可否の
/// 判定は種別（is_transient）のみで行い、包括 catch はしない。
fn complete_with_retry<P: LlmProvider>(
    driver: &LlmDriver<P>,
    prompt: &str,
    role: &str,
    retry: &RetryPolicy,
    chunk_index: usize,
) -> Result<String, Error> {
    let mut attempts = 0u32;
    loop {
        match driver.query(prompt, Some(role)) {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() => {
                attempts += 1;
                log::warn(&format!(
                    "{}, retrying chunk #{} (attempt {})",
                    e, chunk_index, attempts
                ));
                if let Some(max) = retry.max_attempts {
                    if attempts >= max {
                        log::error(&format!(
                            "Giving up on chunk #{} after {} attempts",
                            chunk_index, attempts
                        ));
                        return Err(e);
                    }
                }
                if !retry.delay.is_zero() {
                    thread::sleep(retry.delay);
                }
            }
            Err(e) => return Err(e),
        }
    }
}
