//! 入力ファイルのチャンク分割
//!
//! 行を chunk_size 個ずつの順序付きグループに区切る。行は read_line で
//! 読むため終端の改行を保持し、改行で終わらない最終行も 1 行として
//! 数える。進捗表示用の行数カウント（count_lines）も同じ読み取り
//! ループを使うので、事前カウントと実際に生成されるチャンク数が
//! ずれることはない。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Error;

/// 1 チャンク分の生の行（終端改行込み、長さ <= chunk_size）
pub type Chunk = Vec<String>;

/// 遅延・前方専用・単一パスのチャンク列
///
/// next() のたびに最大 size 行だけ読む。途中の I/O エラーは 1 度だけ
/// 返してイテレータを止める。
pub struct Chunks<R: BufRead> {
    reader: R,
    size: usize,
    failed: bool,
}

impl<R: BufRead> Chunks<R> {
    pub fn new(reader: R, size: usize) -> Self {
        Self {
            reader,
            size,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for Chunks<R> {
    type Item = Result<Chunk, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut lines: Chunk = Vec::new();
        while lines.len() < self.size {
            let mut buf = String::new();
            match self.reader.read_line(&mut buf) {
                Ok(0) => break,
                Ok(_) => lines.push(buf),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(Error::io_msg(format!("Failed to read input: {}", e))));
                }
            }
        }
        if lines.is_empty() {
            None
        } else {
            Some(Ok(lines))
        }
    }
}

/// 入力ファイルを開いてチャンク列を返す
pub fn read_chunks(path: &Path, size: usize) -> Result<Chunks<BufReader<File>>, Error> {
    let file = File::open(path)
        .map_err(|e| Error::io_msg(format!("Failed to open {}: {}", path.display(), e)))?;
    Ok(Chunks::new(BufReader::new(file), size))
}

/// 進捗表示用の事前行数カウント
///
/// チャンク列と同じ read_line ループで数える。空ファイルは 0 行。
pub fn count_lines(path: &Path) -> Result<usize, Error> {
    let file = File::open(path)
        .map_err(|e| Error::io_msg(format!("Failed to open {}: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);
    let mut count = 0usize;
    loop {
        let mut buf = String::new();
        let n = reader
            .read_line(&mut buf)
            .map_err(|e| Error::io_msg(format!("Failed to read input: {}", e)))?;
        if n == 0 {
            break;
        }
        count += 1;
    }
    Ok(count)
}

/// チャンク総数 = ceil(total_lines / size)
///
/// size は resolver で 1 以上を保証済み。
pub fn chunk_count(total_lines: usize, size: usize) -> usize {
    total_lines.div_ceil(size)
}
