mod chunker;
mod cli;
mod domain;
mod error;
mod llm;
mod log;
mod models;
mod processor;
mod resolver;
mod settings;


use std::fs::File;
use std::process;
use std::time::Instant;

use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use domain::command::{BatchCommand, RunRequest};
use error::Error;
use processor::RetryPolicy;

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("aibatch: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let outcome = parse_args()?;
    let config = match outcome {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    run_with_config(config)
}

/// Config から実行する（テストの入口にもなる）
pub(crate) fn run_with_config(config: Config) -> Result<i32, Error> {
    match config_to_command(config) {
        BatchCommand::Help => {
            print_help();
            Ok(0)
        }
        BatchCommand::ListModels => {
            models::print_models();
            Ok(0)
        }
        BatchCommand::Run(req) => run_batch(&req),
    }
}

/// バッチ 1 回分の実行
///
/// 設定の解決はチャンク処理の前にすべて終える。ここを抜けてから
/// 初めて入力・出力ファイルに触る。
fn run_batch(req: &RunRequest) -> Result<i32, Error> {
    let settings = settings::load(req.settings_path.as_deref())?;
    let env_key = std::env::var("OPENAI_API_KEY").ok();
    let config = resolver::resolve_run_config(req, settings.as_ref(), env_key)?;
    let driver = llm::factory::create_driver(&config)?;

    let start = Instant::now();
    log::info(&format!(
        "Processing {} in chunks of {} lines with model {}",
        config.input.display(),
        config.chunk_size,
        config.model
    ));

    let total_lines = chunker::count_lines(&config.input)?;
    let total_chunks = chunker::chunk_count(total_lines, config.chunk_size);
    let chunks = chunker::read_chunks(&config.input, config.chunk_size)?;

    let mut out = File::create(&config.output).map_err(|e| {
        Error::io_msg(format!(
            "Failed to create {}: {}",
            config.output.display(),
            e
        ))
    })?;

    let written = processor::process(
        chunks,
        total_chunks,
        &config,
        &driver,
        &RetryPolicy::default(),
        &mut out,
    )?;

    log::info(&format!(
        "Wrote {} blocks to {}",
        written,
        config.output.display()
    ));
    log::info(&format!(
        "Operation completed in {:.2} seconds.",
        start.elapsed().as_secs_f64()
    ));
    Ok(0)
}

fn print_usage() {
    eprintln!("Usage: aibatch [options] -i <input>");
}

fn print_help() {
    println!("Usage: aibatch [options] -i <input>");
    println!("Options:");
    println!("  -h, --help                 Show this help message");
    println!("  -L, --list-models          List available model identifiers and exit");
    println!("  -i, --input <file>         Input file name (required for a run)");
    println!("  -c, --chunks <n>           Number of lines per chunk. Default: 5");
    println!("  -p, --prompt <prompt>      The prompt template; must contain {{chunk}} exactly once");
    println!("  -f, --prompt-file <file>   Path to the prompt file. Default: default.pmt");
    println!("  -r, --role <role>          The system role string");
    println!("  -t, --temperature <t>      How deterministic answers will be, 0 = max determinism");
    println!("  -m, --model <model>        Model identifier. Default: gpt-4 (echo = offline dry run)");
    println!("  -k, --key <key>            OpenAI API key");
    println!("  -o, --output <file>        Output file name. Default: <input>_output.json");
    println!("      --config <path>        Settings file path. Default: ./aibatch.json");
    println!("      --generate <shell>     Generate shell completion script (bash, zsh, fish)");
    println!("  -v, --verbose              Log response text to stderr");
    println!();
    println!("Environment:");
    println!("  OPENAI_API_KEY   API key fallback when neither -k nor the settings file sets one.");
    println!();
    println!("Description:");
    println!("  Reads the input file, groups its lines into chunks, applies the prompt");
    println!("  template to each chunk and sends it to the model. Responses are appended");
    println!("  to the output file in chunk order, one block per chunk, flushed after");
    println!("  each write.");
    println!();
    println!("Examples:");
    println!("  aibatch -i tickets.csv -p 'Translate to English: {{chunk}}'");
    println!("  aibatch -i tickets.csv -c 10 -m gpt-4o -r 'You are a translator.'");
    println!("  aibatch -i tickets.csv -m echo    # offline dry run");
}
