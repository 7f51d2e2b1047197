use std::path::PathBuf;

use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;

use crate::domain::command::{BatchCommand, RunRequest};
use crate::domain::ModelName;
use crate::error::Error;

/// CLI から受け取った生の値
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub help: bool,
    /// -L / --list-models: モデル許可リストを表示して終了
    pub list_models: bool,
    /// -v / --verbose: 応答テキストを debug レベルで stderr に出す
    pub verbose: bool,
    pub input: Option<PathBuf>,
    pub chunks: Option<usize>,
    pub prompt: Option<String>,
    pub prompt_file: Option<PathBuf>,
    pub key: Option<String>,
    pub role: Option<String>,
    pub temperature: Option<f32>,
    pub model: Option<ModelName>,
    pub output: Option<PathBuf>,
    /// --config: 設定ファイルの明示パス
    pub config_path: Option<PathBuf>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("aibatch")
        .about("Process a file applying a prompt to batches of lines")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("list-models")
                .short('L')
                .long("list-models")
                .help("List available model identifiers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log response text to stderr (for troubleshooting)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Input file name")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("chunks")
                .short('c')
                .long("chunks")
                .value_name("n")
                .help("Number of lines per chunk")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("prompt-file")
                .short('f')
                .long("prompt-file")
                .value_name("file")
                .help("Path to the prompt file")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("key")
                .short('k')
                .long("key")
                .value_name("key")
                .help("OpenAI API key")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("role")
                .short('r')
                .long("role")
                .value_name("role")
                .help("The system role string")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("prompt")
                .short('p')
                .long("prompt")
                .value_name("prompt")
                .help("The prompt template (must contain {chunk})")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("temperature")
                .short('t')
                .long("temperature")
                .value_name("t")
                .help("How deterministic answers will be, 0 = max determinism")
                .value_parser(value_parser!(f32))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("model")
                .short('m')
                .long("model")
                .value_name("model")
                .help("Model identifier (see -L/--list-models)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Output file name (default: <input>_output.json)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("config")
                .long("config")
                .value_name("path")
                .help("Path to the settings file (default: ./aibatch.json)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    Config {
        help: matches.get_flag("help"),
        list_models: matches.get_flag("list-models"),
        verbose: matches.get_flag("verbose"),
        input: matches.get_one::<PathBuf>("input").cloned(),
        chunks: matches.get_one::<usize>("chunks").copied(),
        prompt: matches.get_one::<String>("prompt").cloned(),
        prompt_file: matches.get_one::<PathBuf>("prompt-file").cloned(),
        key: matches.get_one::<String>("key").cloned(),
        role: matches.get_one::<String>("role").cloned(),
        temperature: matches.get_one::<f32>("temperature").copied(),
        model: matches
            .get_one::<String>("model")
            .cloned()
            .map(ModelName::new),
        output: matches.get_one::<PathBuf>("output").cloned(),
        config_path: matches.get_one::<PathBuf>("config").cloned(),
    }
}

/// コマンドライン引数を解析する
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    if let Some(shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(*shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// 補完スクリプトを stdout に出力する
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "aibatch", &mut std::io::stdout());
}

/// Config を実行モードに変換する（match は main レイヤーに集約）
pub fn config_to_command(config: Config) -> BatchCommand {
    if config.help {
        return BatchCommand::Help;
    }
    if config.list_models {
        return BatchCommand::ListModels;
    }
    BatchCommand::Run(RunRequest {
        input: config.input,
        chunks: config.chunks,
        prompt: config.prompt,
        prompt_file: config.prompt_file,
        key: config.key,
        role: config.role,
        temperature: config.temperature,
        model: config.model,
        output: config.output,
        settings_path: config.config_path,
        verbose: config.verbose,
    })
}
