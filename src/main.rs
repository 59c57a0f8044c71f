mod executor;
mod repl;

use clap::{Parser, Subcommand};
use executor::{Executor, ExecutorConfig, ToolCall};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::fmt;

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "toolgate")]
#[command(about = "Execute agent tool calls against the real system", version)]
struct Args {
    /// Working directory for relative paths, writes and commands
    #[arg(short = 'C', long)]
    working_dir: Option<PathBuf>,

    /// Config file (default: $TOOLGATE_CONFIG or ./toolgate.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the WebSearch and WebFetch providers
    #[arg(long)]
    no_web: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Execute one tool call, given as JSON or read from stdin
    Exec {
        /// e.g. '{"tool": "Bash", "arguments": {"command": "ls"}}'
        call: Option<String>,
    },
    /// Execute a JSON array of tool calls in order
    Batch {
        /// File holding the array (default: stdin)
        file: Option<PathBuf>,
    },
    /// Print the tool definitions
    Tools,
    /// Interactive prompt: one tool call per line
    Repl {
        /// History file path
        #[arg(long)]
        history_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries results
    let level = match args.verbose {
        0 => std::env::var("TOOLGATE_LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let mut config = ExecutorConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.working_dir {
        config.working_dir = dir;
    }
    if args.no_web {
        config.web.enabled = false;
    }
    config.validate()?;

    let executor = Executor::new(config);
    info!(
        working_dir = %executor.working_dir().display(),
        web = executor.config().web.enabled,
        "Executor initialized"
    );

    match args.command {
        CliCommand::Exec { call } => {
            let text = match call {
                Some(text) => text,
                None => read_stdin()?,
            };
            let value: Value = serde_json::from_str(&text)?;
            let result = executor.execute(&ToolCall::from(value)).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        CliCommand::Batch { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => read_stdin()?,
            };
            let Value::Array(items) = serde_json::from_str::<Value>(&text)? else {
                return Err("expected a JSON array of tool calls".into());
            };
            let entries = executor.execute_json_batch(items).await;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        CliCommand::Tools => {
            println!(
                "{}",
                serde_json::to_string_pretty(&executor.tool_definitions())?
            );
        }
        CliCommand::Repl { history_file } => {
            let history_file = history_file.unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|p| p.join(".toolgate_history"))
                    .unwrap_or_else(|| PathBuf::from(".toolgate_history"))
            });
            repl::run(&executor, &history_file).await?;
        }
    }

    Ok(())
}

fn read_stdin() -> std::io::Result<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}
