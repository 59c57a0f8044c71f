//! Interactive tool-call prompt
//!
//! Each line is either a full ToolCall object or `<Tool> <json-arguments>`.
//! Uses rustyline for readline-style editing and history.

use crate::executor::{Executor, ToolCall, ToolKind};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use serde_json::{Map, Value};
use std::io;
use std::path::Path;

/// Parse one prompt line into a tool call
fn parse_line(line: &str) -> Result<ToolCall, String> {
    if line.starts_with('{') {
        let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
        return Ok(ToolCall::from(value));
    }

    let (tool, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let arguments = if rest.is_empty() {
        Map::new()
    } else {
        match serde_json::from_str(rest).map_err(|e| e.to_string())? {
            Value::Object(map) => map,
            _ => return Err("arguments must be a JSON object".to_string()),
        }
    };

    Ok(ToolCall {
        tool: tool.to_string(),
        arguments,
    })
}

pub async fn run(executor: &Executor, history_file: &Path) -> io::Result<()> {
    let mut rl: Editor<(), FileHistory> = Editor::new().map_err(io::Error::other)?;

    if history_file.exists()
        && let Err(e) = rl.load_history(history_file)
    {
        eprintln!("[warning] Failed to load history: {}", e);
    }

    println!("toolgate v{}", env!("CARGO_PKG_VERSION"));
    println!("Working directory: {}", executor.working_dir().display());
    println!(
        "Tools: {}",
        ToolKind::available_tools().join(", ")
    );
    println!("Enter `<Tool> {{json arguments}}` or a ToolCall object. Ctrl+D to quit.");
    println!();

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(input);

                let call = match parse_line(input) {
                    Ok(call) => call,
                    Err(e) => {
                        println!("[error] {}", e);
                        continue;
                    }
                };

                let result = executor.execute(&call).await;
                match serde_json::to_string_pretty(&result) {
                    Ok(text) if result.is_error() => println!("[error] {}", text),
                    Ok(text) => println!("{}", text),
                    Err(e) => println!("[error] {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C - cancel current input, continue
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("[error] Readline error: {}", e);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(history_file) {
        eprintln!("[warning] Failed to save history: {}", e);
    }

    println!("\nGoodbye!");
    Ok(())
}
