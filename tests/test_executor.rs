// Integration tests for Executor module
// This file should be run with cargo test --test test_executor

#[path = "../src/executor/mod.rs"]
mod executor;

use async_trait::async_trait;
use executor::config::DEFAULT_DANGEROUS_PATTERNS;
use executor::{
    ContentSearchProvider, Executor, ExecutorConfig, ExecutorError, ToolCall, ToolOutput,
};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    });
}

/// A working directory and a home directory, both scratch
struct Sandbox {
    work: TempDir,
    home: TempDir,
    executor: Executor,
}

impl Sandbox {
    fn wd(&self) -> &Path {
        self.executor.working_dir()
    }

    fn home(&self) -> PathBuf {
        self.executor
            .config()
            .home_dir
            .clone()
            .expect("home dir configured")
    }

    async fn run(&self, tool: &str, arguments: Value) -> Value {
        self.executor
            .execute(&ToolCall::new(tool, arguments))
            .await
            .to_value()
    }
}

fn sandbox_with(adjust: impl FnOnce(&mut ExecutorConfig)) -> Sandbox {
    init_tracing();
    let work = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();
    let mut config = ExecutorConfig {
        working_dir: work.path().to_path_buf(),
        home_dir: Some(home.path().to_path_buf()),
        ..Default::default()
    };
    config.web.enabled = false;
    adjust(&mut config);
    Sandbox {
        executor: Executor::new(config),
        work,
        home,
    }
}

fn create_sandbox() -> Sandbox {
    sandbox_with(|_| {})
}

/// Permission bits do not restrict root, so permission tests skip there
fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;

    /// Unknown tools list every supported tool, in order
    #[tokio::test]
    async fn test_unknown_tool() {
        let sb = create_sandbox();

        let result = sb.run("Delete", json!({"file_path": "x"})).await;
        assert_eq!(result["error"], "Unknown tool: Delete");
        assert_eq!(
            result["available_tools"],
            json!(["Read", "Write", "Edit", "Bash", "Glob", "Grep", "WebSearch", "WebFetch"])
        );
    }

    /// A call without a usable tool name still gets a result
    #[tokio::test]
    async fn test_malformed_call() {
        let sb = create_sandbox();

        let call = ToolCall::from(json!({"tool": 5, "arguments": "nope"}));
        assert_eq!(call.tool, "");
        assert!(call.arguments.is_empty());

        let result = sb.executor.execute(&call).await.to_value();
        assert_eq!(result["error"], "Unknown tool: ");
        assert_eq!(result["available_tools"].as_array().unwrap().len(), 8);
    }

    /// Arguments of the wrong JSON type are reported against the tool
    #[tokio::test]
    async fn test_invalid_argument_types() {
        let sb = create_sandbox();

        let result = sb.run("Read", json!({"file_path": 42})).await;
        let error = result["error"].as_str().unwrap();
        assert!(error.starts_with("Invalid arguments for Read:"), "{error}");
        assert_eq!(result["tool"], "Read");
    }

    /// Tool definitions cover every tool in advertised order
    #[tokio::test]
    async fn test_tool_definitions() {
        let sb = create_sandbox();

        let defs = sb.executor.tool_definitions();
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            ["Read", "Write", "Edit", "Bash", "Glob", "Grep", "WebSearch", "WebFetch"]
        );
        for def in &defs {
            assert!(!def.description.is_empty(), "{} has no description", def.name);
            assert!(def.input_schema.is_object());
            assert!(def.input_schema["required"].is_array());
        }
    }

    /// Description overrides from config replace the defaults
    #[tokio::test]
    async fn test_description_override() {
        let sb = sandbox_with(|config| {
            config
                .tool_descriptions
                .insert("Bash".to_string(), "Run it".to_string());
        });

        let defs = sb.executor.tool_definitions();
        let bash = defs.iter().find(|d| d.name == "Bash").unwrap();
        assert_eq!(bash.description, "Run it");
    }

    /// Batches keep input order and never drop a failed call
    #[tokio::test]
    async fn test_batch_preserves_order() {
        let sb = create_sandbox();
        let path = sb.wd().join("batch.txt").display().to_string();

        let calls = vec![
            ToolCall::new("Write", json!({"file_path": path, "content": "batched"})),
            ToolCall::new("Nope", json!({"x": 1})),
            ToolCall::new("Read", json!({"file_path": path})),
            ToolCall::new("Bash", json!({"command": "exit 1"})),
        ];
        let entries = sb.executor.execute_batch(calls.clone()).await;

        assert_eq!(entries.len(), 4);
        for (entry, call) in entries.iter().zip(&calls) {
            assert_eq!(entry.tool, json!(call.tool));
            assert_eq!(entry.arguments, Value::Object(call.arguments.clone()));
        }
        assert!(entries[0].result.failure().is_none());
        assert_eq!(entries[1].result.error(), Some("Unknown tool: Nope"));
        assert!(entries[1].result.output().is_none());
        assert!(matches!(
            entries[2].result.output(),
            Some(ToolOutput::Read(read)) if read.content == "batched"
        ));
        assert_eq!(entries[3].result.to_value()["returncode"], 1);

        let serialized = serde_json::to_value(&entries).unwrap();
        assert_eq!(serialized[1]["tool"], "Nope");
        assert_eq!(serialized[1]["arguments"], json!({"x": 1}));
        assert_eq!(serialized[1]["result"]["error"], "Unknown tool: Nope");
    }

    /// JSON batches echo each call's fields as submitted, even unusable ones
    #[tokio::test]
    async fn test_json_batch_echoes_raw_calls() {
        let sb = create_sandbox();

        let items = vec![
            json!({"tool": 7, "arguments": {"command": "echo hi"}}),
            json!({"arguments": ["not", "an", "object"]}),
            json!({"tool": "Bash", "arguments": {"command": "echo hi"}}),
        ];
        let entries = sb.executor.execute_json_batch(items).await;

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].tool, json!(7));
        assert_eq!(entries[0].result.error(), Some("Unknown tool: "));
        assert_eq!(entries[1].tool, Value::Null);
        assert_eq!(entries[1].arguments, json!(["not", "an", "object"]));
        assert_eq!(entries[2].tool, json!("Bash"));
        assert_eq!(entries[2].result.to_value()["stdout"], "hi\n");

        let serialized = serde_json::to_value(&entries).unwrap();
        assert_eq!(serialized[0]["tool"], 7);
        assert_eq!(serialized[1]["tool"], Value::Null);
        assert!(
            serialized[0]["result"]["available_tools"].is_array(),
            "{serialized}"
        );
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let sb = create_sandbox();
        assert!(sb.executor.execute_batch(Vec::new()).await.is_empty());
    }

    struct PanickingSearch;

    #[async_trait]
    impl ContentSearchProvider for PanickingSearch {
        async fn search(&self, _pattern: &str, _root: &Path) -> executor::Result<Vec<String>> {
            panic!("provider exploded");
        }
    }

    /// A panic inside a handler becomes an error result tagged with the tool
    #[tokio::test]
    async fn test_panic_is_contained() {
        let sb = create_sandbox();
        let executor = sb
            .executor
            .with_content_search(Arc::new(PanickingSearch));

        let result = executor
            .execute(&ToolCall::new("Grep", json!({"pattern": "x"})))
            .await
            .to_value();
        assert_eq!(result["error"], "provider exploded");
        assert_eq!(result["tool"], "Grep");

        // The executor keeps working afterwards
        let result = executor
            .execute(&ToolCall::new("Bash", json!({"command": "echo ok"})))
            .await
            .to_value();
        assert_eq!(result["stdout"], "ok\n");
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    /// Write then Read the same file
    #[tokio::test]
    async fn test_write_then_read() {
        let sb = create_sandbox();
        let path = sb.wd().join("test.txt").display().to_string();

        let written = sb
            .run("Write", json!({"file_path": path, "content": "hello"}))
            .await;
        assert_eq!(written["success"], true);
        assert_eq!(written["path"], path);
        assert_eq!(written["size"], 5);
        assert_eq!(written["lines"], 1);

        let read = sb.run("Read", json!({"file_path": path})).await;
        assert_eq!(read["content"], "hello");
        assert_eq!(read["size"], 5);
        assert_eq!(read["lines"], 1);
        assert_eq!(read["path"], path);
        assert!(read.get("error").is_none());
    }

    #[tokio::test]
    async fn test_read_counts_chars_and_lines() {
        let sb = create_sandbox();
        fs::write(sb.wd().join("multi.txt"), "añb\nc\n").unwrap();

        let read = sb.run("Read", json!({"file_path": "multi.txt"})).await;
        assert_eq!(read["content"], "añb\nc\n");
        assert_eq!(read["size"], 6);
        assert_eq!(read["lines"], 3);
    }

    /// Relative paths resolve against the working directory, `~` against home
    #[tokio::test]
    async fn test_read_resolves_relative_and_tilde() {
        let sb = create_sandbox();
        fs::create_dir(sb.wd().join("notes")).unwrap();
        fs::write(sb.wd().join("notes/today.md"), "work").unwrap();
        fs::write(sb.home().join("profile"), "home").unwrap();

        let read = sb
            .run("Read", json!({"file_path": "notes/../notes/today.md"}))
            .await;
        assert_eq!(read["content"], "work");
        assert_eq!(
            read["path"],
            sb.wd().join("notes/today.md").display().to_string()
        );

        let read = sb.run("Read", json!({"file_path": "~/profile"})).await;
        assert_eq!(read["content"], "home");
    }

    #[tokio::test]
    async fn test_read_errors() {
        let sb = create_sandbox();
        fs::create_dir(sb.wd().join("dir")).unwrap();

        let result = sb.run("Read", json!({})).await;
        assert_eq!(result["error"], "No file path provided");

        let result = sb.run("Read", json!({"file_path": "missing.txt"})).await;
        assert_eq!(result["error"], "File not found: missing.txt");

        let result = sb.run("Read", json!({"file_path": "dir"})).await;
        assert_eq!(result["error"], "Not a file: dir");
    }

    /// Files over the ceiling are refused without content
    #[tokio::test]
    async fn test_read_size_limit() {
        let sb = create_sandbox();
        fs::write(sb.wd().join("big.txt"), "a".repeat(50_001)).unwrap();
        fs::write(sb.wd().join("edge.txt"), "a".repeat(50_000)).unwrap();

        let result = sb.run("Read", json!({"file_path": "big.txt"})).await;
        assert_eq!(
            result["error"],
            "File too large (50001 bytes). Max: 50000 bytes"
        );
        assert!(result.get("content").is_none());
        assert!(result["suggestion"].is_string());

        let result = sb.run("Read", json!({"file_path": "edge.txt"})).await;
        assert_eq!(result["size"], 50_000);
    }

    #[tokio::test]
    async fn test_read_binary_file() {
        let sb = create_sandbox();
        fs::write(sb.wd().join("blob.bin"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let result = sb.run("Read", json!({"file_path": "blob.bin"})).await;
        assert_eq!(result["error"], "Binary file cannot be read as text");
        assert_eq!(result["size"], 4);
        assert!(result.get("content").is_none());
    }

    /// Writes outside both roots are rejected and nothing is created
    #[tokio::test]
    async fn test_write_outside_roots_rejected() {
        let sb = create_sandbox();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("escape.txt");

        let result = sb
            .run(
                "Write",
                json!({"file_path": target.display().to_string(), "content": "x"}),
            )
            .await;
        assert_eq!(
            result["error"],
            "Cannot write outside home directory or working directory"
        );
        assert!(!target.exists());

        let result = sb
            .run("Write", json!({"file_path": "../escape.txt", "content": "x"}))
            .await;
        assert!(result["error"].is_string());
        assert!(!sb.wd().parent().unwrap().join("escape.txt").exists());
    }

    /// A sibling whose name merely extends the root is not inside it
    #[tokio::test]
    async fn test_write_sibling_prefix_rejected() {
        let sb = create_sandbox();
        let sibling = PathBuf::from(format!("{}-sibling", sb.wd().display()));
        let target = sibling.join("evil.txt");

        let result = sb
            .run(
                "Write",
                json!({"file_path": target.display().to_string(), "content": "x"}),
            )
            .await;
        assert_eq!(
            result["error"],
            "Cannot write outside home directory or working directory"
        );
        assert!(!sibling.exists());
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_allows_home() {
        let sb = create_sandbox();

        let result = sb
            .run("Write", json!({"file_path": "a/b/c.txt", "content": "one\ntwo"}))
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(result["lines"], 2);
        assert_eq!(
            fs::read_to_string(sb.wd().join("a/b/c.txt")).unwrap(),
            "one\ntwo"
        );

        let result = sb
            .run("Write", json!({"file_path": "~/inside.txt", "content": "home"}))
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(
            fs::read_to_string(sb.home().join("inside.txt")).unwrap(),
            "home"
        );
    }

    #[tokio::test]
    async fn test_write_missing_arguments() {
        let sb = create_sandbox();

        let result = sb.run("Write", json!({"content": "x"})).await;
        assert_eq!(result["error"], "No file path provided");

        let result = sb
            .run("Write", json!({"file_path": "empty.txt", "content": ""}))
            .await;
        assert_eq!(result["error"], "No content provided");
        assert!(!sb.wd().join("empty.txt").exists());
    }

    /// Permission problems are reported as such, not as generic failures
    #[tokio::test]
    async fn test_permission_denied() {
        if running_as_root() {
            return;
        }
        let sb = create_sandbox();
        let locked_dir = sb.wd().join("ro");
        fs::create_dir(&locked_dir).unwrap();
        set_mode(&locked_dir, 0o555);
        let locked_file = sb.wd().join("s.txt");
        fs::write(&locked_file, "hidden").unwrap();
        set_mode(&locked_file, 0o000);

        let written = sb
            .run("Write", json!({"file_path": "ro/x.txt", "content": "x"}))
            .await;
        let read = sb.run("Read", json!({"file_path": "s.txt"})).await;

        set_mode(&locked_dir, 0o755);
        set_mode(&locked_file, 0o644);

        assert_eq!(written["error"], "Permission denied: ro/x.txt");
        assert!(!locked_dir.join("x.txt").exists());
        assert_eq!(read["error"], "Permission denied: s.txt");
        assert!(read.get("content").is_none());
    }

    /// Two occurrences: rejected, file untouched
    #[tokio::test]
    async fn test_edit_ambiguous_match() {
        let sb = create_sandbox();
        let path = sb.wd().join("foo.txt");
        fs::write(&path, "foo bar foo").unwrap();

        let result = sb
            .run(
                "Edit",
                json!({"file_path": "foo.txt", "old_string": "foo", "new_string": "baz"}),
            )
            .await;
        assert_eq!(result["error"], "old_string found 2 times. Must be unique.");
        assert!(result["suggestion"].is_string());
        assert_eq!(fs::read(&path).unwrap(), b"foo bar foo");
    }

    /// One occurrence: replaced in place, everything else byte-identical
    #[tokio::test]
    async fn test_edit_single_match() {
        let sb = create_sandbox();
        let path = sb.wd().join("greek.txt");
        fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();

        let result = sb
            .run(
                "Edit",
                json!({"file_path": "greek.txt", "old_string": "beta", "new_string": "BETA"}),
            )
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(result["replaced"], true);
        assert_eq!(result["path"], path.display().to_string());
        assert_eq!(fs::read_to_string(&path).unwrap(), "alpha\nBETA\ngamma\n");

        // Omitted new_string deletes
        let result = sb
            .run("Edit", json!({"file_path": "greek.txt", "old_string": "BETA\n"}))
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(fs::read_to_string(&path).unwrap(), "alpha\ngamma\n");
    }

    #[tokio::test]
    async fn test_edit_errors() {
        let sb = create_sandbox();
        let path = sb.wd().join("x.txt");
        fs::write(&path, "content").unwrap();

        let result = sb
            .run("Edit", json!({"file_path": "x.txt", "old_string": "absent"}))
            .await;
        assert_eq!(result["error"], "old_string not found in file");
        assert_eq!(result["suggestion"], "Check exact whitespace and characters");
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");

        let result = sb
            .run("Edit", json!({"file_path": "nope.txt", "old_string": "a"}))
            .await;
        assert_eq!(result["error"], "File not found: nope.txt");

        let result = sb
            .run("Edit", json!({"file_path": "x.txt", "old_string": ""}))
            .await;
        assert_eq!(result["error"], "No old_string provided");
    }
}

#[cfg(test)]
mod bash_tests {
    use super::*;

    #[tokio::test]
    async fn test_bash_echo() {
        let sb = create_sandbox();

        let result = sb.run("Bash", json!({"command": "echo safe"})).await;
        assert_eq!(result["stdout"], "safe\n");
        assert_eq!(result["stderr"], Value::Null);
        assert_eq!(result["returncode"], 0);
        assert_eq!(result["success"], true);
        assert_eq!(result["truncated"], false);
    }

    /// Test bash with non-zero exit code
    #[tokio::test]
    async fn test_bash_error_exit() {
        let sb = create_sandbox();

        let result = sb
            .run("Bash", json!({"command": "echo oops >&2; exit 3"}))
            .await;
        assert_eq!(result["returncode"], 3);
        assert_eq!(result["success"], false);
        assert_eq!(result["stderr"], "oops\n");
        assert_eq!(result["stdout"], "");
        assert!(result.get("error").is_none());
    }

    #[tokio::test]
    async fn test_bash_blocked() {
        let sb = create_sandbox();

        let result = sb.run("Bash", json!({"command": "sudo rm /tmp/x"})).await;
        assert_eq!(
            result["error"],
            "Command blocked for safety: contains 'sudo rm'"
        );
        assert_eq!(result["blocked"], true);

        let result = sb
            .run("Bash", json!({"command": "sudo rm -rf /tmp/x"}))
            .await;
        assert_eq!(result["blocked"], true);
    }

    /// Every pattern blocks regardless of case, before anything runs
    #[tokio::test]
    async fn test_bash_blocked_any_case_without_side_effects() {
        let sb = create_sandbox();

        for pattern in DEFAULT_DANGEROUS_PATTERNS {
            let marker = sb.wd().join("marker");
            let command = format!("touch {} && {}", marker.display(), pattern.to_uppercase());
            let result = sb.run("Bash", json!({"command": command})).await;
            assert_eq!(result["blocked"], true, "not blocked: {command}");
            assert!(!marker.exists(), "side effect from: {command}");
        }
    }

    #[tokio::test]
    async fn test_bash_truncates_output() {
        let sb = create_sandbox();

        let result = sb
            .run(
                "Bash",
                json!({"command": r"head -c 10050 /dev/zero | tr '\0' a; head -c 3000 /dev/zero | tr '\0' e >&2"}),
            )
            .await;
        assert_eq!(result["stdout"].as_str().unwrap().len(), 10_000);
        assert_eq!(result["stderr"].as_str().unwrap().len(), 2_000);
        assert_eq!(result["truncated"], true);
        assert_eq!(result["success"], true);
    }

    /// Commands run in the working directory with HOME forced
    #[tokio::test]
    async fn test_bash_environment() {
        let sb = create_sandbox();

        let result = sb.run("Bash", json!({"command": "pwd -P"})).await;
        assert_eq!(result["stdout"], format!("{}\n", sb.wd().display()));

        let result = sb
            .run("Bash", json!({"command": "printf %s \"$HOME\""}))
            .await;
        assert_eq!(result["stdout"], sb.home().display().to_string());
    }

    /// Timed-out commands are killed along with their children
    #[tokio::test]
    async fn test_bash_timeout() {
        let sb = sandbox_with(|config| config.limits.command_timeout_secs = 1);
        let marker = sb.wd().join("late");

        let command = format!("sleep 3; touch {}", marker.display());
        let result = sb.run("Bash", json!({"command": command})).await;
        assert_eq!(result["error"], "Command timed out after 1 seconds");
        assert_eq!(result["timeout"], true);
        assert!(result.get("stdout").is_none());

        tokio::time::sleep(std::time::Duration::from_millis(3500)).await;
        assert!(!marker.exists(), "timed-out command kept running");
    }

    #[tokio::test]
    async fn test_bash_missing_command() {
        let sb = create_sandbox();

        let result = sb.run("Bash", json!({"command": ""})).await;
        assert_eq!(result["error"], "No command provided");
    }
}

#[cfg(test)]
mod search_tests {
    use super::*;

    /// More matches than the cap: exactly the cap, flagged truncated
    #[tokio::test]
    async fn test_glob_truncates_at_cap() {
        let sb = create_sandbox();
        let dir = sb.wd().join("many");
        fs::create_dir(&dir).unwrap();
        for i in 0..150 {
            fs::write(dir.join(format!("file{i:03}.txt")), "x").unwrap();
        }

        let result = sb
            .run(
                "Glob",
                json!({"pattern": "*.txt", "path": dir.display().to_string()}),
            )
            .await;
        assert_eq!(result["total"], 100);
        assert_eq!(result["files"].as_array().unwrap().len(), 100);
        assert_eq!(result["directories"], json!([]));
        assert_eq!(result["truncated"], true);
    }

    #[tokio::test]
    async fn test_glob_under_cap() {
        let sb = create_sandbox();
        for name in ["a.txt", "b.txt", "c.txt", "d.md"] {
            fs::write(sb.wd().join(name), "x").unwrap();
        }
        fs::create_dir(sb.wd().join("sub.txt")).unwrap();

        // Defaults to the working directory
        let result = sb.run("Glob", json!({"pattern": "*.txt"})).await;
        assert_eq!(result["total"], 4);
        assert_eq!(result["files"].as_array().unwrap().len(), 3);
        assert_eq!(
            result["directories"],
            json!([sb.wd().join("sub.txt").display().to_string()])
        );
        assert_eq!(result["truncated"], false);
    }

    #[tokio::test]
    async fn test_glob_recursive() {
        let sb = create_sandbox();
        fs::create_dir_all(sb.wd().join("src/lib")).unwrap();
        fs::write(sb.wd().join("src/main.rs"), "").unwrap();
        fs::write(sb.wd().join("src/lib/mod.rs"), "").unwrap();
        fs::write(sb.wd().join("README.md"), "").unwrap();

        let result = sb.run("Glob", json!({"pattern": "**/*.rs", "path": "."})).await;
        let files: Vec<_> = result["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_str().unwrap().to_string())
            .collect();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.ends_with(".rs")));
    }

    #[tokio::test]
    async fn test_glob_errors() {
        let sb = create_sandbox();

        let result = sb.run("Glob", json!({"pattern": "*", "path": "nope"})).await;
        assert_eq!(result["error"], "Path not found: nope");

        let result = sb.run("Glob", json!({"path": "."})).await;
        assert_eq!(result["error"], "No pattern provided");

        let result = sb.run("Glob", json!({"pattern": "[", "path": "."})).await;
        assert!(
            result["error"].as_str().unwrap().starts_with("Glob failed:"),
            "{result}"
        );
    }

    #[tokio::test]
    async fn test_grep_no_matches() {
        let sb = create_sandbox();
        fs::write(sb.wd().join("a.txt"), "hello").unwrap();

        let result = sb.run("Grep", json!({"pattern": "zzz_not_there"})).await;
        assert_eq!(result["count"], 0);
        assert_eq!(result["matches"], json!([]));
        assert_eq!(result["pattern"], "zzz_not_there");
        assert_eq!(result["path"], sb.wd().display().to_string());
    }

    #[tokio::test]
    async fn test_grep_lists_matching_files() {
        let sb = create_sandbox();
        fs::create_dir(sb.wd().join("nested")).unwrap();
        fs::write(sb.wd().join("one.txt"), "a needle here\nand another needle").unwrap();
        fs::write(sb.wd().join("nested/two.txt"), "needle").unwrap();
        fs::write(sb.wd().join("three.txt"), "haystack").unwrap();

        let result = sb.run("Grep", json!({"pattern": "needle", "path": "."})).await;
        assert_eq!(result["count"], 2);
        let mut matches: Vec<_> = result["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m.as_str().unwrap().to_string())
            .collect();
        matches.sort();
        assert_eq!(
            matches,
            [
                sb.wd().join("nested/two.txt").display().to_string(),
                sb.wd().join("one.txt").display().to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_grep_caps_matches() {
        let sb = create_sandbox();
        for i in 0..60 {
            fs::write(sb.wd().join(format!("m{i}.txt")), "match me").unwrap();
        }

        let result = sb.run("Grep", json!({"pattern": "match"})).await;
        assert_eq!(result["count"], 50);
        assert_eq!(result["matches"].as_array().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_grep_errors() {
        let sb = create_sandbox();

        let result = sb.run("Grep", json!({"pattern": "x", "path": "nope"})).await;
        assert_eq!(result["error"], "Path not found: nope");

        let result = sb.run("Grep", json!({})).await;
        assert_eq!(result["error"], "No pattern provided");
    }

    /// An unreadable file neither hides matches nor turns "no match" into an error
    #[tokio::test]
    async fn test_grep_skips_unreadable_files() {
        if running_as_root() {
            return;
        }
        let sb = create_sandbox();
        fs::write(sb.wd().join("a.txt"), "hello").unwrap();
        let locked = sb.wd().join("secret.txt");
        fs::write(&locked, "hello").unwrap();
        set_mode(&locked, 0o000);

        let none = sb.run("Grep", json!({"pattern": "zzz_not_there"})).await;
        let some = sb.run("Grep", json!({"pattern": "hello"})).await;

        set_mode(&locked, 0o644);

        assert!(none.get("error").is_none(), "{none}");
        assert_eq!(none["count"], 0);
        assert_eq!(none["matches"], json!([]));
        assert_eq!(some["count"], 1);
        assert_eq!(
            some["matches"],
            json!([sb.wd().join("a.txt").display().to_string()])
        );
    }

    #[tokio::test]
    async fn test_grep_invalid_pattern() {
        let sb = create_sandbox();
        fs::write(sb.wd().join("a.txt"), "hello").unwrap();

        let result = sb.run("Grep", json!({"pattern": "["})).await;
        let error = result["error"].as_str().unwrap();
        assert!(error.starts_with("Search failed:"), "{error}");
    }

    struct StuckSearch;

    #[async_trait]
    impl ContentSearchProvider for StuckSearch {
        async fn search(&self, _pattern: &str, _root: &Path) -> executor::Result<Vec<String>> {
            Err(ExecutorError::SearchTimeout)
        }
    }

    #[tokio::test]
    async fn test_grep_timeout() {
        let sb = create_sandbox();
        let executor = sb.executor.with_content_search(Arc::new(StuckSearch));

        let result = executor
            .execute(&ToolCall::new("Grep", json!({"pattern": "x"})))
            .await
            .to_value();
        assert_eq!(result["error"], "Search timed out");
        assert_eq!(result["timeout"], true);
    }
}
