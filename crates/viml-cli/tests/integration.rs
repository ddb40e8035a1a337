//! Integration tests for the `viml` binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn viml(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_viml"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn viml");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("viml output")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn test_parse_expr_prints_json() {
    let output = viml(&["parse-expr", "1 + 2 * 3"], "");
    assert!(output.status.success(), "{}", stderr(&output));
    let tree: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json tree");
    let add = &tree["kind"]["add"];
    assert_eq!(add[0]["kind"]["decimal_number"], serde_json::json!(1));
    assert_eq!(add[1]["kind"]["multiply"][1]["kind"]["decimal_number"], serde_json::json!(3));
}

#[test]
fn test_print_expr_normalises_spacing() {
    let output = viml(&["print-expr", "1+2*3"], "");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1 + 2 * 3\n");
}

#[test]
fn test_expression_error_has_code_and_column() {
    let output = viml(&["parse-expr", "[1, 2"], "");
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.starts_with("<expr>:1:"), "{err}");
    assert!(err.contains("E697"), "{err}");
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn test_parse_script_from_stdin() {
    let output = viml(&["parse", "-"], "let g:x = 1\necho g:x\n");
    assert!(output.status.success(), "{}", stderr(&output));
    let commands: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json commands");
    assert_eq!(commands.as_array().map(Vec::len), Some(2));
    assert_eq!(commands[1]["position"]["line"], serde_json::json!(2));
}

#[test]
fn test_parse_error_reports_line() {
    let output = viml(&["parse", "-"], "echo 1\nwhile 1\n");
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.starts_with("-:2:"), "{err}");
    assert!(err.contains("E170: Missing :endwhile"), "{err}");
}

#[test]
fn test_translate_to_stdout() {
    let output = viml(&["translate", "-", "--stdout"], "let g:x = 1\n");
    assert!(output.status.success(), "{}", stderr(&output));
    let code = stdout(&output);
    assert!(code.starts_with("local vim = require(\"vim\")\n"));
    assert!(code.contains("-- 1:1:let\n"));
    assert!(code.contains("vim.var.set(state, 1, state.g, \"x\")"));
}

#[test]
fn test_translate_flags_override_defaults() {
    let output = viml(
        &["translate", "-", "--stdout", "--no-positions", "--runtime-module", "rt"],
        "let g:x = 1\n",
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let code = stdout(&output);
    assert!(code.starts_with("local vim = require(\"rt\")\n"));
    assert!(!code.contains("--"));
}

#[test]
fn test_translate_with_config_file() {
    let dir = std::env::temp_dir().join(format!("viml-cli-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let config = dir.join("viml.toml");
    std::fs::write(&config, "[translate]\nindent = 4\nemit_positions = false\n").expect("write config");
    let config = config.to_string_lossy().into_owned();

    let output = viml(
        &["translate", "-", "--stdout", "--config", &config],
        "if 1\n  echo 1\nendif\n",
    );
    std::fs::remove_dir_all(&dir).ok();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("\n    vim.commands.echo(state, \"2:3:echo\", \"echo\", 1)\n"));
}

#[test]
fn test_translate_rejects_break_outside_loop() {
    let output = viml(&["translate", "-", "--stdout"], "echo 1\nbreak\n");
    assert!(!output.status.success());
    assert_eq!(stderr(&output).trim_end(), "-:2:1: E587: :break without :while or :for");
}
