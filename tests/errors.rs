use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.timeout(Duration::from_secs(5))
        .env("BF_CONFIG", "/nonexistent/bf.toml")
        .env_remove("BF_FILE")
        .env_remove("BF_MEMORY")
        .env_remove("BF_MAX_STEPS")
        .env_remove("RUST_LOG");
    cmd
}

fn source_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn missing_file_exits_1() {
    cargo_bin()
        .arg("--file").arg("/nonexistent/missing.bf")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unable to open file").and(predicate::str::contains("missing.bf")));
}

#[test]
fn small_memory_exits_2_before_reading_file() {
    // The file does not exist, but the memory check comes first.
    cargo_bin()
        .arg("--memory").arg("1000")
        .arg("--file").arg("/nonexistent/missing.bf")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("memory size is too small").and(predicate::str::contains("1000")));
}

#[test]
fn negative_memory_exits_2() {
    let tf = source_file("++.");
    for args in [["--memory=-5"].as_slice(), ["--memory", "-5"].as_slice()] {
        cargo_bin()
            .args(args)
            .arg("--file").arg(tf.path())
            .assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("memory size is too small").and(predicate::str::contains("-5")));
    }
}

#[test]
fn unallocatable_memory_exits_3() {
    cargo_bin()
        .arg("--memory").arg(i64::MAX.to_string())
        .arg("--file").arg("/nonexistent/missing.bf")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unable to allocate a memory block"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn unclosed_brackets_exit_5() {
    let tf = source_file("[[");
    cargo_bin()
        .arg("--file").arg(tf.path())
        .assert()
        .code(5)
        .stderr(predicate::str::contains("mismatched opening and closing brackets"));
}

#[test]
fn early_closing_bracket_exits_6_with_caret() {
    let tf = source_file("+ ] +");
    cargo_bin()
        .arg("--file").arg(tf.path())
        .assert()
        .code(6)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("closing bracket found before any opening bracket at offset 2"))
        .stderr(predicate::str::contains("  + ] +\n    ^"));
}

#[test]
fn step_limit_exits_9() {
    let tf = source_file("+[]");
    cargo_bin()
        .arg("--max-steps").arg("1000")
        .arg("--file").arg(tf.path())
        .assert()
        .code(9)
        .stderr(predicate::str::contains("step limit exceeded (1000)"));
}

#[test]
fn bad_flag_value_is_a_usage_error() {
    cargo_bin()
        .arg("--memory").arg("lots")
        .assert()
        .code(64);
}

#[test]
fn help_exits_0() {
    cargo_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--memory"));
}
