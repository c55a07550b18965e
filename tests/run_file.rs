use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

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
fn hello_world_prints_exact_bytes() {
    let tf = source_file(HELLO_WORLD);
    cargo_bin()
        .arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn commentary_is_ignored() {
    let tf = source_file("add two: ++ then print it: .\n");
    cargo_bin()
        .arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::eq(&[2u8][..]));
}

#[test]
fn echoes_piped_input() {
    let tf = source_file(">,.");
    cargo_bin()
        .arg("-f").arg(tf.path())
        .write_stdin("A")
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn exhausted_input_leaves_cell_unchanged() {
    let tf = source_file("+++,.");
    cargo_bin()
        .arg("-f").arg(tf.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::eq(&[3u8][..]));
}

#[test]
fn status_lines_go_to_stderr() {
    let tf = source_file("++.");
    cargo_bin()
        .arg("--file").arg(tf.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("BrainFuck Interpreter"))
        .stderr(predicate::str::contains("Initialising memory block : 30000 bytes"))
        .stderr(predicate::str::contains("Executing file"));
}

#[test]
fn quiet_suppresses_status_lines() {
    let tf = source_file("++.");
    cargo_bin()
        .arg("--quiet").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn quiet_has_only_a_long_form() {
    cargo_bin()
        .arg("-q")
        .assert()
        .code(64);
}

#[test]
fn debug_traces_each_step() {
    let tf = source_file("+>");
    cargo_bin()
        .arg("--debug").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ip=0").and(predicate::str::contains("ip=1")));
}

#[test]
fn custom_memory_size_is_accepted() {
    let tf = source_file("<<<+.>>>>");
    cargo_bin()
        .arg("--memory").arg("1001").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::eq(&[1u8][..]));
}
