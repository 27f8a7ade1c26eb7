use std::io::Write;
use std::process::{Command, Output, Stdio};

fn ezasm(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ezasm"))
        .args(args)
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run ezasm!");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

/// Stderr without color codes
fn stderr(output: &Output) -> String {
    let raw = String::from_utf8_lossy(&output.stderr);
    let mut plain = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            chars.by_ref().find(|&c| c == 'm');
        } else {
            plain.push(c);
        }
    }
    plain
}

/// The value of a register in `--print-state` output
fn register(output: &Output, name: &str) -> i64 {
    let stderr = stderr(output);
    let registers = match stderr.split_once("Registers:") {
        Some((_, registers)) => registers,
        None => panic!("no register dump in:\n{stderr}"),
    };

    let needle = format!("${name}");
    let mut words = registers.split_whitespace();
    while let Some(word) = words.next() {
        if word == needle {
            let hex = words.next().unwrap_or_default();
            if hex.len() == 16 {
                if let Ok(value) = u64::from_str_radix(hex, 16) {
                    return value as i64;
                }
            }
        }
    }
    panic!("register {name} not found in:\n{stderr}");
}

#[test]
fn runs_programs_to_completion() {
    let output = ezasm(&["--print-state", "tests/programs/sum.ez"], "");
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Finished in"));
    assert_eq!(register(&output, "t1"), 5050);

    let output = ezasm(&["--print-state", "tests/programs/factorial.ez"], "");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(register(&output, "s0"), 3628800);
}

#[test]
fn faults_exit_with_an_error() {
    let output = ezasm(&["tests/programs/fault.ez"], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Division by zero"));
}

#[test]
fn syntax_errors_point_at_the_line() {
    let output = ezasm(&["tests/programs/syntax.ez"], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("line 2"), "{}", stderr(&output));
}

#[test]
fn interactive_mode_keeps_going_after_errors() {
    let output = ezasm(
        &["--interactive", "--print-state"],
        "li $t0 20\nnope $t0\nadd $t0 $t0 22\n",
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("nope"));
    assert_eq!(register(&output, "t0"), 42);
}

#[test]
fn step_mode() {
    let output = ezasm(
        &["--step", "--print-state", "tests/programs/sum.ez"],
        "\n\n\n",
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(register(&output, "t1"), 100);
}

#[test]
fn missing_file() {
    let output = ezasm(&[], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No file specified"));
}
