use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("data")
}

fn fictionary() -> Command {
    let mut cmd = Command::cargo_bin("fictionary").unwrap();
    cmd.env_remove("FICTIONARY_DATA_DIR").env_remove("RUST_LOG");
    cmd
}

#[test]
fn prints_requested_number_of_words() {
    let output = fictionary()
        .args(["--no-cache", "-c", "5", "-m", "4", "-x", "9", "-d", "american"])
        .arg("--data-dir")
        .arg(data_dir())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let words: Vec<&str> = stdout.lines().collect();
    assert_eq!(words.len(), 5);
    let real = fs::read_to_string(data_dir().join("words.txt")).unwrap();
    for word in words {
        assert!((4..=9).contains(&word.chars().count()), "{word}");
        assert!(!real.lines().any(|r| r == word), "{word} is a real word");
    }
}

#[test]
fn inverted_lengths_fail_before_loading() {
    fictionary()
        .args(["-m", "12", "-x", "10", "--data-dir", "/nonexistent"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Words cannot have a max-length shorter than their min-length!",
        ));
}

#[test]
fn unknown_dictionary_is_a_usage_error() {
    fictionary()
        .args(["-d", "klingon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("klingon"));
}

#[test]
fn missing_data_reports_the_path() {
    let empty = tempfile::tempdir().unwrap();
    fictionary()
        .arg("--no-cache")
        .arg("--data-dir")
        .arg(empty.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("british.json"));
}

#[test]
fn build_then_generate_from_the_output() {
    let out = tempfile::tempdir().unwrap();
    fictionary()
        .arg("build")
        .arg("--wordlists")
        .arg(data_dir().join("wordlists"))
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("british:"));

    assert!(out.path().join("all.json").is_file());
    fictionary()
        .args(["--no-cache", "-d", "all", "-c", "3"])
        .env("FICTIONARY_DATA_DIR", out.path())
        .assert()
        .success()
        .stdout(predicate::function(|s: &str| s.lines().count() == 3));
}

#[cfg(unix)]
#[test]
fn interrupt_exits_cleanly() {
    use std::process::{Command as Process, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    // stdout is never read, so the process blocks once the pipe fills up
    let mut child = Process::new(assert_cmd::cargo::cargo_bin("fictionary"))
        .args(["--no-cache", "-c", "200000", "-m", "1"])
        .arg("--data-dir")
        .arg(data_dir())
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_secs(2));
    let sent = Process::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(sent.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        assert!(Instant::now() < deadline, "fictionary ignored the interrupt");
        thread::sleep(Duration::from_millis(50));
    };
    assert_eq!(status.code(), Some(0));
}
