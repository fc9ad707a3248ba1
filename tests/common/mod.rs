use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

pub const TARGET_NAME: &str = "Target Person";
pub const TARGET_EMAIL: &str = "target@example.com";

pub const ALICE: (&str, &str) = ("Alice", "alice@example.com");
pub const BOB: (&str, &str) = ("Bob", "bob@example.com");
pub const TARGET: (&str, &str) = (TARGET_NAME, TARGET_EMAIL);

/// Environment that keeps the user's own git configuration out of the tests.
pub const ISOLATED_ENV: &[(&str, &str)] = &[
    ("GIT_CONFIG_NOSYSTEM", "1"),
    ("GIT_CONFIG_GLOBAL", "/dev/null"),
    ("GIT_TERMINAL_PROMPT", "0"),
];

/// Runs git in `dir` and returns trimmed stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .envs(ISOLATED_ENV.iter().copied())
        .envs(env.iter().copied())
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Creates an empty repository on branch `main` with a local identity set.
pub fn setup_git_repo() -> TempDir {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let dir = temp_dir.path();

    git(dir, &["init", "-q"], &[]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"], &[]);
    git(dir, &["config", "user.name", "Fixture Committer"], &[]);
    git(dir, &["config", "user.email", "committer@example.com"], &[]);
    git(dir, &["config", "commit.gpgsign", "false"], &[]);

    temp_dir
}

/// Writes `file`, stages it and commits it as `author` at `date`.
///
/// Both the author and committer dates are set to `date`.
pub fn commit_as(dir: &Path, file: &str, message: &str, author: (&str, &str), date: &str) {
    fs::write(dir.join(file), format!("{message}\n")).expect("failed to write file");
    git(dir, &["add", file], &[]);
    git(
        dir,
        &["commit", "-q", "-m", message],
        &[
            ("GIT_AUTHOR_NAME", author.0),
            ("GIT_AUTHOR_EMAIL", author.1),
            ("GIT_AUTHOR_DATE", date),
            ("GIT_COMMITTER_DATE", date),
        ],
    );
}

/// One line per commit on HEAD, oldest first: `name|email|committer date|subject`.
pub fn history(dir: &Path) -> Vec<String> {
    git(
        dir,
        &["log", "--reverse", "--format=%an|%ae|%ci|%s", "HEAD"],
        &[],
    )
    .lines()
    .map(str::to_string)
    .collect()
}

/// Committer name and email of every commit on HEAD, oldest first.
pub fn committers(dir: &Path) -> Vec<String> {
    git(dir, &["log", "--reverse", "--format=%cn|%ce", "HEAD"], &[])
        .lines()
        .map(str::to_string)
        .collect()
}
