use std::{
    fs::{File, read_to_string},
    io::Write,
    path::Path,
};

use tracing::debug;

use crate::error::{Result, RewriteError};

/// Entry point when git runs us as `GIT_SEQUENCE_EDITOR`.
///
/// `targets` is the whitespace-separated list of full hashes to stop at,
/// as passed through [`crate::git::TARGETS_ENV`].
pub fn run(todo_path: Option<&Path>, targets: &str) -> Result<()> {
    let targets: Vec<&str> = targets.split_whitespace().collect();

    match todo_path {
        Some(p) => rewrite(p, &targets),
        None => Err(RewriteError::SequenceEditor(String::from(
            "missing todo file path",
        ))),
    }
}

/// Reads the todo file at `path`, marks the lines replaying one of `targets`
/// so the rebase stops after them, and writes the result back.
pub fn rewrite(path: &Path, targets: &[&str]) -> Result<()> {
    let body = read_to_string(path)
        .map_err(|e| RewriteError::SequenceEditor(format!("read failed: {}", e)))?;

    let transformed = transform(&body, targets);

    let mut file = File::create(path)
        .map_err(|e| RewriteError::SequenceEditor(format!("create failed: {}", e)))?;
    file.write_all(transformed.as_bytes())
        .map_err(|e| RewriteError::SequenceEditor(format!("write failed: {}", e)))
}

/// Rewrites a whole todo list; the output always ends with a newline.
fn transform(body: &str, targets: &[&str]) -> String {
    let mut out: Vec<String> = Vec::new();

    for line in body.lines() {
        out.extend(transform_line(line, targets));
    }

    out.join("\n") + "\n"
}

/// Converts a single todo line into one or two lines.
///
/// - Comment lines are returned unchanged.
/// - `pick <hash>` for a targeted hash becomes `edit <hash>`, keeping indentation.
/// - `merge -C <hash>` for a targeted hash is followed by a `break` line,
///   since merges cannot be marked `edit`.
/// - Everything else is returned as-is.
fn transform_line(line: &str, targets: &[&str]) -> Vec<String> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    if trimmed.starts_with('#') {
        return vec![line.to_string()];
    }

    let mut words = trimmed.split_whitespace();
    match words.next() {
        Some(cmd @ ("pick" | "p")) => match words.next() {
            Some(hash) if is_target(hash, targets) => {
                debug!(%hash, "marking commit for edit");
                let rest = &trimmed[cmd.len()..];
                return vec![format!("{}edit{}", indent, rest)];
            }
            _ => {}
        },
        Some("merge" | "m") => match (words.next(), words.next()) {
            (Some("-C" | "-c"), Some(hash)) if is_target(hash, targets) => {
                debug!(%hash, "adding break after merge");
                return vec![line.to_string(), format!("{}break", indent)];
            }
            _ => {}
        },
        _ => {}
    }

    vec![line.to_string()]
}

/// A todo hash is usually abbreviated; match it by prefix in either direction.
fn is_target(hash: &str, targets: &[&str]) -> bool {
    !hash.is_empty()
        && targets
            .iter()
            .any(|t| t.starts_with(hash) || hash.starts_with(t))
}
