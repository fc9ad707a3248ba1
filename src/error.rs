use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while rewriting history.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// `git` could not be found on `PATH`.
    #[error("`git` not found in PATH")]
    GitNotFound,

    /// The given path is not inside a git work tree.
    #[error("not inside a git repo: {path} ({stderr})")]
    NotARepository { path: PathBuf, stderr: String },

    /// A git process could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A git process exited with a non-zero status.
    #[error("`{command}` exited with non-zero status: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// A rebase was already running before we started.
    #[error("a rebase is already in progress; finish or abort it first")]
    RebaseInProgress,

    /// The work tree has uncommitted changes.
    #[error("working tree has uncommitted changes; commit or stash them first")]
    DirtyWorktree,

    /// HEAD does not point at any commit yet.
    #[error("repository has no commits")]
    NoCommits,

    /// The rebase stopped somewhere we did not ask it to.
    #[error("rebase stopped at unexpected commit {commit}")]
    UnexpectedStop { commit: String },

    /// Interactive prompt failed.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// The todo-list rewrite failed while acting as `GIT_SEQUENCE_EDITOR`.
    #[error("sequence editor error: {0}")]
    SequenceEditor(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, RewriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display() {
        let err = RewriteError::CommandFailed {
            command: "git log".to_string(),
            stderr: "fatal: bad revision".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`git log` exited with non-zero status: fatal: bad revision"
        );
    }

    #[test]
    fn not_a_repository_display() {
        let err = RewriteError::NotARepository {
            path: PathBuf::from("/tmp/nope"),
            stderr: "fatal: not a git repository".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "not inside a git repo: /tmp/nope (fatal: not a git repository)"
        );
    }

    #[test]
    fn spawn_keeps_io_source() {
        use std::error::Error as _;

        let err = RewriteError::Spawn {
            command: "git status".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("git status"));
    }

    #[test]
    fn unexpected_stop_display() {
        let err = RewriteError::UnexpectedStop {
            commit: "abc1234".to_string(),
        };
        assert_eq!(err.to_string(), "rebase stopped at unexpected commit abc1234");
    }
}
