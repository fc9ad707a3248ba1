use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::{Result, RewriteError};
use crate::identity::{Identity, parse_author_line};

/// Environment variable carrying the full hashes the sequence editor must stop at.
pub const TARGETS_ENV: &str = "GIT_AUTHOR_REWRITE_TARGETS";

/// Builds the value for the `GIT_SEQUENCE_EDITOR` environment variable.
///
/// Wraps `exe_path` in quotes if it contains spaces, and appends the `--sequence-editor`
/// argument. Git appends the todo file path when it runs the editor.
///
/// # Examples
///
/// ```ignore
/// let path = "/usr/local/bin/git-author-rewrite";
/// assert_eq!(
///     build_sequence_editor_env(path),
///     "/usr/local/bin/git-author-rewrite --sequence-editor"
/// );
/// ```
pub(crate) fn build_sequence_editor_env(exe_path: &str) -> String {
    let quoted = if exe_path.contains(' ') {
        format!("\"{}\"", exe_path)
    } else {
        exe_path.to_string()
    };

    format!("{quoted} --sequence-editor")
}

/// Renders a command as `git <args...>` for error messages and logs.
fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Runs a command with captured output and returns the raw [`Output`].
///
/// Only a failure to spawn is an error here; the exit status is left to the caller.
fn run_raw(mut cmd: Command) -> Result<(String, Output)> {
    let command = describe(&cmd);
    debug!(%command, "running git");

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    match cmd.output() {
        Ok(out) => Ok((command, out)),
        Err(source) => Err(RewriteError::Spawn { command, source }),
    }
}

/// Runs a command and returns its trimmed standard output on success.
///
/// A non-zero exit becomes [`RewriteError::CommandFailed`] carrying the
/// trimmed standard error.
fn run_output(cmd: Command) -> Result<String> {
    let (command, out) = run_raw(cmd)?;

    if out.status.success() {
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        debug!(%command, %stderr, "git failed");
        Err(RewriteError::CommandFailed { command, stderr })
    }
}

/// Handle on a single repository.
///
/// Every invocation is run as `git -C <repo> ...`, so the process working
/// directory is never changed.
#[derive(Debug, Clone)]
pub struct Git {
    repo: PathBuf,
}

impl Git {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// The path this handle was created with.
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.repo);
        cmd
    }

    /// Runs `git rev-parse <flag>` and returns its output.
    pub fn rev_parse(&self, flag: &str) -> Result<String> {
        let mut cmd = self.command();
        cmd.arg("rev-parse").arg(flag);
        run_output(cmd)
    }

    /// Runs `git config --get <key>`.
    ///
    /// A missing key is not an error: it yields an empty string.
    pub fn config_get(&self, key: &str) -> String {
        let mut cmd = self.command();
        cmd.arg("config").arg("--get").arg(key);
        run_output(cmd).unwrap_or_default()
    }

    /// Returns the commit HEAD points at, or `None` on an unborn branch.
    pub fn head_commit(&self) -> Result<Option<String>> {
        let mut cmd = self.command();
        cmd.args(["rev-parse", "--verify", "--quiet", "HEAD^{commit}"]);
        let (_, out) = run_raw(cmd)?;

        if out.status.success() {
            Ok(Some(String::from_utf8_lossy(&out.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }

    /// Short name of the checked-out branch (`HEAD` when detached).
    pub fn current_branch(&self) -> Result<String> {
        let mut cmd = self.command();
        cmd.args(["rev-parse", "--abbrev-ref", "HEAD"]);
        run_output(cmd)
    }

    /// Returns `true` when `git status --porcelain` reports nothing.
    pub fn worktree_is_clean(&self) -> Result<bool> {
        let mut cmd = self.command();
        cmd.args(["status", "--porcelain", "--untracked-files=no"]);
        Ok(run_output(cmd)?.is_empty())
    }

    /// Lists commit hashes as printed by `git log --pretty=format:%H`, newest first.
    ///
    /// This runs:
    ///
    /// ```text
    /// git -C <repo> log --all --pretty=format:%H
    /// ```
    ///
    /// or `git log HEAD ...` when `all_refs` is `false`.
    ///
    /// # Parameters
    ///
    /// * `all_refs` – If `true`, list every commit reachable from any reference.
    ///   If `false`, only commits reachable from HEAD.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` with full hashes, newest first. Blank lines are dropped.
    /// * `Err(RewriteError::CommandFailed)` if `git log` exits non-zero
    ///   (for example on an unborn branch).
    ///
    /// # Notes
    ///
    /// * Callers that process history oldest first must reverse the list.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Ignored because it requires a Git repository.
    /// use git_author_rewrite::git::Git;
    ///
    /// let git = Git::new(".");
    /// let mut commits = git.list_commits(true)?;
    /// commits.reverse();
    /// ```
    pub fn list_commits(&self, all_refs: bool) -> Result<Vec<String>> {
        let mut cmd = self.command();
        cmd.arg("log");
        if all_refs {
            cmd.arg("--all");
        } else {
            cmd.arg("HEAD");
        }
        cmd.arg("--pretty=format:%H");

        let out = run_output(cmd)?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Reads the recorded author of `commit`.
    ///
    /// Output that cannot be split into name and email yields `Ok(None)`.
    pub fn show_author(&self, commit: &str) -> Result<Option<Identity>> {
        let mut cmd = self.command();
        cmd.args(["show", "-s", "--format=%an%x1f%ae", commit]);
        let out = run_output(cmd)?;
        Ok(parse_author_line(&out))
    }

    /// Reads the committer date of `commit` in `%ci` form
    /// (`2024-01-02 03:04:05 +0100`), which `GIT_COMMITTER_DATE` accepts as-is.
    pub fn committer_date(&self, commit: &str) -> Result<String> {
        let mut cmd = self.command();
        cmd.args(["show", "-s", "--format=%ci", commit]);
        run_output(cmd)
    }

    /// Returns whether `ancestor` is reachable from `descendant`.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let mut cmd = self.command();
        cmd.args(["merge-base", "--is-ancestor", ancestor, descendant]);
        let (command, out) = run_raw(cmd)?;

        match out.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(RewriteError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
        }
    }

    /// Starts an interactive rebase of the whole branch that stops only at `targets`.
    ///
    /// Internally, this executes:
    ///
    /// ```text
    /// git -C <repo> rebase -i --root --rebase-merges --no-autosquash
    /// ```
    ///
    /// `GIT_SEQUENCE_EDITOR` is set so that this executable rewrites the todo
    /// list itself, marking the commits listed in [`TARGETS_ENV`] for editing.
    ///
    /// # Parameters
    ///
    /// * `targets` – Full hashes of the commits the rebase must stop at.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the rebase reached its first stop (or finished).
    /// * `Err(RewriteError)` if the executable could not be located or
    ///   `git rebase` exited with a non-zero status.
    ///
    /// # Notes
    ///
    /// * `--no-autosquash` keeps a `rebase.autosquash` config from reordering
    ///   and folding `fixup!`/`squash!` commits; the todo list must replay
    ///   the history unchanged apart from the stops.
    /// * `--rebase-merges` keeps merge commits instead of flattening them.
    /// * This rewrites history; the working tree must be clean.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Ignored because it requires a Git repository.
    /// use git_author_rewrite::git::Git;
    ///
    /// let git = Git::new(".");
    /// git.rebase_interactive(&["3f2a...".to_string()])?;
    /// ```
    pub fn rebase_interactive(&self, targets: &[String]) -> Result<()> {
        let exe = std::env::current_exe().map_err(|source| RewriteError::Spawn {
            command: String::from("current executable lookup"),
            source,
        })?;

        run_output(self.rebase_command(&exe.to_string_lossy(), targets)).map(|_| ())
    }

    fn rebase_command(&self, exe_path: &str, targets: &[String]) -> Command {
        let mut cmd = self.command();
        cmd.args(["rebase", "-i", "--root", "--rebase-merges", "--no-autosquash"]);
        cmd.env("GIT_SEQUENCE_EDITOR", build_sequence_editor_env(exe_path));
        cmd.env(TARGETS_ENV, targets.join(" "));
        cmd
    }

    /// Amends the commit at the tip, replacing its author without changing the message.
    ///
    /// This runs:
    ///
    /// ```text
    /// GIT_COMMITTER_DATE=<committer_date> \
    ///     git -C <repo> commit --amend --no-edit --allow-empty --no-verify --author="<author>"
    /// ```
    ///
    /// # Parameters
    ///
    /// * `author` – The identity to record as author.
    /// * `committer_date` – The date to force as committer date, usually the
    ///   pre-rewrite `%ci` value of the same commit.
    /// * `set_committer` – If `true`, `GIT_COMMITTER_NAME`/`GIT_COMMITTER_EMAIL`
    ///   are also set to `author`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the commit was amended.
    /// * `Err(RewriteError::CommandFailed)` with git's stderr otherwise.
    ///
    /// # Notes
    ///
    /// * Only ever touches the tip; during the rebase loop the tip is the
    ///   commit the rebase stopped at.
    /// * `--allow-empty` keeps empty commits amendable and `--no-verify`
    ///   skips commit hooks.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Ignored because it requires a Git repository with a commit to amend.
    /// use git_author_rewrite::{git::Git, identity::Identity};
    ///
    /// let git = Git::new(".");
    /// let author = Identity::new("Jane Doe", "jane@example.com");
    /// git.amend_head(&author, "2021-01-01 10:00:00 +0000", false)?;
    /// ```
    pub fn amend_head(
        &self,
        author: &Identity,
        committer_date: &str,
        set_committer: bool,
    ) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["commit", "--amend", "--no-edit", "--allow-empty", "--no-verify"])
            .arg(format!("--author={}", author));
        cmd.env("GIT_COMMITTER_DATE", committer_date);
        if set_committer {
            cmd.env("GIT_COMMITTER_NAME", &author.name);
            cmd.env("GIT_COMMITTER_EMAIL", &author.email);
        }
        run_output(cmd).map(|_| ())
    }

    /// Continues an in-progress rebase up to its next stop or the end.
    pub fn rebase_continue(&self) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["rebase", "--continue"]);
        cmd.env("GIT_EDITOR", "true");
        run_output(cmd).map(|_| ())
    }

    /// Aborts an in-progress rebase, restoring the original branch.
    pub fn rebase_abort(&self) -> Result<()> {
        let mut cmd = self.command();
        cmd.args(["rebase", "--abort"]);
        run_output(cmd).map(|_| ())
    }
}

/// Detects if a Git rebase is currently in progress.
///
/// Checks for the `rebase-merge` or `rebase-apply` directory inside `git_dir`.
pub fn rebase_in_progress(git_dir: &Path) -> bool {
    git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists()
}

/// Returns the original hash (as written in the todo list) of the last commit
/// the running rebase replayed.
///
/// Reads `rebase-merge/done`; `None` if no commit has been replayed yet.
pub fn last_replayed_commit(git_dir: &Path) -> Option<String> {
    let done = read_to_string(git_dir.join("rebase-merge").join("done")).ok()?;
    done.lines()
        .rev()
        .find_map(replayed_commit)
        .map(str::to_string)
}

/// Extracts the commit a todo line replays, if any.
///
/// Handles `pick`/`edit` (and their one-letter forms) and `merge -C`/`-c`.
fn replayed_commit(line: &str) -> Option<&str> {
    let mut words = line.split_whitespace();

    match words.next()? {
        "pick" | "p" | "edit" | "e" => words.next(),
        "merge" | "m" => match words.next()? {
            "-C" | "-c" => words.next(),
            _ => None,
        },
        _ => None,
    }
}
