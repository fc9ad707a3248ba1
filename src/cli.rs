use std::path::{Path, PathBuf};

use clap::Parser;
use console::style;
use tracing::{debug, info};

use crate::banner::print_banner;
use crate::error::{Result, RewriteError};
use crate::git::{self, Git};
use crate::identity::Identity;
use crate::plan::{GitSource, build_plan};
use crate::prompt;
use crate::rewrite::{GitRebase, execute};
use crate::sequence_editor;

/// Rewrite commit authors across a Git repository's history.
///
/// Every commit whose author differs from the target identity is rewritten in
/// place, oldest first. Commit messages and committer dates are preserved.
#[derive(Debug, Parser)]
#[command(name = "git-author-rewrite", version, about, long_about = None)]
pub struct Cli {
    /// Repository to operate on
    #[arg(short = 'C', long = "repo", value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Target author name (prompted for when missing)
    #[arg(long, env = "GIT_AUTHOR_REWRITE_NAME")]
    pub name: Option<String>,

    /// Target author email (prompted for when missing)
    #[arg(long, env = "GIT_AUTHOR_REWRITE_EMAIL")]
    pub email: Option<String>,

    /// Only inspect commits reachable from HEAD instead of every reference
    #[arg(long)]
    pub head_only: bool,

    /// Also set the committer name and email to the target identity
    #[arg(long)]
    pub committer: bool,

    /// Show what would be rewritten without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Rewrite a rebase todo file (used internally as GIT_SEQUENCE_EDITOR)
    #[arg(long, value_name = "TODO", hide = true)]
    pub sequence_editor: Option<PathBuf>,
}

/// Repository paths needed for the rewrite operation.
struct RepoPaths {
    root: PathBuf,
    git_dir: PathBuf,
}

/// Verifies git is available and the target is a repository we can rewrite.
fn verify_environment(git: &Git) -> Result<RepoPaths> {
    which::which("git").map_err(|_| RewriteError::GitNotFound)?;

    let root = git
        .rev_parse("--show-toplevel")
        .map(PathBuf::from)
        .map_err(|e| RewriteError::NotARepository {
            path: git.repo().to_path_buf(),
            stderr: match e {
                RewriteError::CommandFailed { stderr, .. } => stderr,
                other => other.to_string(),
            },
        })?;

    let git_dir = PathBuf::from(git.rev_parse("--absolute-git-dir")?);
    debug!(root = %root.display(), git_dir = %git_dir.display(), "resolved repository");

    if git::rebase_in_progress(&git_dir) {
        return Err(RewriteError::RebaseInProgress);
    }

    Ok(RepoPaths { root, git_dir })
}

fn repo_name(root: &Path) -> String {
    root.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("current repository")
        .to_string()
}

/// Main CLI entry point for `git-author-rewrite`.
///
/// 1. Handles the internal `--sequence-editor` invocation.
/// 2. Verifies `git` and the repository, refusing a dirty tree or a running rebase.
/// 3. Resolves the target identity from flags, environment or prompts.
/// 4. Builds the oldest-first plan and prints the banner.
/// 5. Unless dry-running or there is nothing to do, confirms and rewrites.
///
/// Returns the process exit code.
pub fn entry(cli: Cli) -> Result<i32> {
    if let Some(todo) = cli.sequence_editor.as_deref() {
        let targets = std::env::var(git::TARGETS_ENV).unwrap_or_default();
        sequence_editor::run(Some(todo), &targets)?;
        return Ok(0);
    }

    let git = Git::new(&cli.repo);
    let paths = verify_environment(&git)?;

    let head = git.head_commit()?.ok_or(RewriteError::NoCommits)?;
    if !cli.dry_run && !git.worktree_is_clean()? {
        return Err(RewriteError::DirtyWorktree);
    }

    let default = Identity::new(git.config_get("user.name"), git.config_get("user.email"));
    let mut string_prompter = prompt::DialoguerStringPrompter;
    let target = prompt::ask_identity(
        &mut string_prompter,
        &repo_name(&paths.root),
        cli.name.as_deref(),
        cli.email.as_deref(),
        &default,
    )
    .map_err(RewriteError::Prompt)?;
    info!(%target, "target identity");

    let source = GitSource::new(&git, !cli.head_only, head);
    let plan = build_plan(&source, &target)?;

    let branch = git.current_branch()?;
    print_banner(&target, &plan, &branch, cli.dry_run);

    let count = plan.rewrite_count();
    if count == 0 {
        let skipped = plan.skipped_count();
        let message = if skipped == 0 {
            String::from("✅ Every commit already has the target author; nothing to do.")
        } else {
            format!(
                "✅ No commit on `{}` needs rewriting; nothing to do ({} skipped).",
                branch, skipped
            )
        };
        println!("{}", style(message).green().bold());
        return Ok(0);
    }

    if cli.dry_run {
        println!(
            "{}",
            style(format!("Dry run: {} commit(s) would be rewritten.", count))
                .cyan()
                .bold()
        );
        return Ok(0);
    }

    if !cli.yes {
        let mut confirm_prompter = prompt::DialoguerConfirmPrompter;
        let confirmed =
            prompt::confirm_start(&mut confirm_prompter, count).map_err(RewriteError::Prompt)?;
        if !confirmed {
            println!(
                "{}",
                style("Canceled by user. No changes made.").yellow().bold()
            );
            return Ok(0);
        }
    }

    let mut driver = GitRebase::new(&git, paths.git_dir, cli.committer);
    let report = execute(&mut driver, &plan, &target)?;

    println!(
        "\n{}",
        style(format!("✅ Done! Rewrote {} commit(s).", report.amended))
            .green()
            .bold()
    );
    println!("Now push with: git push --force-with-lease origin {}", branch);

    Ok(0)
}
