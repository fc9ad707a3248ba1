//! Applies a [`RewritePlan`] to the repository.
//!
//! The checked-out branch is replayed with an interactive rebase that stops
//! only at the planned commits. At every stop the tip is the planned commit,
//! so amending the tip rewrites exactly the commit that was inspected.

use std::path::PathBuf;

use console::style;
use tracing::{debug, error, info};

use crate::error::{Result, RewriteError};
use crate::git::{self, Git};
use crate::identity::Identity;
use crate::plan::{RewritePlan, short_hash};

/// The operations the stop loop needs from a rebase.
pub trait RebaseDriver {
    /// Starts a rebase that stops after replaying each of `targets`.
    fn start(&mut self, targets: &[String]) -> Result<()>;

    fn in_progress(&self) -> bool;

    /// Original hash (possibly abbreviated) of the commit the rebase is stopped at.
    fn current_stop(&self) -> Option<String>;

    /// Amends the commit at the tip.
    fn amend(&mut self, author: &Identity, committer_date: &str) -> Result<()>;

    /// Moves on to the next stop.
    fn resume(&mut self) -> Result<()>;

    fn abort(&mut self) -> Result<()>;
}

/// [`RebaseDriver`] backed by the `git` CLI.
pub struct GitRebase<'a> {
    git: &'a Git,
    git_dir: PathBuf,
    set_committer: bool,
}

impl<'a> GitRebase<'a> {
    pub fn new(git: &'a Git, git_dir: PathBuf, set_committer: bool) -> Self {
        Self {
            git,
            git_dir,
            set_committer,
        }
    }
}

impl RebaseDriver for GitRebase<'_> {
    fn start(&mut self, targets: &[String]) -> Result<()> {
        self.git.rebase_interactive(targets)
    }

    fn in_progress(&self) -> bool {
        git::rebase_in_progress(&self.git_dir)
    }

    fn current_stop(&self) -> Option<String> {
        git::last_replayed_commit(&self.git_dir)
    }

    fn amend(&mut self, author: &Identity, committer_date: &str) -> Result<()> {
        self.git.amend_head(author, committer_date, self.set_committer)
    }

    fn resume(&mut self) -> Result<()> {
        self.git.rebase_continue()
    }

    fn abort(&mut self) -> Result<()> {
        self.git.rebase_abort()
    }
}

/// Outcome of a completed rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub amended: usize,
}

/// Rewrites every commit the plan marks, then returns how many were amended.
///
/// Nothing is started when the plan has no rewrites. If anything fails after
/// the rebase has started, the rebase is aborted before the error is returned
/// so the branch is left as it was.
pub fn execute<D: RebaseDriver>(
    driver: &mut D,
    plan: &RewritePlan,
    target: &Identity,
) -> Result<RewriteReport> {
    let rewrites = plan.rewrites();
    if rewrites.is_empty() {
        return Ok(RewriteReport::default());
    }

    let mut report = RewriteReport::default();

    if let Err(e) = drive(driver, &rewrites, target, &mut report) {
        if driver.in_progress() {
            error!("rewrite failed, aborting rebase");
            if let Err(abort_err) = driver.abort() {
                error!(error = %abort_err, "`git rebase --abort` failed");
            }
        }
        return Err(e);
    }

    Ok(report)
}

/// Starts the rebase and amends every stop until it finishes.
fn drive<D: RebaseDriver>(
    driver: &mut D,
    rewrites: &[(&str, &str)],
    target: &Identity,
    report: &mut RewriteReport,
) -> Result<()> {
    let hashes: Vec<String> = rewrites.iter().map(|(c, _)| c.to_string()).collect();
    driver.start(&hashes)?;

    while driver.in_progress() {
        let stop = driver.current_stop().unwrap_or_default();
        debug!(%stop, "rebase stopped");

        let (commit, committer_date) = find_target(rewrites, &stop)
            .ok_or_else(|| RewriteError::UnexpectedStop {
                commit: stop.clone(),
            })?;

        driver.amend(target, committer_date)?;
        report.amended += 1;
        info!(%commit, %committer_date, "amended commit");
        println!(
            "\nRewriting commit {}",
            style(short_hash(commit)).yellow()
        );
        println!("  {} {}", style("Updated to:").green(), target);

        driver.resume()?;
    }

    Ok(())
}

/// Finds the planned commit a (possibly abbreviated) stop hash refers to.
fn find_target<'p>(rewrites: &[(&'p str, &'p str)], stop: &str) -> Option<(&'p str, &'p str)> {
    if stop.is_empty() {
        return None;
    }
    rewrites
        .iter()
        .copied()
        .find(|(commit, _)| commit.starts_with(stop) || stop.starts_with(commit))
}
