//! Decides, commit by commit, what the rewrite will do.
//!
//! Commits are listed newest first by git and then walked oldest first, so
//! the plan reads in the same order the rebase will replay them.

use console::style;
use tracing::{info, warn};

use crate::error::Result;
use crate::git::Git;
use crate::identity::Identity;

/// Read-only view of the history being planned over.
pub trait CommitSource {
    /// Commit hashes, newest first, exactly as the log listing returns them.
    fn list_commits(&self) -> Result<Vec<String>>;

    /// The recorded author, or `None` when it could not be parsed.
    fn author(&self, commit: &str) -> Result<Option<Identity>>;

    /// The committer date to carry over onto the rewritten commit.
    fn committer_date(&self, commit: &str) -> Result<String>;

    /// Whether the rebase of the checked-out branch will replay `commit`.
    fn on_current_branch(&self, commit: &str) -> Result<bool>;
}

/// [`CommitSource`] backed by the `git` CLI.
pub struct GitSource<'a> {
    git: &'a Git,
    all_refs: bool,
    head: String,
}

impl<'a> GitSource<'a> {
    /// `head` is the commit HEAD pointed at when planning started.
    pub fn new(git: &'a Git, all_refs: bool, head: String) -> Self {
        Self {
            git,
            all_refs,
            head,
        }
    }
}

impl CommitSource for GitSource<'_> {
    fn list_commits(&self) -> Result<Vec<String>> {
        self.git.list_commits(self.all_refs)
    }

    fn author(&self, commit: &str) -> Result<Option<Identity>> {
        self.git.show_author(commit)
    }

    fn committer_date(&self, commit: &str) -> Result<String> {
        self.git.committer_date(commit)
    }

    fn on_current_branch(&self, commit: &str) -> Result<bool> {
        if !self.all_refs {
            return Ok(true);
        }
        self.git.is_ancestor(commit, &self.head)
    }
}

/// Why a commit is left untouched even though it was inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The author line had no name/email separator.
    MalformedAuthor,
    /// Reachable only from another reference; the rebase will not replay it.
    OutsideCurrentBranch,
}

/// What happens to a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Rewrite { committer_date: String },
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub commit: String,
    pub author: Option<Identity>,
    pub decision: Decision,
}

/// Oldest-first list of decisions for every enumerated commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    pub entries: Vec<PlanEntry>,
}

impl RewritePlan {
    /// `(commit, committer_date)` for every commit to rewrite, oldest first.
    pub fn rewrites(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|e| match &e.decision {
                Decision::Rewrite { committer_date } => {
                    Some((e.commit.as_str(), committer_date.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn rewrite_count(&self) -> usize {
        self.rewrites().len()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.decision, Decision::Skip(_)))
            .count()
    }
}

/// First seven characters of a hash, for display.
pub fn short_hash(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}

/// Walks `source` oldest first and decides what to do with each commit.
///
/// Prints `Processing commit i/N` and the current author for every commit.
/// A commit whose author cannot be parsed is skipped with a warning; git
/// failures are returned.
pub fn build_plan<S: CommitSource>(source: &S, target: &Identity) -> Result<RewritePlan> {
    let mut commits = source.list_commits()?;
    commits.reverse();

    let total = commits.len();
    println!("Found {} commits to process", total);

    let mut entries = Vec::with_capacity(total);
    for (i, commit) in commits.into_iter().enumerate() {
        println!(
            "\nProcessing commit {}/{}: {}",
            i + 1,
            total,
            style(short_hash(&commit)).yellow()
        );

        let author = source.author(&commit)?;
        let decision = match &author {
            None => {
                warn!(%commit, "author line has no email field, skipping");
                println!("  {}", style("Could not read author; skipping.").yellow());
                Decision::Skip(SkipReason::MalformedAuthor)
            }
            Some(current) => {
                println!("  Current: {}", current);
                if !target.needs_rewrite(current) {
                    Decision::Keep
                } else if !source.on_current_branch(&commit)? {
                    warn!(%commit, "commit is not on the checked-out branch, skipping");
                    println!(
                        "  {}",
                        style("Not on the current branch; skipping.").yellow()
                    );
                    Decision::Skip(SkipReason::OutsideCurrentBranch)
                } else {
                    let committer_date = source.committer_date(&commit)?;
                    info!(%commit, from = %current, "commit needs rewrite");
                    Decision::Rewrite { committer_date }
                }
            }
        };

        entries.push(PlanEntry {
            commit,
            author,
            decision,
        });
    }

    Ok(RewritePlan { entries })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory history, stored newest first like the log listing.
    pub(crate) struct MockSource {
        pub commits: Vec<(String, Option<Identity>, String)>,
        pub off_branch: Vec<String>,
        pub inspected: RefCell<Vec<String>>,
    }

    impl MockSource {
        pub(crate) fn new(commits: Vec<(&str, Option<Identity>, &str)>) -> Self {
            Self {
                commits: commits
                    .into_iter()
                    .map(|(h, a, d)| (h.to_string(), a, d.to_string()))
                    .collect(),
                off_branch: Vec::new(),
                inspected: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommitSource for MockSource {
        fn list_commits(&self) -> Result<Vec<String>> {
            Ok(self.commits.iter().map(|c| c.0.clone()).collect())
        }

        fn author(&self, commit: &str) -> Result<Option<Identity>> {
            self.inspected.borrow_mut().push(commit.to_string());
            Ok(self
                .commits
                .iter()
                .find(|c| c.0 == commit)
                .and_then(|c| c.1.clone()))
        }

        fn committer_date(&self, commit: &str) -> Result<String> {
            Ok(self
                .commits
                .iter()
                .find(|c| c.0 == commit)
                .map(|c| c.2.clone())
                .unwrap_or_default())
        }

        fn on_current_branch(&self, commit: &str) -> Result<bool> {
            Ok(!self.off_branch.iter().any(|c| c == commit))
        }
    }

    fn target() -> Identity {
        Identity::new("Target", "target@example.com")
    }

    fn alice() -> Identity {
        Identity::new("Alice", "alice@example.com")
    }

    #[test]
    fn inspects_oldest_first() {
        let source = MockSource::new(vec![
            ("ccc3333333", Some(alice()), "2024-01-03 00:00:00 +0000"),
            ("bbb2222222", Some(alice()), "2024-01-02 00:00:00 +0000"),
            ("aaa1111111", Some(alice()), "2024-01-01 00:00:00 +0000"),
        ]);

        let plan = build_plan(&source, &target()).unwrap();

        assert_eq!(
            *source.inspected.borrow(),
            vec!["aaa1111111", "bbb2222222", "ccc3333333"]
        );
        let order: Vec<_> = plan.entries.iter().map(|e| e.commit.as_str()).collect();
        assert_eq!(order, vec!["aaa1111111", "bbb2222222", "ccc3333333"]);
    }

    #[test]
    fn commits_already_matching_are_kept() {
        let source = MockSource::new(vec![
            ("bbb2222222", Some(target()), "2024-01-02 00:00:00 +0000"),
            ("aaa1111111", Some(target()), "2024-01-01 00:00:00 +0000"),
        ]);

        let plan = build_plan(&source, &target()).unwrap();

        assert_eq!(plan.rewrite_count(), 0);
        assert!(plan.entries.iter().all(|e| e.decision == Decision::Keep));
    }

    #[test]
    fn rewrite_carries_original_committer_date() {
        let source = MockSource::new(vec![(
            "aaa1111111",
            Some(alice()),
            "2020-05-06 07:08:09 +0200",
        )]);

        let plan = build_plan(&source, &target()).unwrap();

        assert_eq!(
            plan.rewrites(),
            vec![("aaa1111111", "2020-05-06 07:08:09 +0200")]
        );
    }

    #[test]
    fn missing_email_is_skipped_and_processing_continues() {
        let source = MockSource::new(vec![
            ("ccc3333333", Some(alice()), "2024-01-03 00:00:00 +0000"),
            ("bbb2222222", None, "2024-01-02 00:00:00 +0000"),
            ("aaa1111111", Some(alice()), "2024-01-01 00:00:00 +0000"),
        ]);

        let plan = build_plan(&source, &target()).unwrap();

        assert_eq!(plan.entries.len(), 3);
        assert_eq!(
            plan.entries[1].decision,
            Decision::Skip(SkipReason::MalformedAuthor)
        );
        let rewritten: Vec<_> = plan.rewrites().into_iter().map(|(c, _)| c).collect();
        assert_eq!(rewritten, vec!["aaa1111111", "ccc3333333"]);
        assert_eq!(plan.skipped_count(), 1);
    }

    #[test]
    fn commits_off_the_current_branch_are_skipped() {
        let mut source = MockSource::new(vec![
            ("bbb2222222", Some(alice()), "2024-01-02 00:00:00 +0000"),
            ("aaa1111111", Some(alice()), "2024-01-01 00:00:00 +0000"),
        ]);
        source.off_branch.push("bbb2222222".to_string());

        let plan = build_plan(&source, &target()).unwrap();

        assert_eq!(
            plan.entries[1].decision,
            Decision::Skip(SkipReason::OutsideCurrentBranch)
        );
        assert_eq!(plan.rewrite_count(), 1);
    }

    #[test]
    fn empty_history_gives_empty_plan() {
        let source = MockSource::new(vec![]);
        let plan = build_plan(&source, &target()).unwrap();
        assert!(plan.entries.is_empty());
        assert_eq!(plan.rewrite_count(), 0);
    }

    #[test]
    fn short_hash_handles_short_input() {
        assert_eq!(short_hash("0123456789abcdef"), "0123456");
        assert_eq!(short_hash("abc"), "abc");
    }
}
