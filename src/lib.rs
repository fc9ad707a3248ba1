//! # git-author-rewrite
//!
//! A CLI tool to rewrite commit authors across a Git repository's history.
//!
//! Commits are enumerated oldest first and each author is compared with a
//! target identity. Every mismatching commit is rewritten in place through an
//! interactive rebase that stops only at those commits; the commit message
//! and the original committer date are kept.
//!
//! ## Usage
//!
//! ```bash
//! # Prompt for the target author and rewrite the current branch
//! git-author-rewrite
//!
//! # Non-interactive, on another repository
//! git-author-rewrite -C ../project --name "Jane Doe" --email jane@example.com --yes
//!
//! # Only show what would change
//! git-author-rewrite --dry-run
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface and main entry point
//! - [`git`] - Git command wrappers
//! - [`identity`] - Author identity and comparison
//! - [`plan`] - Oldest-first inspection of the history
//! - [`rewrite`] - Rebase stop loop that amends the planned commits
//! - [`prompt`] - User input abstractions
//! - [`sequence_editor`] - Rebase todo file transformation
//! - [`banner`] - Summary banner
//! - [`error`] - Error type

pub mod banner;
pub mod cli;
pub mod error;
pub mod git;
pub mod identity;
pub mod plan;
pub mod prompt;
pub mod rewrite;
pub mod sequence_editor;
