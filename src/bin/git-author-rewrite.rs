use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use git_author_rewrite::cli::{self, Cli};

/// Entry point for the `git-author-rewrite` binary.
///
/// Sets up logging, delegates to [`cli::entry`] and exits with the returned
/// code. Errors are printed to stderr and exit with status 1.
fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli::entry(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", style(format!("❌ Error: {}", e)).red().bold());
            std::process::exit(1);
        }
    }
}
