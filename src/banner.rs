use console::{measure_text_width, style};
use std::iter;

use crate::identity::Identity;
use crate::plan::RewritePlan;

/// Prints a boxed summary of the rewrite about to happen.
///
/// The box is sized to the widest **visible** line, using
/// [`console::measure_text_width`] so that ANSI codes in the content do not
/// throw off the padding. Borders are styled separately from the content.
///
/// # Examples
///
/// ```no_run
/// use git_author_rewrite::banner::print_banner;
/// use git_author_rewrite::identity::Identity;
/// use git_author_rewrite::plan::RewritePlan;
///
/// print_banner(
///     &Identity::new("John Doe", "john@example.com"),
///     &RewritePlan::default(),
///     "main",
///     false,
/// );
/// ```
pub fn print_banner(target: &Identity, plan: &RewritePlan, branch: &str, dry_run: bool) {
    let lines = banner_lines(target, plan, branch, dry_run);

    let max_width = lines.iter().map(|l| measure_text_width(l)).max().unwrap_or(0) + 2;

    let border = "═".repeat(max_width);
    let top = style(format!("╔{}╗", border)).blue().bold();
    let bottom = style(format!("╚{}╝", border)).blue().bold();
    let left = style("║ ").blue().bold().to_string();
    let right = style("║").blue().bold().to_string();

    println!();
    println!("{top}");
    for line in lines {
        let pad = max_width - measure_text_width(&line);
        println!("{}{}{}{}", left, line, " ".repeat(pad - 1), right);
    }
    println!("{bottom}");
    println!();
}

/// Constructs the banner text: title, counts, target author, mode line.
///
/// Some lines carry ANSI styling; measure them with
/// `console::measure_text_width`, not `str::len()`.
fn banner_lines(target: &Identity, plan: &RewritePlan, branch: &str, dry_run: bool) -> Vec<String> {
    let total = plan.entries.len();
    let rewrites = plan.rewrite_count();
    let skipped = plan.skipped_count();

    let top = [format!("Rewrite commit authors on `{}`", branch), String::new()].into_iter();

    let counts = [
        format!("Commits inspected:   {}", total),
        format!("Commits to rewrite:  {}", rewrites),
        format!("Already correct:     {}", total - rewrites - skipped),
        format!("Skipped:             {}", skipped),
    ]
    .into_iter();

    let mode = if dry_run {
        style("Dry run: nothing will be changed.")
            .cyan()
            .bold()
            .to_string()
    } else {
        style("Committer dates and messages are preserved.")
            .yellow()
            .bold()
            .to_string()
    };

    top.chain(counts)
        .chain(iter::once(String::new()))
        .chain(iter::once(format!("New author will be set to: {}", target)))
        .chain(iter::once(mode))
        .collect()
}
