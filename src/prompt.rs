use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use crate::identity::Identity;

/// Abstraction over a string input prompt.
///
/// Lets the flow that consumes user input be tested without a terminal.
pub trait StringPrompter {
    /// Prompt the user for a string, falling back to `default` on empty input.
    fn prompt(&mut self, prompt: &str, default: &str) -> Result<String, String>;
}

/// Abstraction over a yes/no confirmation prompt.
pub trait ConfirmPrompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String>;
}

/// [`StringPrompter`] using `dialoguer::Input` with the `ColorfulTheme`.
pub struct DialoguerStringPrompter;

impl StringPrompter for DialoguerStringPrompter {
    fn prompt(&mut self, prompt: &str, default: &str) -> Result<String, String> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(|e| e.to_string())
    }
}

/// [`ConfirmPrompter`] using `dialoguer::Confirm` with the `ColorfulTheme`.
pub struct DialoguerConfirmPrompter;

impl ConfirmPrompter for DialoguerConfirmPrompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String> {
        let theme = ColorfulTheme::default();
        Confirm::with_theme(&theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| e.to_string())
    }
}

/// Prompt for a value, showing the repository name for context:
/// `"Author name for my-repo"`.
pub fn ask<P: StringPrompter>(
    prompter: &mut P,
    label: &str,
    repo_name: &str,
    default_value: &str,
) -> Result<String, String> {
    let prompt = format!("{} for {}", label, repo_name);
    prompter.prompt(&prompt, default_value)
}

/// Asks for the target author, using `name`/`email` when already known.
///
/// Only the missing fields are prompted for. Defaults come from
/// `default` (normally the repository's `user.name` / `user.email`).
pub fn ask_identity<P: StringPrompter>(
    prompter: &mut P,
    repo_name: &str,
    name: Option<&str>,
    email: Option<&str>,
    default: &Identity,
) -> Result<Identity, String> {
    let name = match name {
        Some(n) => n.to_string(),
        None => ask(prompter, "Author name", repo_name, &default.name)?,
    };
    let email = match email {
        Some(e) => e.to_string(),
        None => ask(prompter, "Author email", repo_name, &default.email)?,
    };

    let identity = Identity::new(name, email);
    if identity.name.is_empty() || identity.email.is_empty() {
        return Err(String::from("author name and email must not be empty"));
    }
    Ok(identity)
}

/// Ask the user to confirm rewriting `count` commits.
pub fn confirm_start<P: ConfirmPrompter>(prompter: &mut P, count: usize) -> Result<bool, String> {
    let prompt = format!(
        "Rewrite {} commit{} now? (this replaces the branch history)",
        count,
        if count == 1 { "" } else { "s" }
    );
    prompter.confirm(&prompt, false)
}
