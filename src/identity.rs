use std::fmt;

/// Separator placed between `%an` and `%ae` when asking git for an author.
///
/// The ASCII unit separator cannot appear in a name or an email, unlike `|`.
pub const AUTHOR_FIELD_SEPARATOR: char = '\u{1f}';

/// A `(name, email)` pair as recorded on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Builds an identity, trimming surrounding whitespace from both fields.
    pub fn new(name: impl AsRef<str>, email: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            email: email.as_ref().trim().to_string(),
        }
    }

    /// Returns `true` if `current` differs from `self` in name **or** email.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_author_rewrite::identity::Identity;
    ///
    /// let target = Identity::new("Jane Doe", "jane@example.com");
    /// assert!(!target.needs_rewrite(&Identity::new("Jane Doe", "jane@example.com")));
    /// assert!(target.needs_rewrite(&Identity::new("Jane Doe", "jane@old.example")));
    /// assert!(target.needs_rewrite(&Identity::new("jane", "jane@example.com")));
    /// ```
    pub fn needs_rewrite(&self, current: &Identity) -> bool {
        current.email != self.email || current.name != self.name
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Parses the output of `git show -s --format=%an%x1f%ae`.
///
/// Returns `None` when the separator is missing, which happens when git
/// printed nothing useful (failed lookup, unexpected format). An empty email
/// after the separator is still a valid identity: git allows it.
pub fn parse_author_line(line: &str) -> Option<Identity> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, email) = line.split_once(AUTHOR_FIELD_SEPARATOR)?;

    Some(Identity {
        name: name.to_string(),
        email: email.to_string(),
    })
}
