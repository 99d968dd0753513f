use std::collections::HashSet;

use regex::Regex;

/// Token shape used when no project prefix is configured: `ABC-123`.
const GENERIC_TOKEN: &str = r"\b[A-Z][A-Z0-9]+-\d+\b";

/// Decides whether a pull request title refers to a tracked bug.
///
/// The first bug token in the title decides: the title matches if that token
/// is on the allow-list. Titles with no token at all pass through as
/// candidates.
#[derive(Debug, Clone)]
pub struct BugMatcher {
    pattern: Regex,
    known: HashSet<String>,
}

impl BugMatcher {
    /// Build a matcher over `known` ids.
    ///
    /// With `prefix` set (e.g. `NVIEW`), only `NVIEW-<digits>` counts as a token.
    pub fn new(
        prefix: Option<&str>,
        known: impl IntoIterator<Item = String>,
    ) -> Result<Self, regex::Error> {
        let pattern = match prefix {
            Some(prefix) => Regex::new(&format!(r"\b{}-\d+\b", regex::escape(prefix)))?,
            None => Regex::new(GENERIC_TOKEN)?,
        };
        Ok(Self {
            pattern,
            known: known.into_iter().collect(),
        })
    }

    /// First bug token in `title`, if any.
    pub fn token<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.pattern.find(title).map(|m| m.as_str())
    }

    pub fn matches(&self, title: &str) -> bool {
        match self.token(title) {
            None => true,
            Some(token) => self.known.contains(token),
        }
    }

    pub fn known_ids(&self) -> usize {
        self.known.len()
    }
}
