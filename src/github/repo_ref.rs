use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FailureKind;

static GITHUB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?github\.com/([^/?#\s]+)/([^/?#\s]+)").expect("valid regex")
});

static OWNER_SLASH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\s/]+)/([^\s/]+)$").expect("valid regex"));

/// An `owner/name` pair identifying a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Accepts `owner/name` or any `https://github.com/owner/name...` URL.
    /// A trailing `.git` is dropped.
    pub fn parse(input: &str) -> Result<Self, FailureKind> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FailureKind::MissingInput("repo"));
        }

        let caps = GITHUB_URL
            .captures(trimmed)
            .or_else(|| OWNER_SLASH_NAME.captures(trimmed))
            .ok_or_else(|| {
                FailureKind::InvalidInput(format!(
                    "'{trimmed}' is not a GitHub repository; use a URL or owner/repo"
                ))
            })?;

        let owner = caps[1].to_string();
        let name = caps[2].trim_end_matches(".git").to_string();
        if [&owner, &name].iter().any(|part| part.is_empty() || *part == "." || *part == "..") {
            return Err(FailureKind::InvalidInput(format!("'{trimmed}' is not a valid repository")));
        }

        Ok(Self { owner, name })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
