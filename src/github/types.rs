use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed pull request as returned by the GitHub "list pull requests" endpoint.
///
/// Only the fields the scan reads or re-packages are kept. The same struct is
/// embedded by value into every [`DecoratedFile`], so it serializes under the
/// shorter snapshot names (`url` instead of `html_url`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// PR number (e.g., 42)
    pub number: u64,
    /// PR title, searched for a bug identifier
    pub title: String,
    /// Browser URL of the PR
    #[serde(rename(deserialize = "html_url"))]
    pub url: String,
    /// "open" or "closed"
    pub state: String,
    pub created_at: DateTime<Utc>,
    /// Absent for PRs closed without merging
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    pub merge_commit_sha: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub head: GitRef,
    pub base: GitRef,
    /// Author; GitHub sends null for deleted accounts
    #[serde(default)]
    pub user: Option<User>,
}

impl PullRequestSummary {
    /// Timestamp compared against the retention cutoff.
    ///
    /// Falls back to `closed_at`, then `created_at`, for PRs that were never merged.
    pub fn merge_timestamp(&self) -> DateTime<Utc> {
        self.merged_at
            .or(self.closed_at)
            .unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Head or base branch reference of a PR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitRef {
    pub label: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// A single file touched by a pull request.
///
/// Everything besides `filename` (status, additions, patch, ...) is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root
    pub filename: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// A [`FileChange`] paired with a snapshot of the PR that touched it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedFile {
    #[serde(flatten)]
    pub file: FileChange,
    pub pull: PullRequestSummary,
}

impl DecoratedFile {
    pub fn new(file: FileChange, pull: PullRequestSummary) -> Self {
        Self { file, pull }
    }
}

/// Owner/name pair identifying the scanned repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
