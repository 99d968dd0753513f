pub mod types;

pub use types::{DecoratedFile, FileChange, PullRequestSummary, RepoSlug, User};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument};

const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid repository: {0}")]
    InvalidRepo(String),
}

/// The two paginated endpoints the scan walks.
///
/// Implemented by [`GitHubClient`] and by scripted fakes in tests.
#[async_trait]
pub trait PullsApi: Send + Sync {
    /// One page of closed pull requests, newest first. Empty once exhausted.
    async fn list_pulls(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestSummary>, GitHubError>;

    /// One page of the files changed by pull request `number`.
    async fn list_files(
        &self,
        number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<FileChange>, GitHubError>;
}

/// Parse a repository reference into owner and name.
///
/// Accepts `owner/repo` or a GitHub URL such as
/// `https://github.com/owner/repo` (a trailing `.git` is dropped).
pub fn parse_repo(input: &str) -> Result<RepoSlug, GitHubError> {
    let invalid = || GitHubError::InvalidRepo(input.to_string());

    let segments: Vec<String> = if input.contains("://") {
        let parsed = reqwest::Url::parse(input).map_err(|_| invalid())?;
        if parsed.host_str() != Some("github.com") {
            return Err(invalid());
        }
        parsed
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        input
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    };

    if segments.len() != 2 {
        return Err(invalid());
    }

    let repo = segments[1].trim_end_matches(".git");
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoSlug {
        owner: segments[0].clone(),
        repo: repo.to_string(),
    })
}

/// Authenticated client for one repository on the GitHub REST API.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    repo: RepoSlug,
    token: String,
}

impl GitHubClient {
    pub fn new(repo: RepoSlug, token: String) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder()
            .user_agent("pr-hotspots")
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_API_URL.to_string(),
            repo,
            token,
        })
    }

    /// Point the client at another API root (GitHub Enterprise, mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `GET /user`: the account the token belongs to.
    #[instrument(skip(self))]
    pub async fn authenticated_user(&self) -> Result<User, GitHubError> {
        self.get_json("/user", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "http request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%url, status = status.as_u16(), %body, "GitHub API error");
            return Err(GitHubError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PullsApi for GitHubClient {
    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn list_pulls(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestSummary>, GitHubError> {
        let path = format!("/repos/{}/{}/pulls", self.repo.owner, self.repo.repo);
        let query = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
            ("state", "closed".to_string()),
        ];
        self.get_json(&path, &query).await
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn list_files(
        &self,
        number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<FileChange>, GitHubError> {
        let path = format!(
            "/repos/{}/{}/pulls/{}/files",
            self.repo.owner, self.repo.repo, number
        );
        let query = [
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.get_json(&path, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn slug() -> RepoSlug {
        RepoSlug {
            owner: "org".to_string(),
            repo: "repo".to_string(),
        }
    }

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new(slug(), "t0ken".to_string())
            .unwrap()
            .with_base_url(server.uri())
    }

    fn pull_json(number: u64, title: &str) -> serde_json::Value {
        json!({
            "number": number,
            "title": title,
            "html_url": format!("https://github.com/org/repo/pull/{number}"),
            "state": "closed",
            "created_at": "2024-03-01T10:00:00Z",
            "merged_at": "2024-03-02T10:00:00Z",
            "merge_commit_sha": "abc",
            "labels": [],
            "head": { "label": "org:fix", "sha": "111" },
            "base": { "label": "org:main", "sha": "222" },
            "user": { "login": "alice" }
        })
    }

    #[test]
    fn test_parse_repo_slug() {
        let slug = parse_repo("org/repo").unwrap();
        assert_eq!(slug.owner, "org");
        assert_eq!(slug.repo, "repo");
    }

    #[test]
    fn test_parse_repo_url() {
        let slug = parse_repo("https://github.com/org/repo.git").unwrap();
        assert_eq!(slug.owner, "org");
        assert_eq!(slug.repo, "repo");

        let slug = parse_repo("https://github.com/org/repo/").unwrap();
        assert_eq!(slug.repo, "repo");
    }

    #[test]
    fn test_parse_invalid_repo() {
        assert!(parse_repo("repo").is_err());
        assert!(parse_repo("org/repo/extra").is_err());
        assert!(parse_repo("https://example.com/org/repo").is_err());
        assert!(parse_repo("https://github.com/org/repo/pull/42").is_err());
        assert!(parse_repo("org/.git").is_err());
    }

    #[tokio::test]
    async fn test_list_pulls_sends_pagination_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/pulls"))
            .and(query_param("per_page", "50"))
            .and(query_param("page", "3"))
            .and(query_param("state", "closed"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([pull_json(9, "NVIEW-1: fix"), pull_json(8, "chore")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let pulls = client_for(&server).list_pulls(3, 50).await.unwrap();
        assert_eq!(pulls.len(), 2);
        assert_eq!(pulls[0].number, 9);
        assert_eq!(pulls[1].title, "chore");
    }

    #[tokio::test]
    async fn test_list_files_for_pull() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/pulls/9/files"))
            .and(query_param("per_page", "100"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "filename": "src/a.rs", "status": "modified", "additions": 1, "deletions": 0 },
                { "filename": "src/b.rs", "status": "added", "additions": 10, "deletions": 0 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let files = client_for(&server).list_files(9, 1, 100).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["src/a.rs", "src/b.rs"]);
        assert_eq!(files[1].details["status"], "added");
    }

    #[tokio::test]
    async fn test_authenticated_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "login": "alice", "id": 1 })),
            )
            .mount(&server)
            .await;

        let user = client_for(&server).authenticated_user().await.unwrap();
        assert_eq!(user.login, "alice");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/pulls"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).list_pulls(1, 100).await.unwrap_err();
        match err {
            GitHubError::Status { status, url } => {
                assert_eq!(status, 401);
                assert!(url.ends_with("/repos/org/repo/pulls"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
